//! Coupler conventions applied when assembling and writing grids.

use std::path::Path;

use grid_common::geometry::wrap_longitude;
use grid_common::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Conventions shared by every grid written in one coupler setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OasisConventions {
    /// How valid cells are encoded in `{name}.msk`.
    pub mask_polarity: MaskPolarity,

    /// Range longitudes are wrapped into.
    pub lon_range: LonRange,

    /// Prefix of the `title` attribute of each output file.
    pub title: String,
}

impl Default for OasisConventions {
    fn default() -> Self {
        Self {
            mask_polarity: MaskPolarity::ZeroIsValid,
            lon_range: LonRange::ZeroTo360,
            title: "OASIS coupling grids".to_string(),
        }
    }
}

impl OasisConventions {
    /// Load conventions from environment variables, starting from defaults.
    ///
    /// Unparseable values are errors rather than falling back to defaults.
    pub fn from_env() -> GridResult<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("OASIS_MASK_POLARITY") {
            config.mask_polarity = MaskPolarity::parse(&val)?;
        }

        if let Ok(val) = std::env::var("OASIS_LON_RANGE") {
            config.lon_range = LonRange::parse(&val)?;
        }

        if let Ok(val) = std::env::var("OASIS_TITLE") {
            config.title = val;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load conventions from a YAML file; missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GridError::FileNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text).map_err(|e| match e {
            GridError::Configuration(msg) => {
                GridError::configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        debug!(path = %path.display(), ?config, "Loaded conventions");
        Ok(config)
    }

    /// Parse conventions from YAML text.
    pub fn from_yaml_str(text: &str) -> GridResult<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| GridError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> GridResult<()> {
        if self.title.trim().is_empty() {
            return Err(GridError::configuration("title must not be empty"));
        }
        if !self.title.is_ascii() {
            return Err(GridError::configuration("title must be ASCII"));
        }
        Ok(())
    }
}

/// Encoding of the land/sea mask in `masks.nc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskPolarity {
    /// OASIS convention: 0 = use the cell, 1 = masked out.
    #[default]
    ZeroIsValid,
    /// Model convention: 1 = use the cell, 0 = masked out.
    OneIsValid,
}

impl MaskPolarity {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> GridResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "zero_is_valid" | "oasis" => Ok(Self::ZeroIsValid),
            "one_is_valid" | "model" => Ok(Self::OneIsValid),
            other => Err(GridError::configuration(format!(
                "unknown mask polarity '{}', expected zero_is_valid or one_is_valid",
                other
            ))),
        }
    }

    /// Integer written for a cell.
    pub fn encode(&self, valid: bool) -> i32 {
        match (self, valid) {
            (Self::ZeroIsValid, true) | (Self::OneIsValid, false) => 0,
            (Self::ZeroIsValid, false) | (Self::OneIsValid, true) => 1,
        }
    }

    /// Whether a stored value marks a cell in use.
    pub fn decode(&self, value: i32) -> bool {
        match self {
            Self::ZeroIsValid => value == 0,
            Self::OneIsValid => value != 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroIsValid => "zero_is_valid",
            Self::OneIsValid => "one_is_valid",
        }
    }

    /// Text for the `long_name` of mask variables.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ZeroIsValid => "land-sea mask (0 = use, 1 = masked)",
            Self::OneIsValid => "land-sea mask (1 = use, 0 = masked)",
        }
    }
}

impl std::fmt::Display for MaskPolarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Longitude range of all written longitudes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LonRange {
    /// `[0, 360)`
    #[default]
    #[serde(rename = "0_360")]
    ZeroTo360,
    /// `[-180, 180)`
    #[serde(rename = "-180_180")]
    Minus180To180,
}

impl LonRange {
    /// Parse from string, accepting `0_360`, `0..360`, `-180_180` or `-180..180`.
    pub fn parse(s: &str) -> GridResult<Self> {
        match s.trim().replace("..", "_").as_str() {
            "0_360" => Ok(Self::ZeroTo360),
            "-180_180" => Ok(Self::Minus180To180),
            other => Err(GridError::configuration(format!(
                "unknown longitude range '{}', expected 0_360 or -180_180",
                other
            ))),
        }
    }

    /// Lower bound of the range in degrees.
    pub fn min(&self) -> f64 {
        match self {
            Self::ZeroTo360 => 0.0,
            Self::Minus180To180 => -180.0,
        }
    }

    /// Wrap a longitude into the range.
    pub fn normalize(&self, lon: f64) -> f64 {
        wrap_longitude(lon, self.min())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ZeroTo360 => "0_360",
            Self::Minus180To180 => "-180_180",
        }
    }
}

impl std::fmt::Display for LonRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

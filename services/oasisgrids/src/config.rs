//! Driver configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use grid_common::{GridError, GridIdentifier, GridResult, PointType};
use model_grid::native;
use oasis_grid::{OasisConventions, OutputPaths};

/// Default number of columns for analytic atmosphere grids (T42).
pub const DEFAULT_NUM_COLS: usize = 129;
/// Default number of rows for analytic atmosphere grids (T42).
pub const DEFAULT_NUM_ROWS: usize = 64;

/// Source grid family selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFamily {
    /// MOM 0.25° supergrid.
    Mom,
    /// MOM 1° grid_spec.
    Mom1,
    /// NEMO ORCA.
    Nemo,
    /// Spectral atmosphere (Gaussian latitudes).
    Spe,
    /// Finite volume atmosphere (uniform latitudes).
    Fvo,
}

impl GridFamily {
    pub const ALL: [GridFamily; 5] = [
        GridFamily::Mom,
        GridFamily::Mom1,
        GridFamily::Nemo,
        GridFamily::Spe,
        GridFamily::Fvo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mom => "MOM",
            Self::Mom1 => "MOM1",
            Self::Nemo => "NEMO",
            Self::Spe => "SPE",
            Self::Fvo => "FVO",
        }
    }

    /// Identifier used when none is given.
    pub fn default_identifier(&self) -> &'static str {
        match self {
            Self::Mom => "mom0",
            Self::Mom1 => "mom1",
            Self::Nemo => "nemo",
            Self::Spe => "spec",
            Self::Fvo => "fvol",
        }
    }

    /// Point types written for this family.
    pub fn point_types(&self) -> &'static [PointType] {
        match self {
            Self::Mom | Self::Mom1 => &[PointType::T, PointType::U],
            Self::Nemo => &[PointType::T, PointType::U, PointType::V],
            Self::Spe | Self::Fvo => &[PointType::T],
        }
    }

    /// Whether the family is read from a grid definition plus mask file.
    pub fn requires_files(&self) -> bool {
        matches!(self, Self::Mom | Self::Mom1 | Self::Nemo)
    }
}

impl fmt::Display for GridFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GridFamily {
    type Err = GridError;

    fn from_str(s: &str) -> GridResult<Self> {
        Self::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                GridError::configuration(format!(
                    "unknown model '{}', expected one of MOM, MOM1, NEMO, SPE, FVO",
                    s
                ))
            })
    }
}

/// Everything one conversion run needs.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub family: GridFamily,
    /// Overrides the family's default identifier.
    pub grid_id: Option<String>,
    /// Grid definition file (`ocean_hgrid.nc`, `grid_spec.nc` or `coordinates.nc`).
    pub hgrid: Option<PathBuf>,
    /// Land/sea mask file; optional for atmosphere grids.
    pub mask: Option<PathBuf>,
    pub num_cols: usize,
    pub num_rows: usize,
    pub outputs: OutputPaths,
    /// Keep other grids already present in the outputs.
    pub merge: bool,
    pub conventions: OasisConventions,
}

impl DriverConfig {
    pub fn new(family: GridFamily) -> Self {
        Self {
            family,
            grid_id: None,
            hgrid: None,
            mask: None,
            num_cols: DEFAULT_NUM_COLS,
            num_rows: DEFAULT_NUM_ROWS,
            outputs: OutputPaths::new("grids.nc", "areas.nc", "masks.nc"),
            merge: false,
            conventions: OasisConventions::default(),
        }
    }

    /// The validated grid identifier.
    pub fn identifier(&self) -> GridResult<GridIdentifier> {
        match &self.grid_id {
            Some(id) => GridIdentifier::new(id),
            None => GridIdentifier::new(self.family.default_identifier()),
        }
    }

    /// Check everything that can be checked without reading a grid.
    pub fn validate(&self) -> GridResult<()> {
        self.identifier()?;
        self.conventions.validate()?;

        if self.family.requires_files() {
            if self.hgrid.is_none() {
                return Err(GridError::configuration(format!(
                    "{} grid requires --model-hgrid",
                    self.family
                )));
            }
            if self.mask.is_none() {
                return Err(GridError::configuration(format!(
                    "{} grid requires --model-mask",
                    self.family
                )));
            }
        } else if self.num_cols == 0 || self.num_rows < 2 {
            return Err(GridError::configuration(format!(
                "{} grid needs at least 1 column and 2 rows, got {}x{}",
                self.family, self.num_cols, self.num_rows
            )));
        }

        for path in [&self.hgrid, &self.mask].into_iter().flatten() {
            native::ensure_exists(path)?;
        }

        let outputs = [&self.outputs.grids, &self.outputs.areas, &self.outputs.masks];
        for (k, a) in outputs.iter().enumerate() {
            if outputs[k + 1..].contains(a) {
                return Err(GridError::configuration(format!(
                    "output file {} is given more than once",
                    a.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_parse_case_insensitive() {
        assert_eq!("mom1".parse::<GridFamily>().unwrap(), GridFamily::Mom1);
        assert_eq!("Nemo".parse::<GridFamily>().unwrap(), GridFamily::Nemo);
        assert_eq!("FVO".parse::<GridFamily>().unwrap(), GridFamily::Fvo);
        assert!(matches!(
            "roms".parse::<GridFamily>(),
            Err(GridError::Configuration(_))
        ));
    }

    #[test]
    fn test_default_identifiers_are_valid() {
        for family in GridFamily::ALL {
            let id = DriverConfig::new(family).identifier().unwrap();
            assert_eq!(id.as_str(), family.default_identifier());
        }
    }

    #[test]
    fn test_point_types() {
        assert_eq!(GridFamily::Nemo.point_types().len(), 3);
        assert_eq!(GridFamily::Mom.point_types(), &[PointType::T, PointType::U]);
        assert_eq!(GridFamily::Spe.point_types(), &[PointType::T]);
    }

    #[test]
    fn test_structured_grid_needs_files() {
        let config = DriverConfig::new(GridFamily::Mom);
        assert!(matches!(config.validate(), Err(GridError::Configuration(_))));

        let config = DriverConfig {
            hgrid: Some(PathBuf::from("/nonexistent/ocean_hgrid.nc")),
            mask: Some(PathBuf::from("/nonexistent/ocean_mask.nc")),
            ..DriverConfig::new(GridFamily::Mom)
        };
        assert!(matches!(config.validate(), Err(GridError::FileNotFound(_))));
    }

    #[test]
    fn test_atmosphere_defaults_validate() {
        assert!(DriverConfig::new(GridFamily::Spe).validate().is_ok());

        let config = DriverConfig {
            grid_id: Some("atmos".to_string()),
            ..DriverConfig::new(GridFamily::Spe)
        };
        assert!(matches!(config.validate(), Err(GridError::Naming(_))));

        let config = DriverConfig {
            num_rows: 1,
            ..DriverConfig::new(GridFamily::Fvo)
        };
        assert!(matches!(config.validate(), Err(GridError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_outputs_rejected() {
        let config = DriverConfig {
            outputs: OutputPaths::new("grids.nc", "grids.nc", "masks.nc"),
            ..DriverConfig::new(GridFamily::Spe)
        };
        assert!(matches!(config.validate(), Err(GridError::Configuration(_))));
    }
}

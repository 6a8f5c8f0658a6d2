//! Point types and coupler grid identifiers.

use std::fmt;
use std::str::FromStr;

use crate::constants::{GRID_ID_LEN, GRID_NAME_LEN};
use crate::error::{GridError, GridResult};

/// Staggered location on a model grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointType {
    /// Tracer point (cell centre).
    T,
    /// Zonal velocity point.
    U,
    /// Meridional velocity point.
    V,
}

impl PointType {
    /// All point types in canonical order.
    pub const ALL: [PointType; 3] = [PointType::T, PointType::U, PointType::V];

    /// Lowercase letter appended to a grid identifier.
    pub fn letter(&self) -> char {
        match self {
            PointType::T => 't',
            PointType::U => 'u',
            PointType::V => 'v',
        }
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter().to_ascii_uppercase())
    }
}

impl FromStr for PointType {
    type Err = GridError;

    fn from_str(s: &str) -> GridResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t" => Ok(PointType::T),
            "u" => Ok(PointType::U),
            "v" => Ok(PointType::V),
            other => Err(GridError::configuration(format!(
                "unknown point type '{}', expected one of t, u, v",
                other
            ))),
        }
    }
}

/// A coupler grid identifier: exactly four characters, lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridIdentifier(String);

impl GridIdentifier {
    /// Validate and lowercase an identifier.
    pub fn new(id: impl AsRef<str>) -> GridResult<Self> {
        let id = id.as_ref().to_lowercase();
        let len = id.chars().count();
        if len != GRID_ID_LEN {
            return Err(GridError::Naming(format!(
                "grid identifier '{}' has {} characters, OASIS requires exactly {}",
                id, len, GRID_ID_LEN
            )));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GridError::Naming(format!(
                "grid identifier '{}' must be ASCII alphanumeric",
                id
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Coupler-facing name for one point type, e.g. `nemot`.
    pub fn grid_name(&self, point: PointType) -> GridResult<String> {
        let name = format!("{}{}", self.0, point.letter());
        if name.len() != GRID_NAME_LEN {
            return Err(GridError::Naming(format!(
                "grid name '{}' is not {} characters",
                name, GRID_NAME_LEN
            )));
        }
        Ok(name)
    }
}

impl fmt::Display for GridIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

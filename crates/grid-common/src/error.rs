//! Error types for grid conversion.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while reading model grids or writing coupler files.
#[derive(Debug, Error)]
pub enum GridError {
    /// Missing or contradictory configuration (e.g. no mask for an ocean grid).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A named input path does not exist.
    #[error("can't find input file {0}")]
    FileNotFound(String),

    /// Two arrays that must share a shape do not.
    #[error("dimension mismatch in {context}: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        context: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// A grid identifier or derived grid name has the wrong length.
    #[error("invalid grid name: {0}")]
    Naming(String),

    /// Failure inside the NetCDF library or a malformed NetCDF file.
    #[error("NetCDF error: {0}")]
    NetCdf(String),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a NetCdf error.
    pub fn netcdf(msg: impl Into<String>) -> Self {
        Self::NetCdf(msg.into())
    }

    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch(
        context: impl Into<String>,
        expected: impl Into<Vec<usize>>,
        found: impl Into<Vec<usize>>,
    ) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

//! Common types and utilities shared across the OASIS grid tools.

pub mod constants;
pub mod error;
pub mod field;
pub mod geometry;
pub mod point;

pub use error::{GridError, GridResult};
pub use field::{CornerField, Field2D};
pub use point::{GridIdentifier, PointType};

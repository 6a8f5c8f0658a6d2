//! OASIS Coupling Grid Files
//!
//! This crate turns any [`model_grid::ModelGrid`] into the three NetCDF files
//! the OASIS coupler reads at start-up:
//!
//! - **grids.nc**: `{name}.lon`, `{name}.lat`, `{name}.clo`, `{name}.cla`
//! - **areas.nc**: `{name}.srf`
//! - **masks.nc**: `{name}.msk`
//!
//! where `{name}` is a four-character grid identifier followed by the point
//! type letter (`nemot`, `nemou`, ...).
//!
//! # Architecture
//!
//! ```text
//! ModelGrid (MOM, MOM1, NEMO, spectral, finite volume)
//!      │
//!      ▼
//! CouplingGridAssembler::assemble(id, grid, points)
//!      │
//!      ├─► Name each point type (id + letter)
//!      ├─► Supplied area, or spherical polygon area of the corners
//!      ├─► Wrap longitudes into the configured range
//!      └─► Encode the mask with the configured polarity
//!               │
//!               ▼
//!      Vec<CouplingGridRecord>
//!               │
//!               ▼
//! OasisWriter::write_all(records, paths)
//!      │
//!      └─► temp file per output ──► rename over grids.nc / areas.nc / masks.nc
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_common::{GridIdentifier, PointType};
//! use model_grid::RegularGrid;
//! use oasis_grid::{CouplingGridAssembler, OasisConventions, OasisWriter, OutputPaths};
//!
//! let grid = RegularGrid::spectral(129, 64, None)?;
//! let conventions = OasisConventions::default();
//!
//! let id = GridIdentifier::new("spec")?;
//! let records = CouplingGridAssembler::new(conventions.clone())
//!     .assemble(&id, &grid, &[PointType::T])?;
//!
//! OasisWriter::new(conventions).write_all(&records, &OutputPaths::default())?;
//! ```

pub mod assembler;
pub mod config;
pub mod reader;
pub mod writer;

// Re-export commonly used types at crate root
pub use assembler::{CouplingGridAssembler, CouplingGridRecord};
pub use config::{LonRange, MaskPolarity, OasisConventions};
pub use reader::{parse_grid_name, OasisReader};
pub use writer::{OasisFile, OasisWriter, OutputPaths};

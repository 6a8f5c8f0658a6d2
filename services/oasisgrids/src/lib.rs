//! OASIS grid generator driver.
//!
//! Selects a model grid family, reads or generates the grid, and writes the
//! coupler's `grids.nc`, `areas.nc` and `masks.nc`. The binary is a thin
//! clap front end over [`run`].

pub mod config;
pub mod driver;

pub use config::{DriverConfig, GridFamily, DEFAULT_NUM_COLS, DEFAULT_NUM_ROWS};
pub use driver::{load_grid, run, RunSummary};

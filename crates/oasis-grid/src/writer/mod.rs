//! NetCDF writer for the OASIS grid file triplet.
//!
//! All three files share the per-grid dimensions `y_{name}` and `x_{name}`;
//! `grids.nc` additionally uses the corner dimension `crn`.

mod netcdf_writer;

use std::path::{Path, PathBuf};

use grid_common::constants::suffix;

pub use netcdf_writer::OasisWriter;

/// One of the three files the coupler reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OasisFile {
    /// `grids.nc`: centres and corners.
    Grids,
    /// `areas.nc`: cell areas.
    Areas,
    /// `masks.nc`: land/sea masks.
    Masks,
}

impl OasisFile {
    pub const ALL: [OasisFile; 3] = [OasisFile::Grids, OasisFile::Areas, OasisFile::Masks];

    /// Variable suffixes stored in this file.
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            Self::Grids => &[suffix::LON, suffix::LAT, suffix::CORNER_LON, suffix::CORNER_LAT],
            Self::Areas => &[suffix::AREA],
            Self::Masks => &[suffix::MASK],
        }
    }

    /// File name the coupler expects by default.
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Grids => "grids.nc",
            Self::Areas => "areas.nc",
            Self::Masks => "masks.nc",
        }
    }

    /// Content description used in the `title` attribute.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Grids => "grid cell centres and corners",
            Self::Areas => "grid cell areas",
            Self::Masks => "grid cell masks",
        }
    }
}

impl std::fmt::Display for OasisFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.default_file_name())
    }
}

/// Locations of the three output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub grids: PathBuf,
    pub areas: PathBuf,
    pub masks: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl OutputPaths {
    pub fn new(
        grids: impl Into<PathBuf>,
        areas: impl Into<PathBuf>,
        masks: impl Into<PathBuf>,
    ) -> Self {
        Self {
            grids: grids.into(),
            areas: areas.into(),
            masks: masks.into(),
        }
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            grids: dir.join(OasisFile::Grids.default_file_name()),
            areas: dir.join(OasisFile::Areas.default_file_name()),
            masks: dir.join(OasisFile::Masks.default_file_name()),
        }
    }

    pub fn get(&self, file: OasisFile) -> &Path {
        match file {
            OasisFile::Grids => &self.grids,
            OasisFile::Areas => &self.areas,
            OasisFile::Masks => &self.masks,
        }
    }
}

/// Full variable name, e.g. `nemot.clo`.
pub fn variable_name(grid_name: &str, suffix: &str) -> String {
    format!("{}.{}", grid_name, suffix)
}

/// Row dimension of a grid.
pub fn y_dimension(grid_name: &str) -> String {
    format!("y_{}", grid_name)
}

/// Column dimension of a grid.
pub fn x_dimension(grid_name: &str) -> String {
    format!("x_{}", grid_name)
}

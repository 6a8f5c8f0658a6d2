//! Model grid readers for OASIS coupling.
//!
//! Every source grid family is exposed through the [`ModelGrid`] trait: for
//! each point type it provides centres, corners, an optional area and a
//! validity mask, all computed once when the grid is constructed.
//!
//! # Grid families
//!
//! | Type | Source | Point types |
//! |------|--------|-------------|
//! | [`MomGrid`] | MOM supergrid `ocean_hgrid.nc` + `ocean_mask.nc` | T, U |
//! | [`Mom1Grid`] | MOM 1° `grid_spec.nc` + mask file | T, U |
//! | [`NemoGrid`] | NEMO `coordinates.nc` + `mesh_mask.nc` | T, U, V |
//! | [`RegularGrid`] | analytic spectral (Gaussian) or finite volume grid | T |
//!
//! Corners are always stored counter-clockwise starting south-west.
//! Masks use `true` for cells that take part in the coupling.

pub mod mask;
pub mod mom;
pub mod mom1;
pub mod native;
pub mod nemo;
pub mod regular;

use std::collections::BTreeMap;

use grid_common::{CornerField, Field2D, GridError, GridResult, PointType};

pub use mom::MomGrid;
pub use mom1::Mom1Grid;
pub use native::silence_hdf5_errors;
pub use nemo::NemoGrid;
pub use regular::{gaussian_latitudes, LatitudeSpacing, RegularGrid};

/// Capability interface over all grid families.
pub trait ModelGrid {
    /// Human readable description, used in logs and file attributes.
    fn description(&self) -> &str;

    /// Point types this grid provides, in canonical order.
    fn point_types(&self) -> Vec<PointType>;

    /// Fields for one point type.
    fn fields(&self, point: PointType) -> GridResult<&PointFields>;
}

/// Everything the coupler needs about one staggered point type.
#[derive(Debug, Clone)]
pub struct PointFields {
    /// Centre longitudes (degrees east, not yet normalized).
    pub lon: Field2D<f64>,
    /// Centre latitudes (degrees north).
    pub lat: Field2D<f64>,
    /// Corner longitudes.
    pub clon: CornerField,
    /// Corner latitudes.
    pub clat: CornerField,
    /// Cell areas in steradians, when the source provides them.
    pub area: Option<Field2D<f64>>,
    /// `true` where the cell is active (ocean, or any cell without a mask).
    pub valid: Field2D<bool>,
}

impl PointFields {
    /// Bundle fields, checking they all share one shape.
    pub fn new(
        lon: Field2D<f64>,
        lat: Field2D<f64>,
        clon: CornerField,
        clat: CornerField,
        area: Option<Field2D<f64>>,
        valid: Field2D<bool>,
    ) -> GridResult<Self> {
        let shape = lon.shape();
        let expected = vec![shape.0, shape.1];
        let mut shapes = vec![
            ("lat", lat.shape()),
            ("corner lon", clon.shape()),
            ("corner lat", clat.shape()),
            ("mask", valid.shape()),
        ];
        if let Some(area) = &area {
            shapes.push(("area", area.shape()));
        }
        for (what, (ny, nx)) in shapes {
            if (ny, nx) != shape {
                return Err(GridError::dimension_mismatch(what, expected.clone(), vec![ny, nx]));
            }
        }
        Ok(Self {
            lon,
            lat,
            clon,
            clat,
            area,
            valid,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.lon.shape()
    }
}

/// Per-point-type storage shared by the grid implementations.
#[derive(Debug, Clone, Default)]
pub struct PointFieldSet {
    fields: BTreeMap<PointType, PointFields>,
}

impl PointFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, point: PointType, fields: PointFields) {
        self.fields.insert(point, fields);
    }

    pub fn point_types(&self) -> Vec<PointType> {
        self.fields.keys().copied().collect()
    }

    /// Look up a point type, naming the grid in the error.
    pub fn get(&self, point: PointType, grid: &str) -> GridResult<&PointFields> {
        self.fields.get(&point).ok_or_else(|| {
            GridError::configuration(format!("{} grid has no {} points", grid, point))
        })
    }
}

/// Convert metric cell areas (m²) to steradians.
pub(crate) fn metric_to_steradians(area: &Field2D<f64>) -> Field2D<f64> {
    let r2 = grid_common::constants::EARTH_RADIUS_M.powi(2);
    area.map(|a| a / r2)
}

//! Turns model grid fields into coupler-ready records.

use grid_common::geometry::cell_area;
use grid_common::{CornerField, Field2D, GridIdentifier, GridResult, PointType};
use model_grid::ModelGrid;
use tracing::{debug, info};

use crate::config::OasisConventions;

/// Everything written for one grid name across the three output files.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingGridRecord {
    pub id: GridIdentifier,
    pub point: PointType,
    /// Five-character coupler name, e.g. `nemot`.
    pub name: String,
    pub lon: Field2D<f64>,
    pub lat: Field2D<f64>,
    pub clo: CornerField,
    pub cla: CornerField,
    /// Cell areas in steradians.
    pub srf: Field2D<f64>,
    /// Encoded mask.
    pub msk: Field2D<i32>,
}

impl CouplingGridRecord {
    pub fn shape(&self) -> (usize, usize) {
        self.lon.shape()
    }
}

/// Builds [`CouplingGridRecord`]s from any [`ModelGrid`].
#[derive(Debug, Clone, Default)]
pub struct CouplingGridAssembler {
    conventions: OasisConventions,
}

impl CouplingGridAssembler {
    pub fn new(conventions: OasisConventions) -> Self {
        Self { conventions }
    }

    pub fn conventions(&self) -> &OasisConventions {
        &self.conventions
    }

    /// One record per requested point type, in request order.
    ///
    /// Repeated point types produce a single record.
    pub fn assemble(
        &self,
        id: &GridIdentifier,
        grid: &dyn ModelGrid,
        points: &[PointType],
    ) -> GridResult<Vec<CouplingGridRecord>> {
        let mut requested: Vec<PointType> = Vec::with_capacity(points.len());
        for &point in points {
            if !requested.contains(&point) {
                requested.push(point);
            }
        }

        let records = requested
            .into_iter()
            .map(|point| self.assemble_point(id, grid, point))
            .collect::<GridResult<Vec<_>>>()?;

        info!(
            grid = grid.description(),
            id = %id,
            records = records.len(),
            "Assembled coupling grids"
        );
        Ok(records)
    }

    fn assemble_point(
        &self,
        id: &GridIdentifier,
        grid: &dyn ModelGrid,
        point: PointType,
    ) -> GridResult<CouplingGridRecord> {
        let fields = grid.fields(point)?;
        let name = id.grid_name(point)?;
        let (ny, nx) = fields.shape();

        let srf = match &fields.area {
            Some(area) => area.map(|&a| floor_area(a)),
            None => Field2D::from_fn(ny, nx, |j, i| {
                cell_area(&fields.clon.cell(j, i), &fields.clat.cell(j, i))
            }),
        };

        let range = self.conventions.lon_range;
        let polarity = self.conventions.mask_polarity;

        let record = CouplingGridRecord {
            id: id.clone(),
            point,
            lon: fields.lon.map(|&lon| range.normalize(lon)),
            lat: fields.lat.clone(),
            clo: fields.clon.map(|&lon| range.normalize(lon)),
            cla: fields.clat.clone(),
            srf,
            msk: fields.valid.map(|&valid| polarity.encode(valid)),
            name,
        };

        debug!(
            name = %record.name,
            ny,
            nx,
            computed_area = fields.area.is_none(),
            "Assembled point type"
        );
        Ok(record)
    }
}

/// Negative and non-finite areas become zero.
fn floor_area(area: f64) -> f64 {
    if area.is_finite() && area > 0.0 {
        area
    } else {
        0.0
    }
}

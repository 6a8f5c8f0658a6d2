//! MOM 1° grid reader (`grid_spec.nc`).
//!
//! Unlike the supergrid, `grid_spec.nc` stores centres, vertices and areas
//! separately for T and C (velocity) cells. Vertex variables are
//! `(vertex, y, x)` with vertices already ordered SW, SE, NE, NW.

use std::path::Path;

use grid_common::{CornerField, Field2D, GridResult, PointType};
use tracing::info;

use crate::mask::{b_grid_velocity_mask, read_mask};
use crate::{metric_to_steradians, native, ModelGrid, PointFieldSet, PointFields};

const DESCRIPTION: &str = "MOM 1 degree";

/// Raw per-cell arrays for one point type, area in m².
#[derive(Debug, Clone)]
pub struct CellArrays {
    pub lon: Field2D<f64>,
    pub lat: Field2D<f64>,
    pub clon: CornerField,
    pub clat: CornerField,
    pub area: Field2D<f64>,
}

impl CellArrays {
    fn read(file: &netcdf::File, suffix: &str) -> GridResult<Self> {
        Ok(Self {
            lon: native::read_field(file, &format!("x_{}", suffix))?,
            lat: native::read_field(file, &format!("y_{}", suffix))?,
            clon: native::read_corner_field(file, &format!("x_vert_{}", suffix))?,
            clat: native::read_corner_field(file, &format!("y_vert_{}", suffix))?,
            area: native::read_field(file, &format!("area_{}", suffix))?,
        })
    }

    fn into_points(self, valid: Field2D<bool>) -> GridResult<PointFields> {
        let area = metric_to_steradians(&self.area);
        PointFields::new(self.lon, self.lat, self.clon, self.clat, Some(area), valid)
    }
}

/// MOM 1° ocean grid.
#[derive(Debug, Clone)]
pub struct Mom1Grid {
    description: String,
    points: PointFieldSet,
}

impl Mom1Grid {
    /// Read `grid_spec.nc` and the mask file.
    pub fn from_files(grid_spec: impl AsRef<Path>, mask: impl AsRef<Path>) -> GridResult<Self> {
        let (grid_spec, mask) = (grid_spec.as_ref(), mask.as_ref());
        native::ensure_exists(grid_spec)?;
        native::ensure_exists(mask)?;

        let file = native::open(grid_spec)?;
        let t = CellArrays::read(&file, "T")?;
        let c = CellArrays::read(&file, "C")?;
        let t_valid = read_mask(mask, &["mask", "wet"])?;

        info!(
            grid_spec = %grid_spec.display(),
            mask = %mask.display(),
            "Read MOM1 grid definition"
        );
        Self::from_arrays(t, c, t_valid)
    }

    /// Build from T and C cell arrays plus the T mask.
    pub fn from_arrays(t: CellArrays, c: CellArrays, t_valid: Field2D<bool>) -> GridResult<Self> {
        let shape = t.lon.shape();
        native::expect_shape(&t_valid, shape, "MOM1 mask vs grid definition")?;
        native::expect_shape(&c.lon, shape, "MOM1 C grid vs T grid")?;

        let u_valid = b_grid_velocity_mask(&t_valid);
        let mut points = PointFieldSet::new();
        points.insert(PointType::T, t.into_points(t_valid)?);
        points.insert(PointType::U, c.into_points(u_valid)?);

        Ok(Self {
            description: DESCRIPTION.to_string(),
            points,
        })
    }
}

impl ModelGrid for Mom1Grid {
    fn description(&self) -> &str {
        &self.description
    }

    fn point_types(&self) -> Vec<PointType> {
        self.points.point_types()
    }

    fn fields(&self, point: PointType) -> GridResult<&PointFields> {
        self.points.get(point, &self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_common::GridError;

    fn cells(ny: usize, nx: usize, offset: f64) -> CellArrays {
        CellArrays {
            lon: Field2D::from_fn(ny, nx, |_, i| i as f64 + offset),
            lat: Field2D::from_fn(ny, nx, |j, _| j as f64 + offset),
            clon: CornerField::from_fn(ny, nx, |_, i| {
                let w = i as f64 + offset - 0.5;
                [w, w + 1.0, w + 1.0, w]
            }),
            clat: CornerField::from_fn(ny, nx, |j, _| {
                let s = j as f64 + offset - 0.5;
                [s, s, s + 1.0, s + 1.0]
            }),
            area: Field2D::filled(ny, nx, 1.0e10),
        }
    }

    #[test]
    fn test_t_and_u_points() {
        let grid =
            Mom1Grid::from_arrays(cells(3, 4, 0.0), cells(3, 4, 0.5), Field2D::filled(3, 4, true))
                .unwrap();
        assert_eq!(grid.point_types(), vec![PointType::T, PointType::U]);

        let u = grid.fields(PointType::U).unwrap();
        assert_eq!(*u.lon.get(0, 0), 0.5);
        assert!(u.valid.as_slice().iter().all(|&v| v));
        assert!(u.area.is_some());
    }

    #[test]
    fn test_mask_mismatch() {
        let result =
            Mom1Grid::from_arrays(cells(3, 4, 0.0), cells(3, 4, 0.5), Field2D::filled(3, 3, true));
        assert!(matches!(result, Err(GridError::DimensionMismatch { .. })));
    }
}

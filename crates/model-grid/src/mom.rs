//! MOM supergrid reader (`ocean_hgrid.nc`).
//!
//! The supergrid holds twice the model resolution: with `ny x nx` T cells,
//! `x` and `y` are `(2ny+1, 2nx+1)` and `area` is `(2ny, 2nx)` in m².
//!
//! ```text
//!   (2j+2,2i)  +------+------+ (2j+2,2i+2)   <- T corners / U centre
//!              |      |      |
//!              +------x------+               x = T centre (2j+1,2i+1)
//!              |      |      |
//!   (2j,2i)    +------+------+ (2j,2i+2)
//! ```
//!
//! U points (B-grid velocity) sit on the north-east T corner; their corners
//! are the four surrounding T centres.

use std::path::Path;

use grid_common::{CornerField, Field2D, GridError, GridResult, PointType};
use tracing::info;

use crate::mask::{b_grid_velocity_mask, read_mask};
use crate::{metric_to_steradians, native, ModelGrid, PointFieldSet, PointFields};

const DESCRIPTION: &str = "MOM tripolar";

/// MOM 0.25° ocean grid.
#[derive(Debug, Clone)]
pub struct MomGrid {
    description: String,
    points: PointFieldSet,
}

impl MomGrid {
    /// Read the supergrid and mask files.
    pub fn from_files(hgrid: impl AsRef<Path>, mask: impl AsRef<Path>) -> GridResult<Self> {
        let (hgrid, mask) = (hgrid.as_ref(), mask.as_ref());
        native::ensure_exists(hgrid)?;
        native::ensure_exists(mask)?;

        let file = native::open(hgrid)?;
        let x = native::read_field(&file, "x")?;
        let y = native::read_field(&file, "y")?;
        let area = native::read_field(&file, "area")?;
        let t_valid = read_mask(mask, &["mask"])?;

        info!(hgrid = %hgrid.display(), mask = %mask.display(), "Read MOM grid definition");
        Self::from_supergrid(x, y, area, t_valid)
    }

    /// Build from in-memory supergrid arrays. `area` is in m².
    pub fn from_supergrid(
        x: Field2D<f64>,
        y: Field2D<f64>,
        area: Field2D<f64>,
        t_valid: Field2D<bool>,
    ) -> GridResult<Self> {
        let (nyp, nxp) = x.shape();
        if nyp < 3 || nxp < 3 || nyp % 2 == 0 || nxp % 2 == 0 {
            return Err(GridError::netcdf(format!(
                "supergrid shape ({}, {}) must be odd and at least 3 in both directions",
                nyp, nxp
            )));
        }
        native::expect_shape(&y, (nyp, nxp), "supergrid y")?;
        native::expect_shape(&area, (nyp - 1, nxp - 1), "supergrid area")?;

        let (ny, nx) = ((nyp - 1) / 2, (nxp - 1) / 2);
        native::expect_shape(&t_valid, (ny, nx), "MOM mask vs grid definition")?;

        let supergrid = Supergrid { x, y, area };
        let mut points = PointFieldSet::new();
        points.insert(PointType::T, supergrid.t_points(ny, nx, t_valid.clone())?);
        points.insert(
            PointType::U,
            supergrid.u_points(ny, nx, b_grid_velocity_mask(&t_valid))?,
        );

        Ok(Self {
            description: DESCRIPTION.to_string(),
            points,
        })
    }
}

impl ModelGrid for MomGrid {
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

struct Supergrid {
    x: Field2D<f64>,
    y: Field2D<f64>,
    area: Field2D<f64>,
}

impl Supergrid {
    fn t_points(&self, ny: usize, nx: usize, valid: Field2D<bool>) -> GridResult<PointFields> {
        let lon = Field2D::from_fn(ny, nx, |j, i| *self.x.get(2 * j + 1, 2 * i + 1));
        let lat = Field2D::from_fn(ny, nx, |j, i| *self.y.get(2 * j + 1, 2 * i + 1));

        let corner_rows_cols = |j: usize, i: usize| {
            [
                (2 * j, 2 * i),
                (2 * j, 2 * i + 2),
                (2 * j + 2, 2 * i + 2),
                (2 * j + 2, 2 * i),
            ]
        };
        let clon = CornerField::from_fn(ny, nx, |j, i| {
            corner_rows_cols(j, i).map(|(r, c)| *self.x.get(r, c))
        });
        let clat = CornerField::from_fn(ny, nx, |j, i| {
            corner_rows_cols(j, i).map(|(r, c)| *self.y.get(r, c))
        });

        let area = Field2D::from_fn(ny, nx, |j, i| {
            self.area.get(2 * j, 2 * i)
                + self.area.get(2 * j, 2 * i + 1)
                + self.area.get(2 * j + 1, 2 * i)
                + self.area.get(2 * j + 1, 2 * i + 1)
        });

        PointFields::new(lon, lat, clon, clat, Some(metric_to_steradians(&area)), valid)
    }

    fn u_points(&self, ny: usize, nx: usize, valid: Field2D<bool>) -> GridResult<PointFields> {
        let lon = Field2D::from_fn(ny, nx, |j, i| *self.x.get(2 * j + 2, 2 * i + 2));
        let lat = Field2D::from_fn(ny, nx, |j, i| *self.y.get(2 * j + 2, 2 * i + 2));

        // Corners are T centres (j, i), (j, i+1), (j+1, i+1), (j+1, i).
        let clon = CornerField::from_fn(ny, nx, |j, i| {
            [
                self.t_centre(j, i).0,
                self.t_centre(j, i + 1).0,
                self.t_centre(j + 1, i + 1).0,
                self.t_centre(j + 1, i).0,
            ]
        });
        let clat = CornerField::from_fn(ny, nx, |j, i| {
            [
                self.t_centre(j, i).1,
                self.t_centre(j, i + 1).1,
                self.t_centre(j + 1, i + 1).1,
                self.t_centre(j + 1, i).1,
            ]
        });

        // Four supergrid sub-cells around the U point; the northern pair
        // does not exist on the last row.
        let (nyp, nxp) = self.x.shape();
        let area = Field2D::from_fn(ny, nx, |j, i| {
            let cols = [(2 * i + 1) % (nxp - 1), (2 * i + 2) % (nxp - 1)];
            let rows = [2 * j + 1, 2 * j + 2];
            rows.iter()
                .filter(|&&r| r < nyp - 1)
                .flat_map(|&r| cols.iter().map(move |&c| (r, c)))
                .map(|(r, c)| *self.area.get(r, c))
                .sum::<f64>()
        });

        PointFields::new(lon, lat, clon, clat, Some(metric_to_steradians(&area)), valid)
    }

    /// Centre of T cell `(j, i)`, cyclic in x and mirrored across the
    /// northern edge for `j == ny`.
    fn t_centre(&self, j: usize, i: usize) -> (f64, f64) {
        let (nyp, nxp) = self.x.shape();
        let nx = (nxp - 1) / 2;
        let ny = (nyp - 1) / 2;

        let (col, lon_shift) = if i >= nx {
            let period = self.x.get(0, nxp - 1) - self.x.get(0, 0);
            (2 * (i - nx) + 1, period)
        } else {
            (2 * i + 1, 0.0)
        };

        if j < ny {
            let row = 2 * j + 1;
            (self.x.get(row, col) + lon_shift, *self.y.get(row, col))
        } else {
            // Reflect the last T centre across the northern edge row.
            let edge = nyp - 1;
            let inner = edge - 1;
            let lat = 2.0 * self.y.get(edge, col) - self.y.get(inner, col);
            (
                self.x.get(edge, col) + lon_shift,
                lat.clamp(-90.0, 90.0),
            )
        }
    }
}

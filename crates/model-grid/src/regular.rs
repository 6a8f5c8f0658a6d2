//! Analytic regular latitude/longitude grids for atmosphere models.
//!
//! Longitudes are evenly spaced over the full circle starting at 0°E.
//! Latitudes run south to north and are either the Gaussian quadrature
//! latitudes (spectral models) or uniformly spaced from pole to pole
//! (finite volume models). Corners sit half way between neighbouring
//! centres; the outermost rows are closed at the poles.

use std::f64::consts::PI;
use std::path::Path;

use grid_common::{CornerField, Field2D, GridError, GridResult, PointType};
use tracing::{debug, info};

use crate::mask::valid_from_values;
use crate::{native, ModelGrid, PointFieldSet, PointFields};

/// Newton iteration stops once the root moves less than this.
const NEWTON_TOLERANCE: f64 = 1.0e-15;
const NEWTON_MAX_ITERATIONS: usize = 100;

/// How latitudes of a regular grid are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatitudeSpacing {
    /// Roots of the Legendre polynomial of degree `num_rows`.
    Gaussian,
    /// Equal spacing including both poles.
    Uniform,
}

impl LatitudeSpacing {
    /// Centre latitudes in degrees, south to north.
    pub fn latitudes(&self, num_rows: usize) -> Vec<f64> {
        match self {
            LatitudeSpacing::Gaussian => gaussian_latitudes(num_rows),
            LatitudeSpacing::Uniform => {
                let dlat = 180.0 / (num_rows - 1) as f64;
                let mut lats: Vec<f64> = (0..num_rows).map(|j| -90.0 + j as f64 * dlat).collect();
                mirror_about_equator(&mut lats);
                lats
            }
        }
    }
}

/// Force exact symmetry: the northern half is the negated southern half.
fn mirror_about_equator(lats: &mut [f64]) {
    let n = lats.len();
    for j in 0..n / 2 {
        lats[n - 1 - j] = -lats[j];
    }
    if n % 2 == 1 {
        lats[n / 2] = 0.0;
    }
}

/// Gaussian latitudes in degrees, south to north.
///
/// Roots of `P_n(sin φ)` found by Newton iteration from the usual
/// `cos(π (k + 0.75) / (n + 0.5))` first guess.
pub fn gaussian_latitudes(n: usize) -> Vec<f64> {
    let mut lats = vec![0.0; n];
    for k in 0..n.div_ceil(2) {
        let mut x = (PI * (k as f64 + 0.75) / (n as f64 + 0.5)).cos();
        for _ in 0..NEWTON_MAX_ITERATIONS {
            let (p_n, p_prev) = legendre(n, x);
            let derivative = n as f64 * (x * p_n - p_prev) / (x * x - 1.0);
            let dx = p_n / derivative;
            x -= dx;
            if dx.abs() < NEWTON_TOLERANCE {
                break;
            }
        }
        // k = 0 is the root nearest the north pole.
        lats[k] = -x.asin().to_degrees();
    }
    mirror_about_equator(&mut lats);
    lats
}

/// `(P_n(x), P_{n-1}(x))` by the three-term recurrence.
fn legendre(n: usize, x: f64) -> (f64, f64) {
    let (mut p_prev, mut p) = (1.0, x);
    for m in 2..=n {
        let m = m as f64;
        let next = ((2.0 * m - 1.0) * x * p - (m - 1.0) * p_prev) / m;
        p_prev = p;
        p = next;
    }
    if n == 0 {
        (1.0, 0.0)
    } else {
        (p, p_prev)
    }
}

/// Regular latitude/longitude atmosphere grid with T points only.
#[derive(Debug, Clone)]
pub struct RegularGrid {
    description: String,
    points: PointFieldSet,
}

impl RegularGrid {
    /// Spectral model grid (Gaussian latitudes).
    pub fn spectral(num_cols: usize, num_rows: usize, mask: Option<&Path>) -> GridResult<Self> {
        Self::from_mask_file(LatitudeSpacing::Gaussian, num_cols, num_rows, mask)
    }

    /// Finite volume model grid (uniform latitudes including the poles).
    pub fn finite_volume(
        num_cols: usize,
        num_rows: usize,
        mask: Option<&Path>,
    ) -> GridResult<Self> {
        Self::from_mask_file(LatitudeSpacing::Uniform, num_cols, num_rows, mask)
    }

    fn from_mask_file(
        spacing: LatitudeSpacing,
        num_cols: usize,
        num_rows: usize,
        mask: Option<&Path>,
    ) -> GridResult<Self> {
        let valid = match mask {
            Some(path) => {
                let file = native::open(path)?;
                let values = match file.variable("mask") {
                    Some(_) => native::read_field(&file, "mask")?,
                    None => native::read_first_field(&file)?,
                };
                info!(mask = %path.display(), "Read atmosphere mask");
                Some(valid_from_values(&values))
            }
            None => None,
        };
        Self::new(spacing, num_cols, num_rows, valid)
    }

    /// Generate the grid; without a mask every cell is valid.
    pub fn new(
        spacing: LatitudeSpacing,
        num_cols: usize,
        num_rows: usize,
        valid: Option<Field2D<bool>>,
    ) -> GridResult<Self> {
        if num_cols == 0 || num_rows < 2 {
            return Err(GridError::configuration(format!(
                "regular grid needs at least 1 column and 2 rows, got {}x{}",
                num_cols, num_rows
            )));
        }
        let valid = match valid {
            Some(valid) => {
                native::expect_shape(&valid, (num_rows, num_cols), "atmosphere mask vs grid")?;
                valid
            }
            None => Field2D::filled(num_rows, num_cols, true),
        };

        let dlon = 360.0 / num_cols as f64;
        let lons: Vec<f64> = (0..num_cols).map(|i| i as f64 * dlon).collect();
        let lats = spacing.latitudes(num_rows);

        let south_edge = |j: usize| if j == 0 { -90.0 } else { (lats[j - 1] + lats[j]) / 2.0 };
        let north_edge =
            |j: usize| if j + 1 == num_rows { 90.0 } else { (lats[j] + lats[j + 1]) / 2.0 };

        let lon = Field2D::from_fn(num_rows, num_cols, |_, i| lons[i]);
        let lat = Field2D::from_fn(num_rows, num_cols, |j, _| lats[j]);
        let clon = CornerField::from_fn(num_rows, num_cols, |_, i| {
            let (west, east) = (lons[i] - dlon / 2.0, lons[i] + dlon / 2.0);
            [west, east, east, west]
        });
        let clat = CornerField::from_fn(num_rows, num_cols, |j, _| {
            let (south, north) = (south_edge(j), north_edge(j));
            [south, south, north, north]
        });

        let description = match spacing {
            LatitudeSpacing::Gaussian => "Spectral",
            LatitudeSpacing::Uniform => "FV",
        };
        debug!(description, num_cols, num_rows, "Generated regular grid");

        let mut points = PointFieldSet::new();
        points.insert(PointType::T, PointFields::new(lon, lat, clon, clat, None, valid)?);

        Ok(Self {
            description: description.to_string(),
            points,
        })
    }
}

impl ModelGrid for RegularGrid {
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

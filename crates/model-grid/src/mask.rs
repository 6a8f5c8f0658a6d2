//! Land/sea masks.

use std::path::Path;

use grid_common::{Field2D, GridResult};

use crate::native;

/// Values at or above this magnitude are fill values, never "valid".
const FILL_THRESHOLD: f64 = 1.0e30;

/// Interpret a numeric mask: positive, finite, non-fill values are valid.
pub fn valid_from_values(values: &Field2D<f64>) -> Field2D<bool> {
    values.map(|&v| v.is_finite() && v > 0.0 && v < FILL_THRESHOLD)
}

/// Read a mask variable (first candidate name found) from a mask file.
pub fn read_mask(path: &Path, names: &[&str]) -> GridResult<Field2D<bool>> {
    let file = native::open(path)?;
    let values = native::read_field_any(&file, names)?;
    Ok(valid_from_values(&values))
}

/// Velocity mask of an Arakawa B-grid.
///
/// A velocity point sits at the north-east corner of T cell `(j, i)` and is
/// active only when all four T cells around it are active. Cyclic in x; the
/// northern row only looks at the row below it.
pub fn b_grid_velocity_mask(t_valid: &Field2D<bool>) -> Field2D<bool> {
    let (ny, nx) = t_valid.shape();
    Field2D::from_fn(ny, nx, |j, i| {
        let east = (i + 1) % nx;
        let north = (j + 1).min(ny - 1);
        *t_valid.get(j, i)
            && *t_valid.get(j, east)
            && *t_valid.get(north, i)
            && *t_valid.get(north, east)
    })
}

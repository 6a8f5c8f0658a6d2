//! Native NetCDF access using the netcdf library.
//!
//! Model grid files store 2-D fields, sometimes with leading singleton or
//! level dimensions (`(t, z, y, x)` masks in NEMO). Readers here always
//! return the first horizontal slice.

use std::path::Path;
use std::sync::Once;

use grid_common::constants::CORNER_COUNT;
use grid_common::{CornerField, Field2D, GridError, GridResult};
use tracing::debug;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose diagnostics even when a missing
/// attribute or variable is handled gracefully on the Rust side. Call this
/// before the first NetCDF operation; repeated calls are no-ops.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and passing null handlers to
        // disable error output is a documented use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Fail with `FileNotFound` unless `path` exists.
pub fn ensure_exists(path: &Path) -> GridResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(GridError::FileNotFound(path.display().to_string()))
    }
}

/// Open a NetCDF file for reading.
pub fn open(path: &Path) -> GridResult<netcdf::File> {
    ensure_exists(path)?;
    silence_hdf5_errors();
    debug!(path = %path.display(), "Opening NetCDF file");
    netcdf::open(path)
        .map_err(|e| GridError::netcdf(format!("failed to open {}: {}", path.display(), e)))
}

/// Dimension lengths of a variable, outermost first.
pub fn variable_shape(var: &netcdf::Variable) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

fn required<'f>(file: &'f netcdf::File, name: &str) -> GridResult<netcdf::Variable<'f>> {
    file.variable(name)
        .ok_or_else(|| GridError::netcdf(format!("missing variable '{}'", name)))
}

/// Read the first horizontal slice of a variable with at least two dimensions.
pub fn read_field(file: &netcdf::File, name: &str) -> GridResult<Field2D<f64>> {
    let var = required(file, name)?;
    read_variable(&var, name)
}

/// Like [`read_field`], trying each candidate name in turn.
pub fn read_field_any(file: &netcdf::File, names: &[&str]) -> GridResult<Field2D<f64>> {
    for name in names {
        if let Some(var) = file.variable(name) {
            return read_variable(&var, name);
        }
    }
    Err(GridError::netcdf(format!(
        "missing variable, tried {}",
        names.join(", ")
    )))
}

/// Read the first variable with two or more dimensions.
pub fn read_first_field(file: &netcdf::File) -> GridResult<Field2D<f64>> {
    let var = file
        .variables()
        .find(|v| v.dimensions().len() >= 2)
        .ok_or_else(|| GridError::netcdf("no two-dimensional variable found"))?;
    let name = var.name();
    read_variable(&var, &name)
}

fn read_variable(var: &netcdf::Variable, name: &str) -> GridResult<Field2D<f64>> {
    let shape = variable_shape(var);
    if shape.len() < 2 {
        return Err(GridError::netcdf(format!(
            "variable '{}' has {} dimensions, expected at least 2",
            name,
            shape.len()
        )));
    }
    let ny = shape[shape.len() - 2];
    let nx = shape[shape.len() - 1];

    let mut values: Vec<f64> = var
        .get_values(..)
        .map_err(|e| GridError::netcdf(format!("failed to read '{}': {}", name, e)))?;
    // Row-major storage: the first (y, x) plane comes first.
    values.truncate(ny * nx);

    debug!(variable = %name, ny, nx, "Read field");
    Field2D::from_vec(ny, nx, values)
}

/// Read a `(vertex, y, x)` corner variable whose vertices are already in
/// SW, SE, NE, NW order.
pub fn read_corner_field(file: &netcdf::File, name: &str) -> GridResult<CornerField> {
    let var = required(file, name)?;
    let shape = variable_shape(&var);
    if shape.len() != 3 || shape[0] != CORNER_COUNT {
        return Err(GridError::dimension_mismatch(
            format!("corner variable '{}'", name),
            vec![CORNER_COUNT, 0, 0],
            shape,
        ));
    }
    let values: Vec<f64> = var
        .get_values(..)
        .map_err(|e| GridError::netcdf(format!("failed to read '{}': {}", name, e)))?;
    CornerField::from_vec(shape[1], shape[2], values)
}

/// Check that a field has the expected `(ny, nx)` shape.
pub fn expect_shape<T>(field: &Field2D<T>, shape: (usize, usize), context: &str) -> GridResult<()> {
    if field.shape() != shape {
        return Err(GridError::dimension_mismatch(
            context,
            vec![shape.0, shape.1],
            vec![field.ny(), field.nx()],
        ));
    }
    Ok(())
}

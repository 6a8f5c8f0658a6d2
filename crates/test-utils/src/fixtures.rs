//! NetCDF fixture writers.
//!
//! Each writer produces a small file in the layout a model actually ships,
//! so the readers are exercised end to end.

use std::path::Path;

use crate::generators::{continent_mask, rectangle_area_m2, supergrid, CGrid, EARTH_RADIUS_M};

type NcResult = Result<(), netcdf::Error>;

fn put_f64(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: &[&str],
    values: &[f64],
) -> NcResult {
    let mut var = file.add_variable::<f64>(name, dims)?;
    var.put_values(values, ..)?;
    Ok(())
}

/// MOM `ocean_hgrid.nc` supergrid for `ny x nx` T cells.
pub fn write_mom_hgrid(path: &Path, ny: usize, nx: usize) -> NcResult {
    let sg = supergrid(ny, nx);
    let mut file = netcdf::create(path)?;
    file.add_dimension("nyp", sg.nyp)?;
    file.add_dimension("nxp", sg.nxp)?;
    file.add_dimension("ny", sg.nyp - 1)?;
    file.add_dimension("nx", sg.nxp - 1)?;

    put_f64(&mut file, "x", &["nyp", "nxp"], &sg.x)?;
    put_f64(&mut file, "y", &["nyp", "nxp"], &sg.y)?;
    put_f64(&mut file, "area", &["ny", "nx"], &sg.area)?;
    Ok(())
}

/// Mask file with variable `mask(ny, nx)`.
pub fn write_mask(path: &Path, ny: usize, nx: usize, values: &[f64]) -> NcResult {
    let mut file = netcdf::create(path)?;
    file.add_dimension("ny", ny)?;
    file.add_dimension("nx", nx)?;
    put_f64(&mut file, "mask", &["ny", "nx"], values)
}

/// Mask file with the standard continent pattern.
pub fn write_continent_mask(path: &Path, ny: usize, nx: usize) -> NcResult {
    write_mask(path, ny, nx, &continent_mask(ny, nx))
}

/// MOM 1° `grid_spec.nc` with T and C (velocity) cells.
pub fn write_mom1_grid_spec(path: &Path, ny: usize, nx: usize) -> NcResult {
    let grid = CGrid::new(ny, nx);
    let mut file = netcdf::create(path)?;
    file.add_dimension("vertex", 4)?;
    for p in ["T", "C"] {
        file.add_dimension(&format!("grid_y_{}", p), ny)?;
        file.add_dimension(&format!("grid_x_{}", p), nx)?;
    }

    // T centres are C-grid 't' points; C centres are the NE corners ('f').
    for (p, centre) in [("T", 't'), ("C", 'f')] {
        let (lon, lat) = grid.coordinates(centre);
        let dims = [format!("grid_y_{}", p), format!("grid_x_{}", p)];
        let dims: Vec<&str> = dims.iter().map(|s| s.as_str()).collect();
        put_f64(&mut file, &format!("x_{}", p), &dims, &lon)?;
        put_f64(&mut file, &format!("y_{}", p), &dims, &lat)?;

        let plane = ny * nx;
        let mut x_vert = vec![0.0; 4 * plane];
        let mut y_vert = vec![0.0; 4 * plane];
        let mut area = Vec::with_capacity(plane);
        for k in 0..plane {
            let (x, y) = (lon[k], lat[k]);
            let (w, e) = (x - grid.dlon / 2.0, x + grid.dlon / 2.0);
            let (s, n) = (
                (y - grid.dlat / 2.0).max(-90.0),
                (y + grid.dlat / 2.0).min(90.0),
            );
            for (v, (cx, cy)) in [(w, s), (e, s), (e, n), (w, n)].into_iter().enumerate() {
                x_vert[v * plane + k] = cx;
                y_vert[v * plane + k] = cy;
            }
            area.push(rectangle_area_m2(w, e, s, n));
        }
        let vdims = ["vertex", dims[0], dims[1]];
        put_f64(&mut file, &format!("x_vert_{}", p), &vdims, &x_vert)?;
        put_f64(&mut file, &format!("y_vert_{}", p), &vdims, &y_vert)?;
        put_f64(&mut file, &format!("area_{}", p), &dims, &area)?;
    }
    Ok(())
}

/// NEMO `coordinates.nc` with a leading time dimension, as NEMO writes it.
pub fn write_nemo_coordinates(path: &Path, ny: usize, nx: usize) -> NcResult {
    let grid = CGrid::new(ny, nx);
    let mut file = netcdf::create(path)?;
    file.add_dimension("t", 1)?;
    file.add_dimension("y", ny)?;
    file.add_dimension("x", nx)?;
    file.add_attribute("earth_radius", EARTH_RADIUS_M)?;

    let dims = ["t", "y", "x"];
    for point in ['t', 'u', 'v', 'f'] {
        let (glam, gphi) = grid.coordinates(point);
        put_f64(&mut file, &format!("glam{}", point), &dims, &glam)?;
        put_f64(&mut file, &format!("gphi{}", point), &dims, &gphi)?;
    }
    for point in ['t', 'u', 'v'] {
        let (e1, e2) = grid.scale_factors(point);
        put_f64(&mut file, &format!("e1{}", point), &dims, &e1)?;
        put_f64(&mut file, &format!("e2{}", point), &dims, &e2)?;
    }
    Ok(())
}

/// NEMO `mesh_mask.nc` with byte masks `(t, z, y, x)`; land follows the
/// continent pattern on every level.
pub fn write_nemo_mesh_mask(path: &Path, ny: usize, nx: usize) -> NcResult {
    let levels = 2;
    let surface: Vec<i8> = continent_mask(ny, nx)
        .into_iter()
        .map(|v| v as i8)
        .collect();
    let values: Vec<i8> = surface.iter().cycle().take(levels * ny * nx).copied().collect();

    let mut file = netcdf::create(path)?;
    file.add_dimension("t", 1)?;
    file.add_dimension("z", levels)?;
    file.add_dimension("y", ny)?;
    file.add_dimension("x", nx)?;
    for name in ["tmask", "umask", "vmask"] {
        let mut var = file.add_variable::<i8>(name, &["t", "z", "y", "x"])?;
        var.put_values(&values, ..)?;
    }
    Ok(())
}

/// Atmosphere mask `(lat, lon)` under a non-standard variable name, with
/// the northern half of the grid masked out.
pub fn write_atmosphere_mask(path: &Path, num_rows: usize, num_cols: usize) -> NcResult {
    let mut values = Vec::with_capacity(num_rows * num_cols);
    for j in 0..num_rows {
        let valid = if j < num_rows / 2 { 1.0 } else { 0.0 };
        values.extend(std::iter::repeat(valid).take(num_cols));
    }
    let mut file = netcdf::create(path)?;
    file.add_dimension("lat", num_rows)?;
    file.add_dimension("lon", num_cols)?;
    put_f64(&mut file, "lsm", &["lat", "lon"], &values)
}

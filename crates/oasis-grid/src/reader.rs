//! Reads coupling grid records back from an OASIS file triplet.

use grid_common::constants::{suffix, CORNER_COUNT, CORNER_DIM, GRID_ID_LEN, GRID_NAME_LEN};
use grid_common::{CornerField, Field2D, GridError, GridIdentifier, GridResult, PointType};
use model_grid::native;
use tracing::debug;

use crate::assembler::CouplingGridRecord;
use crate::writer::{variable_name, x_dimension, y_dimension, OutputPaths};

/// Reader for `grids.nc`, `areas.nc` and `masks.nc`.
pub struct OasisReader {
    grids: netcdf::File,
    areas: netcdf::File,
    masks: netcdf::File,
}

impl OasisReader {
    /// Open all three files.
    pub fn open(paths: &OutputPaths) -> GridResult<Self> {
        Ok(Self {
            grids: native::open(&paths.grids)?,
            areas: native::open(&paths.areas)?,
            masks: native::open(&paths.masks)?,
        })
    }

    /// Grid names in `grids.nc`, in file order.
    pub fn grid_names(&self) -> Vec<String> {
        let lon_suffix = format!(".{}", suffix::LON);
        self.grids
            .variables()
            .filter_map(|var| var.name().strip_suffix(&lon_suffix).map(str::to_string))
            .collect()
    }

    /// Read the record for one grid name.
    pub fn read(&self, name: &str) -> GridResult<CouplingGridRecord> {
        let (id, point) = parse_grid_name(name)?;
        let ny = dimension_len(&self.grids, &y_dimension(name))?;
        let nx = dimension_len(&self.grids, &x_dimension(name))?;

        let record = CouplingGridRecord {
            id,
            point,
            name: name.to_string(),
            lon: read_field(&self.grids, &variable_name(name, suffix::LON), ny, nx)?,
            lat: read_field(&self.grids, &variable_name(name, suffix::LAT), ny, nx)?,
            clo: read_corners(&self.grids, &variable_name(name, suffix::CORNER_LON), ny, nx)?,
            cla: read_corners(&self.grids, &variable_name(name, suffix::CORNER_LAT), ny, nx)?,
            srf: read_field(&self.areas, &variable_name(name, suffix::AREA), ny, nx)?,
            msk: read_mask(&self.masks, &variable_name(name, suffix::MASK), ny, nx)?,
        };
        debug!(name, ny, nx, "Read coupling grid");
        Ok(record)
    }

    /// Read every grid listed in `grids.nc`.
    pub fn read_all(&self) -> GridResult<Vec<CouplingGridRecord>> {
        self.grid_names().iter().map(|name| self.read(name)).collect()
    }
}

/// Split a five-character grid name into identifier and point type.
pub fn parse_grid_name(name: &str) -> GridResult<(GridIdentifier, PointType)> {
    if !name.is_ascii() || name.len() != GRID_NAME_LEN {
        return Err(GridError::Naming(format!(
            "'{}' is not a {}-character grid name",
            name, GRID_NAME_LEN
        )));
    }
    let (id, point) = name.split_at(GRID_ID_LEN);
    Ok((GridIdentifier::new(id)?, point.parse()?))
}

fn dimension_len(file: &netcdf::File, name: &str) -> GridResult<usize> {
    file.dimension(name)
        .map(|d| d.len())
        .ok_or_else(|| GridError::netcdf(format!("missing dimension '{}'", name)))
}

fn checked_variable<'f>(
    file: &'f netcdf::File,
    name: &str,
    expected: &[usize],
) -> GridResult<netcdf::Variable<'f>> {
    let var = file
        .variable(name)
        .ok_or_else(|| GridError::netcdf(format!("missing variable '{}'", name)))?;
    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    if shape != expected {
        return Err(GridError::dimension_mismatch(name, expected, shape));
    }
    Ok(var)
}

fn read_error(name: &str) -> impl Fn(netcdf::Error) -> GridError + '_ {
    move |e| GridError::netcdf(format!("failed to read '{}': {}", name, e))
}

fn read_field(file: &netcdf::File, name: &str, ny: usize, nx: usize) -> GridResult<Field2D<f64>> {
    let values: Vec<f64> = checked_variable(file, name, &[ny, nx])?
        .get_values(..)
        .map_err(read_error(name))?;
    Field2D::from_vec(ny, nx, values)
}

fn read_mask(file: &netcdf::File, name: &str, ny: usize, nx: usize) -> GridResult<Field2D<i32>> {
    let values: Vec<i32> = checked_variable(file, name, &[ny, nx])?
        .get_values(..)
        .map_err(read_error(name))?;
    Field2D::from_vec(ny, nx, values)
}

fn read_corners(file: &netcdf::File, name: &str, ny: usize, nx: usize) -> GridResult<CornerField> {
    let corners = dimension_len(file, CORNER_DIM)?;
    if corners != CORNER_COUNT {
        return Err(GridError::dimension_mismatch(
            format!("dimension '{}'", CORNER_DIM),
            vec![CORNER_COUNT],
            vec![corners],
        ));
    }
    let values: Vec<f64> = checked_variable(file, name, &[CORNER_COUNT, ny, nx])?
        .get_values(..)
        .map_err(read_error(name))?;
    CornerField::from_vec(ny, nx, values)
}

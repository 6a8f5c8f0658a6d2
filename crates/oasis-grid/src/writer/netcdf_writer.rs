use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use grid_common::constants::{suffix, CORNER_COUNT, CORNER_DIM};
use grid_common::{GridError, GridResult};
use netcdf::AttributeValue;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{variable_name, x_dimension, y_dimension, OasisFile, OutputPaths};
use crate::assembler::CouplingGridRecord;
use crate::config::OasisConventions;

fn nc_error(path: &Path) -> impl Fn(netcdf::Error) -> GridError + '_ {
    move |e| GridError::netcdf(format!("{}: {}", path.display(), e))
}

/// Writer for `grids.nc`, `areas.nc` and `masks.nc`.
///
/// Each file is built in a temporary file next to its target and renamed
/// over it once complete; a failed write leaves the target untouched.
#[derive(Debug, Clone, Default)]
pub struct OasisWriter {
    conventions: OasisConventions,
    merge: bool,
}

impl OasisWriter {
    pub fn new(conventions: OasisConventions) -> Self {
        Self {
            conventions,
            merge: false,
        }
    }

    /// Keep variables of other grids already present in the targets.
    ///
    /// Grids with the same name as a record being written are replaced.
    pub fn with_merge(mut self, merge: bool) -> Self {
        self.merge = merge;
        self
    }

    pub fn write_grids(&self, records: &[CouplingGridRecord], path: &Path) -> GridResult<()> {
        self.stage(OasisFile::Grids, records, path)?.commit()
    }

    pub fn write_areas(&self, records: &[CouplingGridRecord], path: &Path) -> GridResult<()> {
        self.stage(OasisFile::Areas, records, path)?.commit()
    }

    pub fn write_masks(&self, records: &[CouplingGridRecord], path: &Path) -> GridResult<()> {
        self.stage(OasisFile::Masks, records, path)?.commit()
    }

    /// Write all three files. Nothing is replaced unless every file was
    /// built successfully.
    pub fn write_all(&self, records: &[CouplingGridRecord], paths: &OutputPaths) -> GridResult<()> {
        let staged = OasisFile::ALL
            .iter()
            .map(|&file| self.stage(file, records, paths.get(file)))
            .collect::<GridResult<Vec<_>>>()?;
        for file in staged {
            file.commit()?;
        }
        Ok(())
    }

    fn stage(
        &self,
        kind: OasisFile,
        records: &[CouplingGridRecord],
        path: &Path,
    ) -> GridResult<StagedFile> {
        check_unique_names(records)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".oasis-").suffix(".nc");
        #[cfg(unix)]
        {
            // Created like any new file: 0666 minus the process umask
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let temp = builder.tempfile_in(dir)?;

        {
            let mut file = netcdf::create(temp.path()).map_err(nc_error(temp.path()))?;

            let merged = if self.merge && path.exists() {
                copy_other_grids(&mut file, path, records)?
            } else {
                Vec::new()
            };
            for record in records {
                self.write_record(&mut file, kind, record)?;
            }

            let title = format!("{}: {}", self.conventions.title, kind.title());
            file.add_attribute("title", title)
                .map_err(nc_error(temp.path()))?;
            file.add_attribute("history", history(records, &merged))
                .map_err(nc_error(temp.path()))?;

            info!(
                path = %path.display(),
                file = %kind,
                grids = records.len(),
                kept = merged.len(),
                "Built OASIS file"
            );
        }

        Ok(StagedFile {
            temp,
            target: path.to_path_buf(),
        })
    }

    fn write_record(
        &self,
        file: &mut netcdf::FileMut,
        kind: OasisFile,
        record: &CouplingGridRecord,
    ) -> GridResult<()> {
        let name = record.name.as_str();
        let (ny, nx) = record.shape();
        let (ydim, xdim) = (y_dimension(name), x_dimension(name));
        ensure_dimension(file, &ydim, ny)?;
        ensure_dimension(file, &xdim, nx)?;
        let dims = [ydim.as_str(), xdim.as_str()];

        match kind {
            OasisFile::Grids => {
                ensure_dimension(file, CORNER_DIM, CORNER_COUNT)?;
                let corner_dims = [CORNER_DIM, ydim.as_str(), xdim.as_str()];
                put_variable(
                    file,
                    &variable_name(name, suffix::LON),
                    &dims,
                    Values::F64(record.lon.as_slice()),
                    &attributes("degrees_east", &format!("{} cell centre longitude", name)),
                )?;
                put_variable(
                    file,
                    &variable_name(name, suffix::LAT),
                    &dims,
                    Values::F64(record.lat.as_slice()),
                    &attributes("degrees_north", &format!("{} cell centre latitude", name)),
                )?;
                put_variable(
                    file,
                    &variable_name(name, suffix::CORNER_LON),
                    &corner_dims,
                    Values::F64(record.clo.as_slice()),
                    &attributes("degrees_east", &format!("{} cell corner longitude", name)),
                )?;
                put_variable(
                    file,
                    &variable_name(name, suffix::CORNER_LAT),
                    &corner_dims,
                    Values::F64(record.cla.as_slice()),
                    &attributes("degrees_north", &format!("{} cell corner latitude", name)),
                )?;
            }
            OasisFile::Areas => {
                put_variable(
                    file,
                    &variable_name(name, suffix::AREA),
                    &dims,
                    Values::F64(record.srf.as_slice()),
                    &attributes("sr", &format!("{} cell area", name)),
                )?;
            }
            OasisFile::Masks => {
                let polarity = self.conventions.mask_polarity.description();
                let long_name = format!("{} {}", name, polarity);
                put_variable(
                    file,
                    &variable_name(name, suffix::MASK),
                    &dims,
                    Values::I32(record.msk.as_slice()),
                    &attributes("1", &long_name),
                )?;
            }
        }
        debug!(name, file = %kind, ny, nx, "Wrote grid variables");
        Ok(())
    }
}

/// A fully written temporary file waiting to replace its target.
struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    fn commit(self) -> GridResult<()> {
        // An existing target keeps its mode
        if let Ok(existing) = std::fs::metadata(&self.target) {
            std::fs::set_permissions(self.temp.path(), existing.permissions())?;
        }
        self.temp
            .persist(&self.target)
            .map_err(|e| GridError::Io(e.error))?;
        debug!(path = %self.target.display(), "Replaced output file");
        Ok(())
    }
}

enum Values<'a> {
    F64(&'a [f64]),
    I32(&'a [i32]),
}

fn attributes(units: &str, long_name: &str) -> Vec<(String, AttributeValue)> {
    vec![
        ("units".to_string(), units.into()),
        ("long_name".to_string(), long_name.into()),
    ]
}

fn put_variable(
    file: &mut netcdf::FileMut,
    name: &str,
    dims: &[&str],
    values: Values,
    attributes: &[(String, AttributeValue)],
) -> GridResult<()> {
    let err = |e: netcdf::Error| GridError::netcdf(format!("writing '{}': {}", name, e));
    let mut var = match values {
        Values::F64(values) => {
            let mut var = file.add_variable::<f64>(name, dims).map_err(err)?;
            var.put_values(values, ..).map_err(err)?;
            var
        }
        Values::I32(values) => {
            let mut var = file.add_variable::<i32>(name, dims).map_err(err)?;
            var.put_values(values, ..).map_err(err)?;
            var
        }
    };
    for (key, value) in attributes {
        var.put_attribute(key, value.clone()).map_err(err)?;
    }
    Ok(())
}

fn ensure_dimension(file: &mut netcdf::FileMut, name: &str, len: usize) -> GridResult<()> {
    match file.dimension(name).map(|d| d.len()) {
        Some(existing) if existing == len => Ok(()),
        Some(existing) => Err(GridError::dimension_mismatch(
            format!("dimension '{}'", name),
            vec![len],
            vec![existing],
        )),
        None => {
            file.add_dimension(name, len)
                .map_err(|e| GridError::netcdf(format!("adding dimension '{}': {}", name, e)))?;
            Ok(())
        }
    }
}

fn check_unique_names(records: &[CouplingGridRecord]) -> GridResult<()> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.name.as_str()) {
            return Err(GridError::configuration(format!(
                "grid '{}' appears more than once",
                record.name
            )));
        }
    }
    Ok(())
}

/// Copy variables of grids not in `records` from an existing file.
/// Returns the names of the grids kept.
fn copy_other_grids(
    out: &mut netcdf::FileMut,
    existing: &Path,
    records: &[CouplingGridRecord],
) -> GridResult<Vec<String>> {
    let replaced: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let source = netcdf::open(existing).map_err(nc_error(existing))?;
    let mut kept: Vec<String> = Vec::new();

    for var in source.variables() {
        let var_name = var.name();
        let grid = var_name.split_once('.').map_or(var_name.as_str(), |(grid, _)| grid);
        if replaced.contains(grid) {
            continue;
        }

        let dims: Vec<(String, usize)> =
            var.dimensions().iter().map(|d| (d.name(), d.len())).collect();
        for (dim, len) in &dims {
            ensure_dimension(out, dim, *len)?;
        }
        let dim_names: Vec<&str> = dims.iter().map(|(dim, _)| dim.as_str()).collect();

        let attrs = var
            .attributes()
            .map(|attr| -> Result<(String, AttributeValue), netcdf::Error> {
                Ok((attr.name().to_string(), attr.value()?))
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(nc_error(existing))?;

        if var_name.ends_with(&format!(".{}", suffix::MASK)) {
            let values: Vec<i32> = var.get_values(..).map_err(nc_error(existing))?;
            put_variable(out, &var_name, &dim_names, Values::I32(&values), &attrs)?;
        } else {
            let values: Vec<f64> = var.get_values(..).map_err(nc_error(existing))?;
            put_variable(out, &var_name, &dim_names, Values::F64(&values), &attrs)?;
        }

        if !kept.iter().any(|k| k == grid) {
            kept.push(grid.to_string());
        }
    }

    debug!(path = %existing.display(), kept = ?kept, "Merged existing grids");
    Ok(kept)
}

fn history(records: &[CouplingGridRecord], kept: &[String]) -> String {
    let written: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    let mut history = format!(
        "{} {} {}: wrote {}",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        written.join(" ")
    );
    if !kept.is_empty() {
        history.push_str(&format!("; kept {}", kept.join(" ")));
    }
    history
}

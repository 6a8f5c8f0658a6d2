//! One conversion run: validate, read, assemble, write.

use std::path::{Path, PathBuf};

use grid_common::{GridError, GridResult};
use model_grid::{Mom1Grid, MomGrid, ModelGrid, NemoGrid, RegularGrid};
use oasis_grid::{CouplingGridAssembler, OasisWriter, OutputPaths};
use tracing::info;

use crate::config::{DriverConfig, GridFamily};

/// What a successful run wrote.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub description: String,
    pub grid_names: Vec<String>,
    pub outputs: OutputPaths,
}

fn required<'a>(path: &'a Option<PathBuf>, family: GridFamily, flag: &str) -> GridResult<&'a Path> {
    path.as_deref()
        .ok_or_else(|| GridError::configuration(format!("{} grid requires {}", family, flag)))
}

/// Construct the model grid selected by `config`.
pub fn load_grid(config: &DriverConfig) -> GridResult<Box<dyn ModelGrid>> {
    let family = config.family;
    let mask = config.mask.as_deref();

    let grid: Box<dyn ModelGrid> = match family {
        GridFamily::Mom => Box::new(MomGrid::from_files(
            required(&config.hgrid, family, "--model-hgrid")?,
            required(&config.mask, family, "--model-mask")?,
        )?),
        GridFamily::Mom1 => Box::new(Mom1Grid::from_files(
            required(&config.hgrid, family, "--model-hgrid")?,
            required(&config.mask, family, "--model-mask")?,
        )?),
        GridFamily::Nemo => Box::new(NemoGrid::from_files(
            required(&config.hgrid, family, "--model-hgrid")?,
            required(&config.mask, family, "--model-mask")?,
        )?),
        GridFamily::Spe => Box::new(RegularGrid::spectral(
            config.num_cols,
            config.num_rows,
            mask,
        )?),
        GridFamily::Fvo => Box::new(RegularGrid::finite_volume(
            config.num_cols,
            config.num_rows,
            mask,
        )?),
    };
    Ok(grid)
}

/// Run a full conversion. Outputs are only replaced once every grid has
/// been read and assembled and all three files are built.
pub fn run(config: &DriverConfig) -> GridResult<RunSummary> {
    config.validate()?;
    let id = config.identifier()?;

    info!(
        model = %config.family,
        id = %id,
        hgrid = ?config.hgrid.as_deref().map(Path::display),
        mask = ?config.mask.as_deref().map(Path::display),
        "Reading model grid"
    );
    let grid = load_grid(config)?;

    let records = CouplingGridAssembler::new(config.conventions.clone()).assemble(
        &id,
        grid.as_ref(),
        config.family.point_types(),
    )?;

    OasisWriter::new(config.conventions.clone())
        .with_merge(config.merge)
        .write_all(&records, &config.outputs)?;

    let summary = RunSummary {
        description: grid.description().to_string(),
        grid_names: records.iter().map(|r| r.name.clone()).collect(),
        outputs: config.outputs.clone(),
    };
    info!(
        grid = %summary.description,
        names = ?summary.grid_names,
        grids = %summary.outputs.grids.display(),
        areas = %summary.outputs.areas.display(),
        masks = %summary.outputs.masks.display(),
        "Wrote OASIS grid files"
    );
    Ok(summary)
}

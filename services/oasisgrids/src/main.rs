//! oasisgrids
//!
//! Writes the OASIS coupler grid files for one model grid.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use oasis_grid::{OasisConventions, OutputPaths};
use oasisgrids::{DriverConfig, GridFamily, DEFAULT_NUM_COLS, DEFAULT_NUM_ROWS};

#[derive(Parser, Debug)]
#[command(name = "oasisgrids")]
#[command(about = "Create OASIS grids.nc, areas.nc and masks.nc from a model grid")]
#[command(version)]
struct Args {
    /// Model grid type: MOM, MOM1, NEMO, SPE or FVO
    model: GridFamily,

    /// Four-character grid identifier (default depends on the model)
    #[arg(long)]
    grid_name: Option<String>,

    /// Grid definition file (ocean_hgrid.nc, grid_spec.nc or coordinates.nc)
    #[arg(long)]
    model_hgrid: Option<PathBuf>,

    /// Land/sea mask file
    #[arg(long)]
    model_mask: Option<PathBuf>,

    /// Number of columns of a SPE or FVO grid
    #[arg(long, default_value_t = DEFAULT_NUM_COLS)]
    model_cols: usize,

    /// Number of rows of a SPE or FVO grid
    #[arg(long, default_value_t = DEFAULT_NUM_ROWS)]
    model_rows: usize,

    /// Output grids file
    #[arg(long, default_value = "grids.nc", env = "OASIS_GRIDS_FILE")]
    grids: PathBuf,

    /// Output areas file
    #[arg(long, default_value = "areas.nc", env = "OASIS_AREAS_FILE")]
    areas: PathBuf,

    /// Output masks file
    #[arg(long, default_value = "masks.nc", env = "OASIS_MASKS_FILE")]
    masks: PathBuf,

    /// Keep other grids already present in the output files
    #[arg(long)]
    merge: bool,

    /// YAML file with mask polarity and longitude range
    #[arg(long, env = "OASIS_CONVENTIONS")]
    conventions: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version print to stdout and succeed
            let failed = e.use_stderr();
            let _ = e.print();
            return if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    if let Err(e) = init_tracing(&args.log_level, args.log_json) {
        eprintln!("oasisgrids: failed to initialize logging: {}", e);
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Conversion failed");
            eprintln!("oasisgrids: error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let conventions = match &args.conventions {
        Some(path) => OasisConventions::from_yaml_file(path)
            .with_context(|| format!("failed to load conventions from {}", path.display()))?,
        None => OasisConventions::from_env().context("invalid OASIS_* environment variable")?,
    };

    info!(
        model = %args.model,
        mask_polarity = %conventions.mask_polarity,
        lon_range = %conventions.lon_range,
        merge = args.merge,
        "Starting oasisgrids"
    );

    let config = DriverConfig {
        family: args.model,
        grid_id: args.grid_name,
        hgrid: args.model_hgrid,
        mask: args.model_mask,
        num_cols: args.model_cols,
        num_rows: args.model_rows,
        outputs: OutputPaths::new(args.grids, args.areas, args.masks),
        merge: args.merge,
        conventions,
    };

    let summary = oasisgrids::run(&config)
        .with_context(|| format!("failed to write OASIS grids for {} model", config.family))?;
    info!(names = ?summary.grid_names, "Done");
    Ok(())
}

//! starlift: load S3 JSON event logs and song metadata into a Redshift
//! star schema.
//!
//! Every run is a full refresh: drop the tables, recreate them, bulk-load
//! the staging tables with COPY, then reshape staging into the fact and
//! dimension tables. `--stage` narrows a run to one of those phases and
//! `--dry-run` prints the statements without connecting.

mod catalog;
mod config;
mod error;
mod etl;
mod load;
mod schema;
mod transform;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use error::EtlError;
use etl::{Etl, Stage};

/// S3 JSON to Redshift star-schema loader.
#[derive(Parser, Debug)]
#[command(name = "starlift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(short, long)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the resolved statements without connecting to the warehouse.
    #[arg(long)]
    dry_run: bool,

    /// Which part of the run to execute.
    #[arg(long, value_enum, default_value_t = StageArg::All)]
    stage: StageArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StageArg {
    /// Full refresh: drop, create, copy, insert.
    All,
    /// Drop and recreate all tables.
    Schema,
    /// Bulk-load the staging tables.
    Load,
    /// Populate the star schema from staging.
    Transform,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::All => Stage::All,
            StageArg::Schema => Stage::Schema,
            StageArg::Load => Stage::Load,
            StageArg::Transform => Stage::Transform,
        }
    }
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), EtlError> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("starlift starting");

    let config = Config::from_file(&args.config)?;

    if args.dry_run {
        info!("Dry run mode - printing statement catalogs");
        for stmt in catalog::full_run(&config)? {
            println!("-- [{}] {}", stmt.stage, stmt.name);
            println!("{}\n", stmt.sql);
        }
        return Ok(());
    }

    let mut etl = Etl::connect(config).await?;
    let stats = etl.run(args.stage.into()).await?;

    info!("Run completed successfully");
    info!("  Statements executed: {}", stats.statements_executed);
    info!("  Rows loaded into staging: {}", stats.rows_loaded);
    info!("  Rows inserted into model: {}", stats.rows_inserted);

    Ok(())
}

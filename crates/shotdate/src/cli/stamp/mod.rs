//! The `shotdate stamp` command.

mod batch;
pub mod types;

pub use types::ReportFormat;

use clap::Args;
use shotdate_core::{Config, StampOptions, Stamper};
use std::path::PathBuf;
use std::sync::Arc;

use batch::stamp_batch;

/// Arguments for the `stamp` command.
#[derive(Args, Debug)]
pub struct StampArgs {
    /// Screenshot files or directories to stamp
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Report what would be written without modifying any file
    #[arg(long, visible_alias = "dryrun")]
    pub dry_run: bool,

    /// Overwrite files that already carry EXIF or XMP metadata
    #[arg(long)]
    pub force: bool,

    /// Number of files stamped concurrently [default: processing.parallel_workers]
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Execute the stamp command.
pub async fn execute(args: StampArgs, config: Config) -> anyhow::Result<()> {
    let workers = args
        .parallel
        .unwrap_or(config.processing.parallel_workers)
        .max(1);
    let options = StampOptions {
        dry_run: args.dry_run,
        force: args.force,
    };
    if options.dry_run {
        tracing::info!("Dry run: no files will be modified");
    }

    let stamper = Arc::new(Stamper::new(&config));
    let files = stamper.discover(&args.paths);
    if files.is_empty() {
        tracing::warn!("No image files found in {:?}", args.paths);
        return Ok(());
    }
    tracing::debug!("Stamping {} files with {} workers", files.len(), workers);

    stamp_batch(stamper, files, options, workers, args.format.into()).await
}

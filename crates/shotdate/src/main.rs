//! Shotdate CLI - give screenshots a capture date.
//!
//! Screenshots rarely carry EXIF dates, so photo libraries misplace them.
//! Shotdate infers the capture time from the file name or modification time
//! and writes it into the file's EXIF and XMP tags.
//!
//! # Usage
//!
//! ```bash
//! # Preview what would be written
//! shotdate stamp --dry-run Screenshot_20190815-073404.png
//!
//! # Stamp a whole directory, four files at a time
//! shotdate stamp --parallel 4 ~/Pictures/Screenshots
//!
//! # Show date fields already present
//! shotdate inspect photo.jpg
//! ```

use clap::{Parser, Subcommand};
use shotdate_core::Config;
use std::path::{Path, PathBuf};

mod cli;
mod logging;

/// Shotdate - infer and embed capture timestamps for screenshots.
#[derive(Parser, Debug)]
#[command(name = "shotdate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, env = "SHOTDATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Write an inferred capture date into screenshots
    Stamp(cli::stamp::StampArgs),

    /// Show date-bearing metadata already present in files
    Inspect(cli::inspect::InspectArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

/// Resolve the config file location, expanding a leading `~`.
fn config_path(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref()),
        None => Config::default_path(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let path = config_path(cli.config.as_deref());

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let loaded = if path.exists() {
        Config::load_from(&path)
    } else {
        Ok(Config::default())
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config from {}: {e}\n  \
                 Using default configuration. Check your config file with `shotdate config path`.",
                path.display()
            );
            Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Shotdate v{}", shotdate_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Stamp(args) => cli::stamp::execute(args, config).await,
        Commands::Inspect(args) => cli::inspect::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args, &config, &path),
    }
}

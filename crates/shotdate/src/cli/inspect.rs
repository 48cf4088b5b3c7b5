//! The `shotdate inspect` command.

use clap::Args;
use shotdate_core::{Config, MetadataSnapshot, Stamper};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Arguments for the `inspect` command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Image files or directories to inspect
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Also show fields whose value contains this text
    #[arg(long)]
    pub fragment: Option<String>,
}

/// Execute the inspect command.
pub fn execute(args: InspectArgs, config: &Config) -> anyhow::Result<()> {
    let stamper = Stamper::new(config);
    for path in stamper.discover(&args.paths) {
        match stamper.inspect(&path, args.fragment.as_deref()) {
            Ok(fields) => println!("{}", render(&path, &fields)),
            Err(e) => tracing::error!("Failed: {:?} - {}", path, e),
        }
    }
    Ok(())
}

fn render(path: &Path, fields: &MetadataSnapshot) -> String {
    if fields.is_empty() {
        return format!("{}: no date fields", path.display());
    }
    let mut out = format!("{}:", path.display());
    for (key, value) in fields.iter() {
        let _ = write!(out, "\n  {key} = {value}");
    }
    out
}

//! Batch stamping: ordered parallel execution with progress and a summary.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use shotdate_core::{OutputFormat, OutputWriter, StampOptions, Stamper, WriteDecision};

/// Per-outcome counters for the summary table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Tally {
    written: u64,
    dry_run: u64,
    skipped: u64,
    failed: u64,
}

impl Tally {
    fn record(&mut self, decision: &WriteDecision) {
        match decision {
            WriteDecision::Written(_) => self.written += 1,
            WriteDecision::DryRun(_) => self.dry_run += 1,
            WriteDecision::Skipped(_) => self.skipped += 1,
        }
    }

    fn total(&self) -> u64 {
        self.written + self.dry_run + self.skipped + self.failed
    }
}

/// Stamp `files` with at most `workers` in flight, reporting in input order.
///
/// A failing file is logged and counted; the batch always runs to the end.
pub async fn stamp_batch(
    stamper: Arc<Stamper>,
    files: Vec<PathBuf>,
    options: StampOptions,
    workers: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let progress = (files.len() > 1).then(|| create_progress_bar(files.len() as u64));
    let mut writer = OutputWriter::new(io::stdout(), format);
    let mut tally = Tally::default();
    let start_time = std::time::Instant::now();

    let mut results = stream::iter(files)
        .map(|path| stamper.clone().stamp_async(path, options))
        .buffered(workers);

    while let Some(result) = results.next().await {
        match result {
            Ok(report) => {
                tally.record(&report.decision);
                match &progress {
                    Some(pb) => pb.suspend(|| writer.write(&report))?,
                    None => writer.write(&report)?,
                }
            }
            Err(e) => {
                tally.failed += 1;
                tracing::error!("Failed: {:?} - {}", e.path(), e);
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
            let elapsed = start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                pb.set_message(format!("{:.1} files/sec", tally.total() as f64 / elapsed));
            }
        }
    }
    writer.flush()?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    print_summary(&tally, start_time.elapsed());

    Ok(())
}

/// Create a progress bar for batch processing.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after batch processing.
fn print_summary(tally: &Tally, elapsed: std::time::Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Written:      {:>8}", tally.written);
    if tally.dry_run > 0 {
        eprintln!("    Dry run:      {:>8}", tally.dry_run);
    }
    if tally.skipped > 0 {
        eprintln!("    Skipped:      {:>8}", tally.skipped);
    }
    if tally.failed > 0 {
        eprintln!("    Failed:       {:>8}", tally.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", tally.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotdate_core::types::SkipReason;
    use shotdate_core::WriteSet;

    #[test]
    fn test_tally_counts_each_decision() {
        let mut tally = Tally::default();
        tally.record(&WriteDecision::Written(WriteSet::new()));
        tally.record(&WriteDecision::DryRun(WriteSet::new()));
        tally.record(&WriteDecision::DryRun(WriteSet::new()));
        tally.record(&WriteDecision::Skipped(SkipReason::ExistingMetadata { tags: 1 }));
        tally.failed += 1;

        assert_eq!(
            tally,
            Tally {
                written: 1,
                dry_run: 2,
                skipped: 1,
                failed: 1,
            }
        );
        assert_eq!(tally.total(), 5);
    }

    #[tokio::test]
    async fn test_batch_survives_failures() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"not an image").unwrap();
        let missing = dir.path().join("missing.png");

        let stamper = Arc::new(Stamper::new(&shotdate_core::Config::default()));
        let options = StampOptions {
            dry_run: true,
            force: false,
        };
        stamp_batch(stamper, vec![text, missing], options, 2, OutputFormat::Text)
            .await
            .unwrap();
    }
}

//! Pipeline orchestration - wires together all processing stages.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::codec::{ContainerCodec, MetadataCodec};
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{FileReport, MetadataSnapshot};

use super::discovery::FileDiscovery;
use super::extract::CandidateExtractor;
use super::resolve::Resolver;
use super::writer::{MetadataWriter, StampOptions};

/// Runs one file through extraction, resolution and writing.
pub struct Stamper {
    extractor: CandidateExtractor,
    writer: MetadataWriter,
    codec: Arc<dyn MetadataCodec>,
    discovery: FileDiscovery,
}

impl Stamper {
    /// Create a stamper that edits real files.
    pub fn new(config: &Config) -> Self {
        Self::with_codec(config, Arc::new(ContainerCodec::new()))
    }

    /// Create a stamper backed by an arbitrary codec.
    pub fn with_codec(config: &Config, codec: Arc<dyn MetadataCodec>) -> Self {
        Self {
            extractor: CandidateExtractor::new(config.processing.clone()),
            writer: MetadataWriter::new(
                codec.clone(),
                Resolver::new(&config.resolver),
                &config.writer,
            ),
            codec,
            discovery: FileDiscovery::new(config.processing.clone()),
        }
    }

    /// Stamp a single file.
    pub fn stamp(&self, path: &Path, options: &StampOptions) -> PipelineResult<FileReport> {
        let start = std::time::Instant::now();
        let path = absolute(path)?;
        tracing::debug!("Stamping: {:?}", path);

        let info = self.extractor.gather_file_info(&path)?;
        tracing::trace!("  Candidates: {:?}", info.candidates);

        let decision = self.writer.persist(&path, &info, options)?;
        tracing::debug!("Finished {:?} in {:?}", path, start.elapsed());

        Ok(FileReport::new(info, decision))
    }

    /// Stamp a file on tokio's blocking pool.
    pub async fn stamp_async(
        self: Arc<Self>,
        path: PathBuf,
        options: StampOptions,
    ) -> PipelineResult<FileReport> {
        let worker_path = path.clone();
        tokio::task::spawn_blocking(move || self.stamp(&worker_path, &options))
            .await
            .map_err(|e| PipelineError::Worker {
                path,
                message: e.to_string(),
            })?
    }

    /// Date-bearing metadata already present in a file.
    ///
    /// Keeps entries whose key mentions a date or time, plus those whose
    /// value contains `fragment`.
    pub fn inspect(&self, path: &Path, fragment: Option<&str>) -> PipelineResult<MetadataSnapshot> {
        let path = absolute(path)?;
        let snapshot = self
            .codec
            .read(&path)
            .map_err(|e| PipelineError::container(&path, e))?;

        let mut matches = MetadataSnapshot::new();
        for (key, value) in snapshot.iter() {
            let lower = key.to_ascii_lowercase();
            let dated = lower.contains("date") || lower.contains("time");
            let fragment_hit = fragment.is_some_and(|f| value.contains(f));
            if dated || fragment_hit {
                matches.insert(key, value);
            }
        }
        Ok(matches)
    }

    /// Expand inputs into the files to stamp.
    pub fn discover(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        self.discovery.discover_all(inputs)
    }
}

fn absolute(path: &Path) -> PipelineResult<PathBuf> {
    std::path::absolute(path).map_err(|e| PipelineError::file_access(path, e))
}

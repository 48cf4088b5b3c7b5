//! Non-destructive metadata writer.

use chrono::NaiveDateTime;
use std::path::Path;
use std::sync::Arc;

use crate::codec::{keys, MetadataCodec};
use crate::config::WriterConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{FileInfo, SkipReason, TagValue, WriteDecision, WriteSet};

use super::resolve::Resolver;

/// Options for a single stamp operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StampOptions {
    /// Compute and report the write-set without touching the file
    pub dry_run: bool,
    /// Overwrite files that already carry EXIF or XMP tags
    pub force: bool,
}

/// Resolves a file's timestamp and commits it through a codec, refusing to
/// touch files that already carry metadata unless forced.
pub struct MetadataWriter {
    codec: Arc<dyn MetadataCodec>,
    resolver: Resolver,
    subject: Vec<String>,
}

impl MetadataWriter {
    pub fn new(codec: Arc<dyn MetadataCodec>, resolver: Resolver, config: &WriterConfig) -> Self {
        Self {
            codec,
            resolver,
            subject: config.subject.clone(),
        }
    }

    /// The tag assignments written for a resolved timestamp.
    pub fn build_write_set(&self, timestamp: NaiveDateTime) -> WriteSet {
        let mut set = WriteSet::new();
        for key in keys::DATE_KEYS {
            set.insert(key, TagValue::DateTime(timestamp));
        }
        set.insert(keys::XMP_SUBJECT, TagValue::Strings(self.subject.clone()));
        set
    }

    /// Decide what to do with `path` and, unless dry-running, do it.
    ///
    /// Existing tags without `force` yield `Skipped` and leave the file
    /// untouched. Resolution failures propagate unchanged.
    pub fn persist(
        &self,
        path: &Path,
        info: &FileInfo,
        options: &StampOptions,
    ) -> PipelineResult<WriteDecision> {
        let existing = self
            .codec
            .read(path)
            .map_err(|e| PipelineError::container(path, e))?;

        if !existing.is_empty() {
            if !options.force {
                tracing::info!(
                    "Skipping {:?}: {} existing metadata tags (use --force to overwrite)",
                    path,
                    existing.len()
                );
                return Ok(WriteDecision::Skipped(SkipReason::ExistingMetadata {
                    tags: existing.len(),
                }));
            }
            tracing::warn!(
                "Overwriting {} existing metadata tags in {:?}",
                existing.len(),
                path
            );
        }

        let timestamp = self.resolver.choose_best_datetime(info)?;
        let set = self.build_write_set(timestamp);

        if options.dry_run {
            return Ok(WriteDecision::DryRun(set));
        }

        self.codec
            .commit(path, info.format, &set, true)
            .map_err(|e| PipelineError::container(path, e))?;
        tracing::debug!("Stamped {:?} with {}", path, timestamp);
        Ok(WriteDecision::Written(set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{render_raw, MemoryCodec};
    use crate::types::{CandidateSource, ImageFormat, MetadataSnapshot};
    use chrono::NaiveDate;

    const PATH: &str = "/shots/Screenshot_20190815-073404.png";

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 8, 15)
            .unwrap()
            .and_hms_opt(7, 34, 4)
            .unwrap()
    }

    fn info() -> FileInfo {
        FileInfo::new(PATH, ImageFormat::Png)
            .with_candidate(CandidateSource::FilenamePattern, ts())
    }

    fn writer(codec: Arc<MemoryCodec>) -> MetadataWriter {
        MetadataWriter::new(codec, Resolver::default(), &WriterConfig::default())
    }

    fn existing() -> MetadataSnapshot {
        let mut snapshot = MetadataSnapshot::new();
        snapshot.insert(keys::EXIF_DATETIME_ORIGINAL, "2001:01:01 00:00:00");
        snapshot.insert("Exif.Image.Make", "Pixel");
        snapshot
    }

    #[test]
    fn test_write_set_contents() {
        let set = writer(Arc::new(MemoryCodec::new())).build_write_set(ts());
        assert_eq!(set.len(), 7);
        for key in keys::DATE_KEYS {
            assert_eq!(set.get(key), Some(&TagValue::DateTime(ts())));
        }
        assert_eq!(
            set.get(keys::XMP_SUBJECT),
            Some(&TagValue::Strings(vec!["Screenshot".into()]))
        );
    }

    #[test]
    fn test_configured_subject() {
        let config = WriterConfig {
            subject: vec!["Screenshot".into(), "Phone".into()],
        };
        let writer = MetadataWriter::new(Arc::new(MemoryCodec::new()), Resolver::default(), &config);
        assert_eq!(
            writer.build_write_set(ts()).get(keys::XMP_SUBJECT),
            Some(&TagValue::Strings(vec!["Screenshot".into(), "Phone".into()]))
        );
    }

    #[test]
    fn test_writes_fresh_file() {
        let codec = Arc::new(MemoryCodec::new());
        let decision = writer(codec.clone())
            .persist(Path::new(PATH), &info(), &StampOptions::default())
            .unwrap();

        assert!(matches!(decision, WriteDecision::Written(_)));
        assert_eq!(codec.commits(), 1);
        let snapshot = codec.snapshot(Path::new(PATH));
        assert_eq!(snapshot.get(keys::EXIF_DATETIME), Some("2019:08:15 07:34:04"));
        assert_eq!(snapshot.get(keys::XMP_CREATE_DATE), Some("2019-08-15T07:34:04"));
    }

    #[test]
    fn test_existing_metadata_is_left_alone() {
        let codec = Arc::new(MemoryCodec::new().with_file(PATH, existing()));
        let decision = writer(codec.clone())
            .persist(Path::new(PATH), &info(), &StampOptions::default())
            .unwrap();

        assert_eq!(
            decision,
            WriteDecision::Skipped(SkipReason::ExistingMetadata { tags: 2 })
        );
        assert_eq!(codec.commits(), 0);
        assert_eq!(codec.snapshot(Path::new(PATH)), existing());
    }

    #[test]
    fn test_force_overwrites_existing_metadata() {
        let codec = Arc::new(MemoryCodec::new().with_file(PATH, existing()));
        let options = StampOptions {
            force: true,
            ..Default::default()
        };
        let decision = writer(codec.clone())
            .persist(Path::new(PATH), &info(), &options)
            .unwrap();

        let set = decision.write_set().unwrap();
        let snapshot = codec.snapshot(Path::new(PATH));
        for entry in set.iter() {
            assert_eq!(
                snapshot.get(&entry.key),
                Some(render_raw(&entry.key, &entry.value).as_str())
            );
        }
        // Unrelated tags survive
        assert_eq!(snapshot.get("Exif.Image.Make"), Some("Pixel"));
    }

    #[test]
    fn test_dry_run_is_pure_and_predicts_real_run() {
        let codec = Arc::new(MemoryCodec::new());
        let writer = writer(codec.clone());
        let dry = StampOptions {
            dry_run: true,
            force: true,
        };

        let preview = writer.persist(Path::new(PATH), &info(), &dry).unwrap();
        assert!(matches!(preview, WriteDecision::DryRun(_)));
        assert_eq!(codec.commits(), 0);
        assert!(codec.snapshot(Path::new(PATH)).is_empty());

        let real = writer
            .persist(Path::new(PATH), &info(), &StampOptions::default())
            .unwrap();
        assert_eq!(real.write_set(), preview.write_set());
    }

    #[test]
    fn test_dry_run_still_skips_existing_metadata() {
        let codec = Arc::new(MemoryCodec::new().with_file(PATH, existing()));
        let options = StampOptions {
            dry_run: true,
            force: false,
        };
        let decision = writer(codec)
            .persist(Path::new(PATH), &info(), &options)
            .unwrap();
        assert!(decision.is_skipped());
    }

    #[test]
    fn test_resolution_failure_propagates() {
        let codec = Arc::new(MemoryCodec::new());
        let ancient = NaiveDate::from_ymd_opt(1985, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let info = FileInfo::new(PATH, ImageFormat::Png)
            .with_candidate(CandidateSource::FilesystemModified, ancient);

        let err = writer(codec.clone())
            .persist(Path::new(PATH), &info, &StampOptions::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientMetadata { .. }));
        assert_eq!(codec.commits(), 0);
    }
}

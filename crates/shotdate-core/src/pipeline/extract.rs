//! Timestamp candidate extraction from file paths and filesystem attributes.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::config::ProcessingConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{CandidateSource, FileInfo, ImageFormat};

/// Turns a file into loosely trustworthy timestamp candidates.
pub struct CandidateExtractor {
    config: ProcessingConfig,
}

/// Year, month, day, hour, minute, second with at most one separator between
/// groups. Matches e.g. `1997-08-29T02:14:00`, `2016-06-23_16-41-53`,
/// `2017-03-13-192338` and `20190815-073404`.
fn datetime_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d{4})\D?(\d{2})\D?(\d{2})\D?(\d{2})\D?(\d{2})\D?(\d{2})")
            .expect("datetime pattern is a valid regex")
    })
}

impl CandidateExtractor {
    /// Create an extractor enforcing the given format allow-list.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Guess a timestamp from digits in the path.
    ///
    /// Only the first match is considered. A match that is not a real
    /// calendar date and time yields `None`.
    pub fn extract_path_time(path: &str) -> Option<NaiveDateTime> {
        let caps = datetime_pattern().captures(path)?;
        let field = |i: usize| caps[i].parse::<u32>().ok();

        let year = caps[1].parse::<i32>().ok()?;
        let parsed = NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)
            .and_then(|date| date.and_hms_opt(field(4)?, field(5)?, field(6)?));

        if parsed.is_none() {
            tracing::debug!("Ignoring invalid datetime {:?} in {}", &caps[0], path);
        }
        parsed
    }

    /// Read the file's modification time as a naive local datetime.
    pub fn extract_mtime(path: &Path) -> PipelineResult<NaiveDateTime> {
        let modified = std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .map_err(|e| PipelineError::file_access(path, e))?;
        Ok(DateTime::<Local>::from(modified).naive_local())
    }

    /// Collect format and timestamp candidates for a file.
    ///
    /// Fails with `FileAccess` when the file cannot be read and with
    /// `UnsupportedFileType` when its format is not allow-listed.
    pub fn gather_file_info(&self, path: &Path) -> PipelineResult<FileInfo> {
        let format = ImageFormat::sniff(path).map_err(|e| PipelineError::file_access(path, e))?;
        if !self.config.allows(format.as_str()) {
            return Err(PipelineError::UnsupportedFileType {
                path: path.to_path_buf(),
                format: format.to_string(),
            });
        }

        let mut info = FileInfo::new(path, format);
        if let Some(path_time) = Self::extract_path_time(&path.to_string_lossy()) {
            info.push(CandidateSource::FilenamePattern, path_time);
        }
        info.push(
            CandidateSource::FilesystemModified,
            Self::extract_mtime(path)?,
        );

        tracing::trace!("Candidates for {:?}: {:?}", path, info.candidates);
        Ok(info)
    }
}

//! Core data types for the shotdate pipeline.
//!
//! A file moves through the pipeline as a [`FileInfo`] (its typed timestamp
//! candidates), is resolved to a single `NaiveDateTime`, and ends up as a
//! [`WriteDecision`] wrapped in a [`FileReport`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Image format as reported by the magic-byte classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
    Tiff,
    Heif,
    Unknown,
}

impl ImageFormat {
    /// Lower-case tag compared against `processing.supported_formats`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
            Self::Heif => "heif",
            Self::Unknown => "unknown",
        }
    }

    /// Canonical file extension, used to name scratch files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
            Self::Bmp => "bmp",
            Self::Tiff => "tif",
            Self::Heif => "heic",
            Self::Unknown => "bin",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a timestamp candidate came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Digits found in the file path
    FilenamePattern,
    /// Filesystem last-modification time
    FilesystemModified,
    /// Any caller-provided extractor
    Custom(String),
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FilenamePattern => f.write_str("pathtime"),
            Self::FilesystemModified => f.write_str("mtime"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// A timestamp of plausible but uncertain accuracy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub source: CandidateSource,
    pub value: NaiveDateTime,
}

impl Candidate {
    pub fn new(source: CandidateSource, value: NaiveDateTime) -> Self {
        Self { source, value }
    }
}

/// Everything gathered about one file before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Absolute path to the file
    pub path: PathBuf,

    /// Detected image format
    pub format: ImageFormat,

    /// Timestamp candidates, in extraction order
    pub candidates: Vec<Candidate>,
}

impl FileInfo {
    /// Create an empty `FileInfo` for a path and format.
    pub fn new(path: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            path: path.into(),
            format,
            candidates: Vec::new(),
        }
    }

    /// Append a candidate. Extractors beyond the built-in ones hook in here.
    pub fn push(&mut self, source: CandidateSource, value: NaiveDateTime) {
        self.candidates.push(Candidate::new(source, value));
    }

    /// Builder-style variant of [`FileInfo::push`].
    pub fn with_candidate(mut self, source: CandidateSource, value: NaiveDateTime) -> Self {
        self.push(source, value);
        self
    }

    /// First candidate from the given source.
    pub fn get(&self, source: &CandidateSource) -> Option<NaiveDateTime> {
        self.candidates
            .iter()
            .find(|c| &c.source == source)
            .map(|c| c.value)
    }

    /// Timestamp parsed from the file path, if any.
    pub fn path_time(&self) -> Option<NaiveDateTime> {
        self.get(&CandidateSource::FilenamePattern)
    }

    /// Filesystem modification time.
    pub fn mtime(&self) -> Option<NaiveDateTime> {
        self.get(&CandidateSource::FilesystemModified)
    }
}

/// A structured value destined for a metadata tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    DateTime(NaiveDateTime),
    Strings(Vec<String>),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Strings(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// One tag assignment in a [`WriteSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteEntry {
    pub key: String,
    pub value: TagValue,
}

/// Ordered set of tag assignments to commit to a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteSet {
    entries: Vec<WriteEntry>,
}

impl WriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing an earlier assignment of the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: TagValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => entry.value = value,
            None => self.entries.push(WriteEntry { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&TagValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WriteEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The timestamp carried by the set (all date keys share one value).
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        self.entries.iter().find_map(|e| match e.value {
            TagValue::DateTime(dt) => Some(dt),
            TagValue::Strings(_) => None,
        })
    }
}

/// Existing tags in a file's metadata container, key to raw value.
///
/// Keys follow the `Exif.<Group>.<Name>` / `Xmp.<prefix>.<Name>` convention.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataSnapshot {
    entries: BTreeMap<String, String>,
}

impl MetadataSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, raw: impl Into<String>) {
        self.entries.insert(key.into(), raw.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge all entries of `other` into `self`.
    pub fn extend(&mut self, other: MetadataSnapshot) {
        self.entries.extend(other.entries);
    }
}

/// Why the writer declined to touch a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The container already holds EXIF or XMP tags and `force` was off
    ExistingMetadata { tags: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExistingMetadata { tags } => {
                write!(f, "existing metadata present ({tags} tags)")
            }
        }
    }
}

/// Outcome of [`crate::pipeline::MetadataWriter::persist`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum WriteDecision {
    /// The write-set was committed
    Written(WriteSet),
    /// Nothing was written
    Skipped(SkipReason),
    /// Dry run: this is what would have been written
    DryRun(WriteSet),
}

impl WriteDecision {
    /// Write-set carried by `Written` and `DryRun`.
    pub fn write_set(&self) -> Option<&WriteSet> {
        match self {
            Self::Written(set) | Self::DryRun(set) => Some(set),
            Self::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}

/// Per-file result emitted by the batch driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Absolute path to the file
    pub path: PathBuf,

    /// Detected format
    pub format: ImageFormat,

    /// All candidates that were considered
    pub candidates: Vec<Candidate>,

    /// Resolved timestamp, absent when the file was skipped before resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen: Option<NaiveDateTime>,

    /// What the writer did
    pub decision: WriteDecision,
}

impl FileReport {
    pub fn new(info: FileInfo, decision: WriteDecision) -> Self {
        Self {
            chosen: decision.write_set().and_then(WriteSet::timestamp),
            path: info.path,
            format: info.format,
            candidates: info.candidates,
            decision,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (heading, set) = match &self.decision {
            WriteDecision::Written(set) => ("Wrote", set),
            WriteDecision::DryRun(set) => ("Dry run, would write", set),
            WriteDecision::Skipped(reason) => {
                return write!(f, "Skipped {}: {}", self.path.display(), reason);
            }
        };
        write!(f, "{heading} {}:", self.path.display())?;
        for entry in set.iter() {
            write!(f, "\n  {} = {}", entry.key, entry.value)?;
        }
        Ok(())
    }
}

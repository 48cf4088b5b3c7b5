//! Error types for the shotdate pipeline.
//!
//! Errors are organized by stage so the batch driver can decide per file
//! whether to report and move on. A refusal to overwrite existing metadata is
//! not an error; see [`crate::types::WriteDecision::Skipped`].

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Per-file pipeline errors.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Detected format is not in the configured allow-list
    #[error("Unsupported file type for {path}: {format}")]
    UnsupportedFileType { path: PathBuf, format: String },

    /// No timestamp candidate survived validation
    #[error("Insufficient metadata for {path}: no valid timestamps found")]
    InsufficientMetadata { path: PathBuf },

    /// File missing, unreadable or permission-denied
    #[error("Cannot access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing the metadata container failed
    #[error("Metadata container error for {path}: {source}")]
    Container {
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// A blocking worker task died before producing a result
    #[error("Worker failed for {path}: {message}")]
    Worker { path: PathBuf, message: String },
}

impl PipelineError {
    /// Path of the file this error belongs to.
    pub fn path(&self) -> &Path {
        match self {
            Self::UnsupportedFileType { path, .. }
            | Self::InsufficientMetadata { path }
            | Self::FileAccess { path, .. }
            | Self::Container { path, .. }
            | Self::Worker { path, .. } => path,
        }
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFileType { .. } => "unsupported_file_type",
            Self::InsufficientMetadata { .. } => "insufficient_metadata",
            Self::FileAccess { .. } => "file_access",
            Self::Container { .. } => "container",
            Self::Worker { .. } => "worker",
        }
    }

    pub(crate) fn file_access(path: &Path, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn container(path: &Path, source: CodecError) -> Self {
        Self::Container {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Errors raised by a metadata container codec.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Underlying file I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// EXIF block could not be read or written
    #[error("EXIF error: {0}")]
    Exif(String),

    /// XMP packet could not be parsed or serialized
    #[error("XMP error: {0}")]
    Xmp(String),

    /// Container structure is broken
    #[error("Malformed {container} container: {message}")]
    Malformed {
        container: &'static str,
        message: String,
    },

    /// The codec cannot handle this container format
    #[error("Unsupported metadata container: {0}")]
    UnsupportedContainer(String),
}

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};

/// Input handling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Image formats (as detected from magic bytes) the pipeline will touch
    pub supported_formats: Vec<String>,

    /// File extensions picked up when walking a directory
    pub extensions: Vec<String>,

    /// Files processed concurrently (1 = strictly sequential)
    pub parallel_workers: usize,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec!["jpeg".to_string(), "png".to_string()],
            extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            parallel_workers: 1,
        }
    }
}

impl ProcessingConfig {
    /// Whether a detected format tag is allow-listed (case-insensitive).
    pub fn allows(&self, format: &str) -> bool {
        self.supported_formats
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }
}

/// Timestamp validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Candidates must be strictly after January 1st of this year
    pub floor_year: i32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { floor_year: 1990 }
    }
}

/// Metadata writing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Keywords stored in the XMP subject field
    pub subject: Vec<String>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            subject: vec!["Screenshot".to_string()],
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

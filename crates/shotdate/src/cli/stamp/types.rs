//! CLI enum types for the stamp command.

use clap::ValueEnum;
use shotdate_core::OutputFormat as CoreOutputFormat;

/// Supported report formats.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum ReportFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON report per line
    Jsonl,
}

impl From<ReportFormat> for CoreOutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Text => CoreOutputFormat::Text,
            ReportFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

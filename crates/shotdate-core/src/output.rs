//! Report output in human-readable text or JSON Lines.

use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One human-readable block per item
    #[default]
    Text,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

/// A writer that emits items as text or JSONL.
pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Write a single item, followed by a newline.
    pub fn write<T: Serialize + Display>(&mut self, item: &T) -> io::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.writer, "{item}")?,
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileInfo, FileReport, ImageFormat, SkipReason, WriteDecision};

    fn skipped() -> FileReport {
        FileReport::new(
            FileInfo::new("/shots/a.png", ImageFormat::Png),
            WriteDecision::Skipped(SkipReason::ExistingMetadata { tags: 3 }),
        )
    }

    #[test]
    fn test_write_text() {
        let mut buf = Vec::new();
        OutputWriter::new(&mut buf, OutputFormat::Text)
            .write(&skipped())
            .unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Skipped /shots/a.png: existing metadata present (3 tags)\n"
        );
    }

    #[test]
    fn test_write_jsonl() {
        let mut buf = Vec::new();
        let mut writer = OutputWriter::new(&mut buf, OutputFormat::JsonLines);
        writer.write(&skipped()).unwrap();
        writer.write(&skipped()).unwrap();
        writer.flush().unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["decision"]["status"], "skipped");
        assert_eq!(value["format"], "png");
    }
}

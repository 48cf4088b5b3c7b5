//! Shotdate Core - timestamp inference and metadata stamping for screenshots.
//!
//! Screenshots usually carry no capture date in their metadata, so photo
//! libraries sort them by whatever the filesystem says. Shotdate infers a
//! timestamp from the file name and modification time, and writes it into
//! the file's EXIF and XMP tags without touching existing metadata.
//!
//! # Architecture
//!
//! ```text
//! Path → Sniff → Extract candidates → Resolve (earliest valid) → Write EXIF/XMP
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use shotdate_core::{Config, StampOptions, Stamper};
//!
//! let stamper = Stamper::new(&Config::load()?);
//! let report = stamper.stamp("Screenshot_20190815-073404.png".as_ref(), &StampOptions::default())?;
//! println!("{report}");
//! ```

// Module declarations
pub mod codec;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use codec::{ContainerCodec, MemoryCodec, MetadataCodec};
pub use config::Config;
pub use error::{CodecError, ConfigError, PipelineError, PipelineResult};
pub use output::{OutputFormat, OutputWriter};
pub use pipeline::{Resolver, StampOptions, Stamper};
pub use types::{
    Candidate, CandidateSource, FileInfo, FileReport, ImageFormat, MetadataSnapshot, TagValue,
    WriteDecision, WriteSet,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

//! Screenshot stamping pipeline components.
//!
//! - **sniff**: Classify files by magic bytes
//! - **extract**: Gather timestamp candidates from the path and filesystem
//! - **resolve**: Pick the earliest plausible candidate
//! - **writer**: Non-destructive EXIF/XMP write
//! - **discovery**: Find image files in directories
//! - **processor**: Orchestrates the full pipeline

pub mod discovery;
pub mod extract;
pub mod processor;
pub mod resolve;
mod sniff;
pub mod writer;

// Re-exports for convenient access
pub use discovery::FileDiscovery;
pub use extract::CandidateExtractor;
pub use processor::Stamper;
pub use resolve::{Resolver, TimeWindow};
pub use writer::{MetadataWriter, StampOptions};

//! In-memory codec used for previews and tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{render_raw, MetadataCodec};
use crate::error::CodecError;
use crate::types::{ImageFormat, MetadataSnapshot, WriteSet};

/// Keeps per-path tag snapshots in a map instead of touching files.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    files: Mutex<HashMap<PathBuf, MetadataSnapshot>>,
    commits: AtomicUsize,
}

impl MemoryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tags a path reports before any commit.
    pub fn with_file(self, path: impl Into<PathBuf>, snapshot: MetadataSnapshot) -> Self {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), snapshot);
        self
    }

    /// Current tags stored for `path`.
    pub fn snapshot(&self, path: &Path) -> MetadataSnapshot {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of successful commits so far.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

impl MetadataCodec for MemoryCodec {
    fn read(&self, path: &Path) -> Result<MetadataSnapshot, CodecError> {
        Ok(self.snapshot(path))
    }

    fn commit(
        &self,
        path: &Path,
        _format: ImageFormat,
        set: &WriteSet,
        _preserve_mtime: bool,
    ) -> Result<(), CodecError> {
        let mut files = self.files.lock().unwrap_or_else(|e| e.into_inner());
        let snapshot = files.entry(path.to_path_buf()).or_default();
        for entry in set.iter() {
            snapshot.insert(entry.key.clone(), render_raw(&entry.key, &entry.value));
        }
        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

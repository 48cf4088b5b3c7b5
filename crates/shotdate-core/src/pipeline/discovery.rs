//! Expands command-line inputs into the list of files to stamp.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ProcessingConfig;

/// Discovers image files in directories.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// Expand every input in order, keeping the first occurrence of a file.
    ///
    /// Anything that is not a directory is passed through untouched, so
    /// missing files and unsupported types still get a per-file error later.
    /// A file named twice, or named and also found inside a listed
    /// directory, is stamped once.
    pub fn discover_all(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        inputs
            .iter()
            .flat_map(|input| self.discover(input))
            .filter(|path| {
                let fresh = seen.insert(identity(path));
                if !fresh {
                    tracing::debug!("Dropping duplicate input {:?}", path);
                }
                fresh
            })
            .collect()
    }

    /// Expand a single input.
    ///
    /// A directory is walked recursively for files with a configured
    /// extension, sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if !path.is_dir() {
            return vec![path.to_path_buf()];
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry under {:?}: {}", path, err);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.is_supported(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        // Sort by path for deterministic ordering
        files.sort();
        tracing::debug!("Found {} candidate files under {:?}", files.len(), path);
        files
    }

    /// Check if a file has a configured extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

/// Key under which two spellings of the same file compare equal.
fn identity(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

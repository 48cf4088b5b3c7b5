//! Capture and restore of file timestamps around a rewrite.

use std::fs::{self, File, FileTimes, Permissions};
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// Filesystem attributes that a rewrite must not disturb.
#[derive(Debug, Clone)]
pub(super) struct FileStamp {
    modified: SystemTime,
    accessed: SystemTime,
    permissions: Permissions,
}

impl FileStamp {
    pub(super) fn capture(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified()?,
            // Not every platform records access times
            accessed: meta.accessed().or_else(|_| meta.modified())?,
            permissions: meta.permissions(),
        })
    }

    pub(super) fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    /// Stamp the captured access and modification times onto `file`.
    ///
    /// Applied to the replacement before it is renamed into place, so the
    /// target never needs to be reopened for writing.
    pub(super) fn apply_times(&self, file: &File) -> io::Result<()> {
        let times = FileTimes::new()
            .set_modified(self.modified)
            .set_accessed(self.accessed);
        file.set_times(times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_apply_times_to_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        fs::write(&path, b"before").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_565_854_444);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_times(FileTimes::new().set_modified(old))
            .unwrap();

        let stamp = FileStamp::capture(&path).unwrap();
        let replacement = dir.path().join("b.png");
        fs::write(&replacement, b"after").unwrap();
        assert_ne!(fs::metadata(&replacement).unwrap().modified().unwrap(), old);

        stamp
            .apply_times(&File::options().write(true).open(&replacement).unwrap())
            .unwrap();
        assert_eq!(fs::metadata(&replacement).unwrap().modified().unwrap(), old);
    }
}

//! Metadata container codecs.
//!
//! The pipeline talks to a file's embedded metadata only through
//! [`MetadataCodec`]. [`ContainerCodec`] reads and writes real JPEG and PNG
//! files; [`MemoryCodec`] keeps tags in memory for previews and tests.

mod container;
mod exif_block;
mod jpeg;
mod memory;
mod mtime;
mod png;
mod xmp_packet;

pub use container::ContainerCodec;
pub use memory::MemoryCodec;

use std::path::Path;

use crate::error::CodecError;
use crate::types::{ImageFormat, MetadataSnapshot, TagValue, WriteSet};

/// Tag keys written by shotdate.
pub mod keys {
    /// EXIF primary (IFD0) date, "DateTime"
    pub const EXIF_DATETIME: &str = "Exif.Image.DateTime";
    pub const EXIF_DATETIME_DIGITIZED: &str = "Exif.Photo.DateTimeDigitized";
    pub const EXIF_DATETIME_ORIGINAL: &str = "Exif.Photo.DateTimeOriginal";
    pub const XMP_DATETIME_DIGITIZED: &str = "Xmp.exif.DateTimeDigitized";
    pub const XMP_DATETIME_ORIGINAL: &str = "Xmp.exif.DateTimeOriginal";
    pub const XMP_CREATE_DATE: &str = "Xmp.xmp.CreateDate";
    pub const XMP_SUBJECT: &str = "Xmp.dc.subject";

    /// Every key that receives the resolved timestamp.
    pub const DATE_KEYS: [&str; 6] = [
        EXIF_DATETIME,
        EXIF_DATETIME_DIGITIZED,
        EXIF_DATETIME_ORIGINAL,
        XMP_DATETIME_DIGITIZED,
        XMP_DATETIME_ORIGINAL,
        XMP_CREATE_DATE,
    ];
}

/// Read and write access to a file's embedded metadata.
pub trait MetadataCodec: Send + Sync {
    /// Enumerate the existing EXIF and XMP tags with their raw values.
    fn read(&self, path: &Path) -> Result<MetadataSnapshot, CodecError>;

    /// Commit `set` into the container in a single replace.
    ///
    /// With `preserve_mtime` the file's modification time is left unchanged.
    fn commit(
        &self,
        path: &Path,
        format: ImageFormat,
        set: &WriteSet,
        preserve_mtime: bool,
    ) -> Result<(), CodecError>;
}

/// Render a value the way the container stores it under `key`.
///
/// EXIF dates use `YYYY:MM:DD HH:MM:SS`, XMP dates ISO 8601 without a zone.
pub fn render_raw(key: &str, value: &TagValue) -> String {
    match value {
        TagValue::DateTime(dt) if key.starts_with("Exif.") => {
            dt.format("%Y:%m:%d %H:%M:%S").to_string()
        }
        TagValue::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        TagValue::Strings(items) => items.join(", "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_render_raw_per_container() {
        let value = TagValue::DateTime(
            NaiveDate::from_ymd_opt(2019, 8, 15)
                .unwrap()
                .and_hms_opt(7, 34, 4)
                .unwrap(),
        );
        assert_eq!(render_raw(keys::EXIF_DATETIME, &value), "2019:08:15 07:34:04");
        assert_eq!(render_raw(keys::XMP_CREATE_DATE, &value), "2019-08-15T07:34:04");

        let subject = TagValue::Strings(vec!["Screenshot".into(), "Phone".into()]);
        assert_eq!(render_raw(keys::XMP_SUBJECT, &subject), "Screenshot, Phone");
    }
}

//! EXIF reading (kamadak-exif) and writing (little_exif).

use exif::{Context, Field, In, Reader, Value};
use little_exif::exif_tag::ExifTag;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;
use std::panic;

use super::{keys, render_raw};
use crate::error::CodecError;
use crate::types::{ImageFormat, MetadataSnapshot, WriteSet};

/// FF E1 marker, two length bytes and the "Exif\0\0" identifier.
const APP1_HEADER_SIZE: usize = 10;

/// Enumerate the fields of a TIFF-structured EXIF block.
pub(super) fn read(tiff: Vec<u8>) -> Result<MetadataSnapshot, CodecError> {
    let exif = Reader::new()
        .read_raw(tiff)
        .map_err(|e| CodecError::Exif(e.to_string()))?;

    let mut snapshot = MetadataSnapshot::new();
    for field in exif.fields() {
        let group = if field.ifd_num == In::THUMBNAIL {
            "Thumbnail"
        } else {
            match field.tag.context() {
                Context::Exif => "Photo",
                Context::Gps => "GPSInfo",
                Context::Interop => "Iop",
                _ => "Image",
            }
        };
        snapshot.insert(format!("Exif.{group}.{}", field.tag), raw_value(field));
    }
    Ok(snapshot)
}

/// ASCII values as stored; other types in their display form.
fn raw_value(field: &Field) -> String {
    match &field.value {
        Value::Ascii(parts) => parts
            .iter()
            .map(|part| String::from_utf8_lossy(part))
            .collect::<Vec<_>>()
            .join(", "),
        _ => field.display_value().to_string(),
    }
}

/// Decode the EXIF that a PNG keeps in a raw profile text chunk.
pub(super) fn decode_png_profile(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    to_tiff(&load(data, ImageFormat::Png)?)
}

/// Encode the EXIF entries of `set` on top of the tags already in `data`.
///
/// Returns the TIFF-structured block ready to store in the container, or
/// `None` when `set` has no EXIF entries.
pub(super) fn encode(
    data: &[u8],
    format: ImageFormat,
    set: &WriteSet,
) -> Result<Option<Vec<u8>>, CodecError> {
    let tags: Vec<ExifTag> = set
        .iter()
        .filter_map(|entry| {
            let raw = render_raw(&entry.key, &entry.value);
            match entry.key.as_str() {
                keys::EXIF_DATETIME => Some(ExifTag::ModifyDate(raw)),
                keys::EXIF_DATETIME_DIGITIZED => Some(ExifTag::CreateDate(raw)),
                keys::EXIF_DATETIME_ORIGINAL => Some(ExifTag::DateTimeOriginal(raw)),
                _ => None,
            }
        })
        .collect();
    if tags.is_empty() {
        return Ok(None);
    }

    let mut metadata = load(data, format).unwrap_or_else(|e| {
        tracing::debug!("No existing EXIF to carry over ({}), starting fresh", e);
        Metadata::new()
    });
    for tag in tags {
        metadata.set_tag(tag);
    }
    to_tiff(&metadata).map(Some)
}

/// Parse the EXIF in `data` with little_exif, which panics on some inputs.
fn load(data: &[u8], format: ImageFormat) -> Result<Metadata, CodecError> {
    let extension = match format {
        ImageFormat::Jpeg => FileExtension::JPEG,
        ImageFormat::Png => FileExtension::PNG {
            as_zTXt_chunk: true,
        },
        other => {
            return Err(CodecError::UnsupportedContainer(format!(
                "no EXIF support for {other} files"
            )))
        }
    };

    let buffer = data.to_vec();
    let loaded = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        Metadata::new_from_vec(&buffer, extension)
    }));
    match loaded {
        Ok(Ok(metadata)) => Ok(metadata),
        Ok(Err(e)) => Err(CodecError::Exif(e.to_string())),
        Err(_) => Err(CodecError::Exif("EXIF decoder gave up".into())),
    }
}

/// Serialize as a JPEG APP1 segment and keep the TIFF data after its header.
fn to_tiff(metadata: &Metadata) -> Result<Vec<u8>, CodecError> {
    let app1 = metadata
        .as_u8_vec(FileExtension::JPEG)
        .map_err(|e| CodecError::Exif(e.to_string()))?;
    match app1.get(..APP1_HEADER_SIZE) {
        Some([0xFF, 0xE1, _, _, rest @ ..]) if rest == b"Exif\0\0" => {
            Ok(app1[APP1_HEADER_SIZE..].to_vec())
        }
        _ => Err(CodecError::Exif("unexpected EXIF encoding".into())),
    }
}

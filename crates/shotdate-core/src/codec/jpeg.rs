//! APP1 segment handling for JPEG files.
//!
//! EXIF and XMP each live in their own APP1 segment, told apart by the
//! identifier that opens the payload.

use img_parts::jpeg::{markers, Jpeg, JpegSegment};
use img_parts::{Bytes, ImageEXIF};

use crate::error::CodecError;

/// XMP namespace marker (with trailing NUL) that opens an XMP APP1 segment.
pub(super) const XMP_MARKER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// Identifier opening an EXIF APP1 payload.
const EXIF_MARKER: &[u8] = b"Exif\0\0";

/// Largest payload a segment length field can describe (it counts itself).
const MAX_SEGMENT_CONTENTS: usize = u16::MAX as usize - 2;

fn malformed(message: impl Into<String>) -> CodecError {
    CodecError::Malformed {
        container: "JPEG",
        message: message.into(),
    }
}

pub(super) fn parse(data: Bytes) -> Result<Jpeg, CodecError> {
    Jpeg::from_bytes(data).map_err(|e| malformed(e.to_string()))
}

/// TIFF-structured EXIF block, without the `Exif\0\0` identifier.
pub(super) fn exif(jpeg: &Jpeg) -> Option<Bytes> {
    jpeg.exif()
}

/// Return the XMP packet embedded in a JPEG, if any.
pub(super) fn xmp(jpeg: &Jpeg) -> Option<Bytes> {
    jpeg.segments_by_marker(markers::APP1)
        .find(|segment| segment.contents().starts_with(XMP_MARKER))
        .map(|segment| segment.contents().slice(XMP_MARKER.len()..))
}

pub(super) fn set_xmp(jpeg: &mut Jpeg, packet: &[u8]) -> Result<(), CodecError> {
    jpeg.segments_mut().retain(|segment| {
        segment.marker() != markers::APP1 || !segment.contents().starts_with(XMP_MARKER)
    });
    insert_app1(jpeg, XMP_MARKER, packet)
}

/// Store `tiff` as the only EXIF segment.
pub(super) fn set_exif(jpeg: &mut Jpeg, tiff: &[u8]) -> Result<(), CodecError> {
    jpeg.set_exif(None);
    insert_app1(jpeg, EXIF_MARKER, tiff)
}

/// Insert an APP1 segment after the leading run of APPn segments, so it
/// always precedes the frame header and scan data.
fn insert_app1(jpeg: &mut Jpeg, ident: &[u8], payload: &[u8]) -> Result<(), CodecError> {
    let size = ident.len() + payload.len();
    if size > MAX_SEGMENT_CONTENTS {
        return Err(malformed(format!(
            "{} byte payload does not fit an APP1 segment",
            payload.len()
        )));
    }

    let mut contents = Vec::with_capacity(size);
    contents.extend_from_slice(ident);
    contents.extend_from_slice(payload);

    let segments = jpeg.segments_mut();
    let at = segments
        .iter()
        .position(|segment| !(markers::APP0..=markers::APP15).contains(&segment.marker()))
        .unwrap_or(segments.len());
    segments.insert(
        at,
        JpegSegment::new_with_contents(markers::APP1, Bytes::from(contents)),
    );
    Ok(())
}

//! eXIf and XMP text chunk handling for PNG files.
//!
//! Besides the eXIf chunk, PNG writers store EXIF as a hex "raw profile" in
//! a text chunk and XMP in a tEXt, zTXt or iTXt chunk. All of these count as
//! existing metadata; the ones that cannot be decoded are reported as errors
//! rather than ignored.

use img_parts::png::{Png, PngChunk};
use img_parts::{Bytes, ImageEXIF};

use crate::error::CodecError;

const IDAT: [u8; 4] = *b"IDAT";
const IEND: [u8; 4] = *b"IEND";
const ITXT: [u8; 4] = *b"iTXt";
const TEXT: [u8; 4] = *b"tEXt";
const ZTXT: [u8; 4] = *b"zTXt";

/// Text chunk keyword reserved for XMP packets.
const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";

/// Keywords ImageMagick and exiftool use for hex-encoded EXIF profiles.
const EXIF_PROFILE_KEYWORDS: [&[u8]; 2] = [b"Raw profile type exif", b"Raw profile type APP1"];

fn malformed(message: impl Into<String>) -> CodecError {
    CodecError::Malformed {
        container: "PNG",
        message: message.into(),
    }
}

pub(super) fn parse(data: Bytes) -> Result<Png, CodecError> {
    let png = Png::from_bytes(data).map_err(|e| malformed(e.to_string()))?;
    if !png.chunks().iter().any(|chunk| chunk.kind() == IEND) {
        return Err(malformed("missing IEND chunk"));
    }
    Ok(png)
}

/// Keyword of a tEXt, zTXt or iTXt chunk.
fn keyword(chunk: &PngChunk) -> Option<&[u8]> {
    if ![TEXT, ZTXT, ITXT].contains(&chunk.kind()) {
        return None;
    }
    let contents = chunk.contents();
    let nul = contents.iter().position(|&b| b == 0)?;
    Some(&contents[..nul])
}

fn is_xmp(chunk: &PngChunk) -> bool {
    keyword(chunk) == Some(XMP_KEYWORD)
}

fn is_exif_profile(chunk: &PngChunk) -> bool {
    keyword(chunk).is_some_and(|k| EXIF_PROFILE_KEYWORDS.iter().any(|known| *known == k))
}

/// TIFF-structured EXIF block from the eXIf chunk.
pub(super) fn exif(png: &Png) -> Option<Bytes> {
    png.exif()
}

/// Whether EXIF is stored as a raw profile text chunk.
pub(super) fn has_exif_profile(png: &Png) -> bool {
    png.chunks().iter().any(is_exif_profile)
}

/// Return the XMP packet embedded in a PNG, if any.
pub(super) fn xmp(png: &Png) -> Result<Option<Bytes>, CodecError> {
    match png.chunks().iter().find(|chunk| is_xmp(chunk)) {
        Some(chunk) => xmp_text(chunk).map(Some),
        None => Ok(None),
    }
}

fn xmp_text(chunk: &PngChunk) -> Result<Bytes, CodecError> {
    // Skip the keyword and its NUL separator
    let body = chunk.contents().slice(XMP_KEYWORD.len() + 1..);
    match chunk.kind() {
        TEXT => Ok(body),
        ITXT => {
            if body.len() < 2 {
                return Err(malformed("truncated iTXt header"));
            }
            if body[0] != 0 {
                return Err(CodecError::UnsupportedContainer(
                    "compressed XMP in PNG iTXt".into(),
                ));
            }
            // Language tag, then translated keyword, each NUL-terminated
            let mut text = body.slice(2..);
            for field in ["language tag", "translated keyword"] {
                let nul = text
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or_else(|| malformed(format!("unterminated iTXt {field}")))?;
                text = text.slice(nul + 1..);
            }
            Ok(text)
        }
        _ => Err(CodecError::UnsupportedContainer(
            "compressed XMP in PNG zTXt".into(),
        )),
    }
}

/// Insert `chunk` before the image data so readers that stop there see it.
fn insert_before_image_data(png: &mut Png, chunk: PngChunk) {
    let chunks = png.chunks_mut();
    let at = chunks
        .iter()
        .position(|c| c.kind() == IDAT || c.kind() == IEND)
        .unwrap_or(chunks.len());
    chunks.insert(at, chunk);
}

/// Make `packet` the only XMP chunk, stored uncompressed in iTXt.
pub(super) fn set_xmp(png: &mut Png, packet: &[u8]) {
    let mut contents = Vec::with_capacity(XMP_KEYWORD.len() + 5 + packet.len());
    contents.extend_from_slice(XMP_KEYWORD);
    // Separator, uncompressed, no method, empty language and translated keyword
    contents.extend_from_slice(&[0, 0, 0, 0, 0]);
    contents.extend_from_slice(packet);

    png.chunks_mut().retain(|chunk| !is_xmp(chunk));
    insert_before_image_data(png, PngChunk::new(ITXT, Bytes::from(contents)));
}

/// Make `tiff` the only EXIF block; raw profile copies are dropped.
pub(super) fn set_exif(png: &mut Png, tiff: &[u8]) {
    png.set_exif(None);
    png.chunks_mut().retain(|chunk| !is_exif_profile(chunk));
    insert_before_image_data(png, PngChunk::new(*b"eXIf", Bytes::copy_from_slice(tiff)));
}

//! Image format detection from magic bytes.

use std::io::Read;
use std::path::Path;

use crate::types::ImageFormat;

impl ImageFormat {
    /// Detect the format of a file by reading its first bytes.
    ///
    /// Returns `Unknown` for unrecognized or too-short files. Errors only when
    /// the file cannot be opened or read.
    pub fn sniff(path: &Path) -> std::io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut header = [0u8; 12];
        let mut filled = 0;
        while filled < header.len() {
            let n = file.read(&mut header[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(Self::from_header(&header[..filled]))
    }

    /// Classify a header buffer (at most the first 12 bytes are looked at).
    pub fn from_header(header: &[u8]) -> Self {
        if header.len() < 4 {
            return Self::Unknown;
        }

        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // PNG: 89 50 4E 47
        if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            return Self::Png;
        }

        if header.starts_with(b"GIF8") {
            return Self::Gif;
        }

        // WebP: RIFF....WEBP
        if header.starts_with(b"RIFF") && header.len() >= 12 && &header[8..12] == b"WEBP" {
            return Self::Webp;
        }

        if header.starts_with(b"BM") {
            return Self::Bmp;
        }

        // TIFF: II (little-endian) or MM (big-endian) followed by version 42
        if header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
        {
            return Self::Tiff;
        }

        // HEIC/HEIF/AVIF: ftyp box at offset 4
        if header.len() >= 8 && &header[4..8] == b"ftyp" {
            return Self::Heif;
        }

        Self::Unknown
    }
}

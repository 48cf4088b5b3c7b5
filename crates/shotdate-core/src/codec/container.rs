//! Codec for real JPEG and PNG files.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::Bytes;

use super::mtime::FileStamp;
use super::{exif_block, jpeg, png, xmp_packet, MetadataCodec};
use crate::error::CodecError;
use crate::types::{ImageFormat, MetadataSnapshot, WriteSet};

/// A parsed container whose metadata can be edited in memory.
enum Container {
    Jpeg(Jpeg),
    Png(Png),
}

impl Container {
    fn parse(format: ImageFormat, data: Bytes) -> Result<Self, CodecError> {
        match format {
            ImageFormat::Jpeg => jpeg::parse(data).map(Self::Jpeg),
            ImageFormat::Png => png::parse(data).map(Self::Png),
            other => Err(CodecError::UnsupportedContainer(format!(
                "cannot edit metadata of {other} files"
            ))),
        }
    }

    /// The TIFF-structured EXIF block, wherever the container keeps it.
    ///
    /// `data` is the file the container was parsed from.
    fn exif(&self, data: &[u8]) -> Result<Option<Vec<u8>>, CodecError> {
        match self {
            Self::Jpeg(jpeg) => Ok(jpeg::exif(jpeg).map(|tiff| tiff.to_vec())),
            Self::Png(png) => match png::exif(png) {
                Some(tiff) => Ok(Some(tiff.to_vec())),
                None if png::has_exif_profile(png) => {
                    exif_block::decode_png_profile(data).map(Some)
                }
                None => Ok(None),
            },
        }
    }

    fn xmp(&self) -> Result<Option<Bytes>, CodecError> {
        match self {
            Self::Jpeg(jpeg) => Ok(jpeg::xmp(jpeg)),
            Self::Png(png) => png::xmp(png),
        }
    }

    fn set_exif(&mut self, tiff: &[u8]) -> Result<(), CodecError> {
        match self {
            Self::Jpeg(jpeg) => jpeg::set_exif(jpeg, tiff),
            Self::Png(png) => {
                png::set_exif(png, tiff);
                Ok(())
            }
        }
    }

    fn set_xmp(&mut self, packet: &[u8]) -> Result<(), CodecError> {
        match self {
            Self::Jpeg(jpeg) => jpeg::set_xmp(jpeg, packet),
            Self::Png(png) => {
                png::set_xmp(png, packet);
                Ok(())
            }
        }
    }

    fn write_to(self, writer: impl Write) -> io::Result<u64> {
        match self {
            Self::Jpeg(jpeg) => jpeg.encoder().write_to(writer),
            Self::Png(png) => png.encoder().write_to(writer),
        }
    }
}

/// Reads EXIF with kamadak-exif, encodes EXIF with little_exif and handles
/// XMP packets itself. Segments and chunks are edited through img-parts.
///
/// Commits are atomic: the new file is written next to the original, given
/// the original's times and permissions, and renamed over it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerCodec;

impl ContainerCodec {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataCodec for ContainerCodec {
    fn read(&self, path: &Path) -> Result<MetadataSnapshot, CodecError> {
        let data = Bytes::from(fs::read(path)?);
        let container = Container::parse(ImageFormat::from_header(&data), data.clone())?;

        let mut snapshot = match container.exif(&data)? {
            Some(tiff) => exif_block::read(tiff)?,
            None => MetadataSnapshot::new(),
        };
        if let Some(packet) = container.xmp()? {
            snapshot.extend(xmp_packet::parse(&packet)?);
        }
        Ok(snapshot)
    }

    fn commit(
        &self,
        path: &Path,
        format: ImageFormat,
        set: &WriteSet,
        preserve_mtime: bool,
    ) -> Result<(), CodecError> {
        let stamp = FileStamp::capture(path)?;
        let data = Bytes::from(fs::read(path)?);
        let mut container = Container::parse(format, data.clone())?;

        if let Some(tiff) = exif_block::encode(&data, format, set)? {
            container.set_exif(&tiff)?;
        }
        if set.keys().any(|key| key.starts_with("Xmp.")) {
            container.set_xmp(&xmp_packet::build(set)?)?;
        }

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut scratch = tempfile::Builder::new()
            .prefix(".shotdate-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(dir)?;
        container.write_to(&mut scratch)?;
        scratch.as_file().sync_all()?;
        if preserve_mtime {
            stamp.apply_times(scratch.as_file())?;
        }
        scratch
            .as_file()
            .set_permissions(stamp.permissions().clone())?;
        scratch.persist(path).map_err(|e| CodecError::Io(e.error))?;

        tracing::debug!("Committed {} tags to {:?}", set.len(), path);
        Ok(())
    }
}

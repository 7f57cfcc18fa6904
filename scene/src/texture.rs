use std::io::{Read, Write};

use crate::codec;
use crate::format::FormatError;

/// A raw 32-bit-per-pixel texture.
///
/// Pixels are stored one byte per channel in B, G, R, A order, rows bottom-up,
/// exactly as the image importer produced them. No compression, mipmapping or
/// format conversion happens at this layer.
///
/// The pixel buffer always holds `width * height * 4` bytes; the fields are
/// private so that invariant cannot be broken after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    /// Bytes per pixel of every texture.
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Creates a texture from raw BGRA pixels.
    ///
    /// Returns `None` if `pixels` is not exactly `width * height * 4` bytes.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        let expected = Self::byte_len(width, height)?;
        (pixels.len() == expected).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Number of pixel bytes a `width` x `height` texture holds, or `None` on overflow.
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(Self::BYTES_PER_PIXEL)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Size of the pixel buffer in bytes.
    pub fn size(&self) -> usize {
        self.pixels.len()
    }

    /// Encoding: width (u32), height (u32), then the raw pixel buffer.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<(), FormatError> {
        codec::write_pod(writer, &self.width)?;
        codec::write_pod(writer, &self.height)?;
        codec::write_bytes(writer, &self.pixels)
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self, FormatError> {
        let width = codec::read_pod(reader, "texture width")?;
        let height = codec::read_pod(reader, "texture height")?;
        let len = Self::byte_len(width, height)
            .ok_or(FormatError::TextureSizeOverflow { width, height })?;
        let pixels = codec::read_bytes(reader, len, "texture pixels")?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
}

//! Texture import through the `image` crate.

use std::path::Path;

use image::DynamicImage;

use super::{ImportConfig, ImportError, TextureImporter};
use crate::texture::Texture;

/// Loads any image format the `image` crate was built with (TGA, PNG, JPEG, BMP).
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageImporter;

impl ImageImporter {
    pub fn load_path(&self, path: &Path) -> Result<Texture, ImportError> {
        let image = image::open(path).map_err(|source| ImportError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        texture_from_image(image).ok_or_else(|| ImportError::ImageTooLarge {
            path: path.to_path_buf(),
        })
    }
}

impl TextureImporter for ImageImporter {
    fn import_texture(&self, source: &str, config: &ImportConfig) -> Result<Texture, ImportError> {
        self.load_path(&config.texture_path(source))
    }
}

/// Converts a decoded image to a texture: 32 bits per pixel, channels in
/// B, G, R, A order, bottom row first.
///
/// Returns `None` only if the pixel buffer size overflows.
pub fn texture_from_image(image: DynamicImage) -> Option<Texture> {
    let mut rgba = image.flipv().into_rgba8();
    for pixel in rgba.pixels_mut() {
        pixel.0.swap(0, 2);
    }
    let (width, height) = rgba.dimensions();
    Texture::from_raw(width, height, rgba.into_raw())
}

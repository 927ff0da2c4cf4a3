//! Texture regions over shared, reference counted images

use glimmer_core::{GlimmerError, Result};
use image::{Rgba, RgbaImage};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A rectangular view into a shared RGBA image.
///
/// Cloning or taking a sub texture never copies pixels; every view keeps the
/// backing image alive through an `Arc`.
#[derive(Clone)]
pub struct Texture {
    image: Arc<RgbaImage>,
    source: Arc<str>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl Texture {
    /// Wrap a whole image
    pub fn from_image(source: &str, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image: Arc::new(image),
            source: Arc::from(source),
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Decode an image file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| GlimmerError::ImageDecode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_image(&path.display().to_string(), img.to_rgba8()))
    }

    /// A view of part of this texture, in coordinates relative to it.
    /// Returns `None` if the rectangle leaves the texture.
    pub fn sub_texture(&self, x: u32, y: u32, width: u32, height: u32) -> Option<Texture> {
        let fits_x = x.checked_add(width).is_some_and(|r| r <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits_x || !fits_y {
            return None;
        }
        Some(Self {
            image: Arc::clone(&self.image),
            source: Arc::clone(&self.source),
            x: self.x + x,
            y: self.y + y,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Offset of this view inside the backing image
    pub fn origin(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    /// Where the backing image came from (file path or label)
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Whether both views share one backing image
    pub fn shares_image_with(&self, other: &Texture) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }

    /// Pixel at (x, y) relative to this view
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(*self.image.get_pixel(self.x + x, self.y + y))
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("source", &self.source)
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn sub_texture_shares_pixels() {
        let tex = Texture::from_image("checker", checker(8, 8));
        let sub = tex.sub_texture(2, 3, 4, 4).unwrap();

        assert_eq!(sub.width(), 4);
        assert_eq!(sub.origin(), (2, 3));
        assert!(sub.shares_image_with(&tex));
        assert_eq!(sub.pixel(0, 0), tex.pixel(2, 3));
        assert_eq!(sub.pixel(4, 0), None);

        let nested = sub.sub_texture(1, 1, 2, 2).unwrap();
        assert_eq!(nested.origin(), (3, 4));
        assert_eq!(nested.pixel(0, 0), tex.pixel(3, 4));
    }

    #[test]
    fn sub_texture_out_of_bounds() {
        let tex = Texture::from_image("checker", checker(4, 4));
        assert!(tex.sub_texture(2, 2, 3, 1).is_none());
        assert!(tex.sub_texture(0, 0, 4, 4).is_some());
        assert!(tex.sub_texture(u32::MAX, 0, 2, 1).is_none());
    }
}

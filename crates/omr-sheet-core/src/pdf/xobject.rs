//! Raster images as PDF image XObjects.
//!
//! Any format the `image` crate can decode is accepted. Pixels are flattened
//! onto white (PDF has no alpha in a plain image XObject) and stored as
//! Flate-compressed DeviceRGB samples.

use std::path::Path;

use lopdf::{Dictionary, Object, Stream};

use crate::error::{Error, Result};

/// A decoded image ready to be added to a document.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width_px: u32,
    pub height_px: u32,
    rgb: Vec<u8>,
}

impl ImageXObject {
    /// Decode an image file.
    pub fn open(path: &Path) -> Result<Self> {
        let decoded = image::open(path).map_err(|e| Error::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self::from_rgba(&decoded.to_rgba8()))
    }

    /// Flatten an RGBA buffer onto a white background.
    pub fn from_rgba(pixels: &image::RgbaImage) -> Self {
        let mut rgb = Vec::with_capacity(pixels.as_raw().len() / 4 * 3);
        for pixel in pixels.pixels() {
            let [r, g, b, a] = pixel.0;
            let alpha = u16::from(a);
            for channel in [r, g, b] {
                let blended = (u16::from(channel) * alpha + 255 * (255 - alpha)) / 255;
                // blended <= 255 by construction
                rgb.push(u8::try_from(blended).unwrap_or(u8::MAX));
            }
        }

        Self {
            width_px: pixels.width(),
            height_px: pixels.height(),
            rgb,
        }
    }

    /// Placement size in millimetres; see [`resolve_size`].
    pub fn resolve_size(&self, width: Option<f32>, height: Option<f32>) -> (f32, f32) {
        resolve_size(self.width_px, self.height_px, width, height)
    }

    /// The XObject stream for this image.
    pub fn into_stream(self) -> Stream {
        let dict = Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(i64::from(self.width_px))),
            ("Height", Object::Integer(i64::from(self.height_px))),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
        ]);

        Stream::new(dict, self.rgb).with_compression(true)
    }
}

/// Resolve a placement size when only one side was requested.
///
/// The missing side follows the pixel aspect ratio. With neither side given
/// the image is sized at 72 dpi.
#[allow(clippy::cast_precision_loss)]
pub fn resolve_size(
    width_px: u32,
    height_px: u32,
    width: Option<f32>,
    height: Option<f32>,
) -> (f32, f32) {
    let ratio = if width_px == 0 {
        1.0
    } else {
        height_px as f32 / width_px as f32
    };

    match (width, height) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => (w, w * ratio),
        (None, Some(h)) if ratio > 0.0 => (h / ratio, h),
        (None, Some(h)) => (h, h),
        (None, None) => {
            let w = crate::util::pt_to_mm(width_px as f32);
            (w, w * ratio)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_transparent_pixels_become_white() {
        let mut pixels = RgbaImage::new(2, 1);
        pixels.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        pixels.put_pixel(1, 0, Rgba([10, 20, 30, 255]));

        let image = ImageXObject::from_rgba(&pixels);
        assert_eq!(image.rgb, vec![255, 255, 255, 10, 20, 30]);
    }

    #[test]
    fn test_resolve_size_keeps_aspect() {
        let image = ImageXObject::from_rgba(&RgbaImage::new(40, 20));
        let (w, h) = image.resolve_size(None, Some(14.0));
        assert!((w - 28.0).abs() < 1e-4);
        assert!((h - 14.0).abs() < 1e-4);

        let (w, h) = image.resolve_size(Some(26.0), Some(26.0));
        assert!((w - 26.0).abs() < 1e-4 && (h - 26.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let err = ImageXObject::open(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, Error::ImageLoad { .. }));
    }

    #[test]
    fn test_decodes_png_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(3, 5, Rgba([0, 60, 140, 255]))
            .save(&path)
            .unwrap();

        let image = ImageXObject::open(&path).unwrap();
        assert_eq!((image.width_px, image.height_px), (3, 5));
        assert_eq!(&image.rgb[..3], &[0, 60, 140]);
    }
}

//! services/api/src/adapters/image_normalizer.rs
//!
//! Normalizes uploaded images before they are stored and analysed: the image
//! is shrunk to fit a bounding box (never enlarged) and re-encoded as JPEG.

use async_trait::async_trait;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, GenericImageView};
use tutor_core::ports::{ImageNormalizer, PortError, PortResult};

pub const MAX_DIMENSION: u32 = 1024;
pub const JPEG_QUALITY: u8 = 85;

#[derive(Clone, Debug)]
pub struct JpegNormalizer {
    max_dimension: u32,
    quality: u8,
}

impl Default for JpegNormalizer {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            quality: JPEG_QUALITY,
        }
    }
}

impl JpegNormalizer {
    /// Decodes, resizes and re-encodes one image. CPU bound.
    pub fn normalize_blocking(&self, data: &[u8]) -> PortResult<Vec<u8>> {
        let decoded = image::load_from_memory(data)
            .map_err(|e| PortError::InvalidInput(format!("Unreadable image: {}", e)))?;

        let (width, height) = decoded.dimensions();
        let resized = if width > self.max_dimension || height > self.max_dimension {
            // `resize` keeps the aspect ratio and fits inside the box.
            decoded.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3)
        } else {
            decoded
        };

        // JPEG has no alpha channel.
        let rgb = resized.to_rgb8();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .encode_image(&rgb)
            .map_err(|e| PortError::Unexpected(format!("Failed to encode JPEG: {}", e)))?;
        Ok(out)
    }
}

#[async_trait]
impl ImageNormalizer for JpegNormalizer {
    async fn normalize(&self, image: &[u8]) -> PortResult<Vec<u8>> {
        let normalizer = self.clone();
        let data = image.to_vec();
        tokio::task::spawn_blocking(move || normalizer.normalize_blocking(&data))
            .await
            .map_err(|e| PortError::Unexpected(format!("Image task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 128]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn decoded_size(jpeg: &[u8]) -> (u32, u32) {
        let img = image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg).unwrap();
        img.dimensions()
    }

    #[test]
    fn large_images_are_shrunk_to_fit() {
        let jpeg = JpegNormalizer::default()
            .normalize_blocking(&png(2048, 1024))
            .unwrap();
        assert_eq!(decoded_size(&jpeg), (1024, 512));
    }

    #[test]
    fn small_images_are_not_enlarged() {
        let jpeg = JpegNormalizer::default()
            .normalize_blocking(&png(300, 200))
            .unwrap();
        assert_eq!(decoded_size(&jpeg), (300, 200));
    }

    #[test]
    fn garbage_is_rejected_as_invalid_input() {
        let err = JpegNormalizer::default()
            .normalize_blocking(b"definitely not an image")
            .unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn async_normalize_runs_on_the_blocking_pool() {
        let jpeg = JpegNormalizer::default().normalize(&png(10, 10)).await.unwrap();
        assert_eq!(decoded_size(&jpeg), (10, 10));
    }
}

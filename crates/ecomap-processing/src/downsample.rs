//! Image downsampler
//!
//! Shrinks wide images to a maximum width before upload and re-encodes them
//! as baseline JPEG. Narrower images keep their dimensions (no upscaling) but
//! are still re-encoded, so the output media type is always `image/jpeg`.

use bytes::Bytes;
use ecomap_core::models::UploadCandidate;
use ecomap_core::{UploadError, UploaderConfig};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_QUALITY: f32 = 0.8;
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Downsampler {
    max_width: u32,
    /// Encoder quality in `0.0..=1.0`
    quality: f32,
}

impl Default for Downsampler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WIDTH, DEFAULT_QUALITY)
    }
}

impl Downsampler {
    pub fn new(max_width: u32, quality: f32) -> Self {
        Self {
            max_width: max_width.max(1),
            quality: quality.clamp(0.01, 1.0),
        }
    }

    pub fn from_config(config: &UploaderConfig) -> Self {
        Self::new(config.max_width, config.jpeg_quality)
    }

    /// Output dimensions for an image of `width` x `height`.
    ///
    /// Height is scaled by the same factor as width and rounded to the
    /// nearest pixel, never below 1.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width {
            return (width, height);
        }
        let scale = self.max_width as f64 / width as f64;
        let scaled_height = ((height as f64) * scale).round().max(1.0) as u32;
        (self.max_width, scaled_height)
    }

    fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    /// Decode, resize and re-encode on the calling thread.
    pub fn downsample_blocking(
        &self,
        candidate: &UploadCandidate,
    ) -> Result<UploadCandidate, UploadError> {
        let img = decode(&candidate.data)?;
        let (width, height) = img.dimensions();
        let (target_width, target_height) = self.target_dimensions(width, height);

        let resized = if (target_width, target_height) == (width, height) {
            img
        } else {
            img.resize_exact(target_width, target_height, FilterType::Lanczos3)
        };

        let rgb = resized.to_rgb8();
        let mut buffer = Vec::with_capacity(target_width as usize * target_height as usize / 4);
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality());
        encoder
            .encode_image(&rgb)
            .map_err(|e| UploadError::Decode(format!("JPEG encoding failed: {}", e)))?;

        tracing::debug!(
            filename = %candidate.filename,
            original_width = width,
            original_height = height,
            width = target_width,
            height = target_height,
            original_size = candidate.byte_size(),
            size = buffer.len(),
            "Downsampled image"
        );

        Ok(UploadCandidate {
            data: Bytes::from(buffer),
            content_type: OUTPUT_CONTENT_TYPE.to_string(),
            filename: candidate.filename.clone(),
        })
    }

    /// Downsample off the async pool; decoding is CPU-bound.
    pub async fn downsample(
        &self,
        candidate: &UploadCandidate,
    ) -> Result<UploadCandidate, UploadError> {
        let this = *self;
        let candidate = candidate.clone();
        tokio::task::spawn_blocking(move || this.downsample_blocking(&candidate))
            .await
            .map_err(|e| UploadError::Decode(format!("image task failed: {}", e)))?
    }
}

fn decode(data: &[u8]) -> Result<DynamicImage, UploadError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| UploadError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| UploadError::Decode(e.to_string()))
}

/// Pixel dimensions of an encoded image, if it can be decoded.
pub fn image_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    decode(data).ok().map(|img| img.dimensions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn png_candidate(width: u32, height: u32) -> UploadCandidate {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([34, 197, 94, 255]),
        ));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        UploadCandidate::new(buffer, "image/png", "garden.png")
    }

    #[test]
    fn test_target_dimensions_no_upscale() {
        let d = Downsampler::default();
        assert_eq!(d.target_dimensions(800, 600), (800, 600));
        assert_eq!(d.target_dimensions(1920, 1080), (1920, 1080));
    }

    #[test]
    fn test_target_dimensions_preserves_ratio() {
        let d = Downsampler::default();
        assert_eq!(d.target_dimensions(3840, 2160), (1920, 1080));
        assert_eq!(d.target_dimensions(4000, 3000), (1920, 1440));
        // 2001 * 0.64 = 1280.64 rounds to nearest
        assert_eq!(d.target_dimensions(3000, 2001), (1920, 1281));
        // Extreme panoramas never collapse to zero height
        assert_eq!(d.target_dimensions(100_000, 10), (1920, 1));
    }

    #[test]
    fn test_downsample_wide_image() {
        let d = Downsampler::new(200, 0.8);
        let out = d.downsample_blocking(&png_candidate(400, 300)).unwrap();
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(out.filename, "garden.png");
        assert_eq!(image_dimensions(&out.data), Some((200, 150)));
    }

    #[test]
    fn test_downsample_narrow_image_keeps_dimensions() {
        let d = Downsampler::new(200, 0.8);
        let out = d.downsample_blocking(&png_candidate(120, 80)).unwrap();
        assert_eq!(out.content_type, "image/jpeg");
        assert_eq!(image_dimensions(&out.data), Some((120, 80)));
    }

    #[test]
    fn test_downsample_rejects_non_image() {
        let d = Downsampler::default();
        let candidate = UploadCandidate::new(b"definitely not pixels".to_vec(), "image/png", "x.png");
        assert!(matches!(
            d.downsample_blocking(&candidate),
            Err(UploadError::Decode(_))
        ));
    }

    #[test]
    fn test_quality_mapping() {
        assert_eq!(Downsampler::default().jpeg_quality(), 80);
        assert_eq!(Downsampler::new(10, 1.0).jpeg_quality(), 100);
        assert_eq!(Downsampler::new(10, 0.0).jpeg_quality(), 1);
    }

    #[tokio::test]
    async fn test_downsample_async() {
        let img = RgbImage::from_pixel(64, 32, Rgb([200, 10, 10]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        let candidate = UploadCandidate::new(buffer, "image/png", "red.png");

        let out = Downsampler::new(32, 0.8).downsample(&candidate).await.unwrap();
        assert_eq!(image_dimensions(&out.data), Some((32, 16)));
    }
}

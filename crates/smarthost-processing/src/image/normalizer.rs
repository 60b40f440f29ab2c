//! Image normalizer - decode, flatten, optional fixed-canvas resize, JPEG re-encode
//!
//! Every step works on an owned in-memory buffer and the only output is the final
//! encoded byte string, so a failure at any step leaves nothing behind.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, RgbImage};
use smarthost_core::constants::{JPEG_QUALITY, NORMALIZED_HEIGHT, NORMALIZED_WIDTH};
use std::io::Cursor;

/// Background that transparent pixels are composited onto.
const BACKGROUND: [u8; 3] = [255, 255, 255];

const MAX_JPEG_SIDE: u32 = u16::MAX as u32;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The bytes are not a raster image this build can decode.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Decoded fine but cannot be written as JPEG, e.g. a side longer than the format allows.
    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Stateless raster normalizer
pub struct ImageNormalizer;

impl ImageNormalizer {
    /// Normalize `data` to a three-channel JPEG.
    ///
    /// With `resize` the output is exactly `NORMALIZED_WIDTH` x `NORMALIZED_HEIGHT`
    /// whatever the input aspect ratio. Without it the input dimensions are kept.
    pub fn normalize(data: &[u8], resize: bool) -> Result<Bytes, NormalizeError> {
        let start = std::time::Instant::now();

        let img = Self::decode(data)?;
        let (src_width, src_height) = img.dimensions();
        let had_alpha = img.color().has_alpha();

        let mut rgb = Self::flatten(&img);
        drop(img);

        if resize {
            rgb = image::imageops::resize(
                &rgb,
                NORMALIZED_WIDTH,
                NORMALIZED_HEIGHT,
                FilterType::Lanczos3,
            );
        }

        let encoded = Self::encode_jpeg(&rgb)?;

        tracing::debug!(
            src_width = src_width,
            src_height = src_height,
            dst_width = rgb.width(),
            dst_height = rgb.height(),
            had_alpha = had_alpha,
            resized = resize,
            input_bytes = data.len(),
            output_bytes = encoded.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image normalized"
        );

        Ok(encoded)
    }

    fn decode(data: &[u8]) -> Result<DynamicImage, NormalizeError> {
        let reader = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| NormalizeError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(NormalizeError::Decode(
                "Unrecognized image format".to_string(),
            ));
        }

        reader
            .decode()
            .map_err(|e| NormalizeError::Decode(e.to_string()))
    }

    /// Drop the alpha channel by compositing onto white, or convert straight to RGB.
    pub fn flatten(img: &DynamicImage) -> RgbImage {
        if !img.color().has_alpha() {
            return img.to_rgb8();
        }

        let rgba = img.to_rgba8();
        let mut out = RgbImage::new(rgba.width(), rgba.height());

        for (src, dst) in rgba.pixels().zip(out.pixels_mut()) {
            let alpha = src[3] as u32;
            for c in 0..3 {
                let fg = src[c] as u32 * alpha;
                let bg = BACKGROUND[c] as u32 * (255 - alpha);
                dst[c] = ((fg + bg + 127) / 255) as u8;
            }
        }

        out
    }

    fn encode_jpeg(rgb: &RgbImage) -> Result<Bytes, NormalizeError> {
        let (width, height) = rgb.dimensions();
        if width > MAX_JPEG_SIDE || height > MAX_JPEG_SIDE {
            return Err(NormalizeError::Encode(format!(
                "{}x{} exceeds the JPEG limit of {} pixels per side",
                width, height, MAX_JPEG_SIDE
            )));
        }

        let mut buffer = Vec::with_capacity(width as usize * height as usize / 4);

        JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY)
            .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
            .map_err(|e| NormalizeError::Encode(e.to_string()))?;

        Ok(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, Rgba, RgbaImage};

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    fn decode(data: &[u8]) -> DynamicImage {
        image::load_from_memory(data).unwrap()
    }

    #[test]
    fn test_resize_gives_fixed_canvas() {
        let wide = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 120, Rgb([10, 200, 30])));
        let out = ImageNormalizer::normalize(&encode(&wide, ImageFormat::Png), true).unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        assert_eq!(decode(&out).dimensions(), (640, 640));
    }

    #[test]
    fn test_resize_from_every_input_format() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(33, 71, Rgb([90, 90, 90])));
        for format in [
            ImageFormat::Png,
            ImageFormat::Jpeg,
            ImageFormat::Bmp,
        ] {
            let out = ImageNormalizer::normalize(&encode(&img, format), true).unwrap();
            assert_eq!(decode(&out).dimensions(), (640, 640), "{:?}", format);
        }
    }

    #[test]
    fn test_without_resize_keeps_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 20, Rgb([0, 0, 255])));
        let out = ImageNormalizer::normalize(&encode(&img, ImageFormat::Png), false).unwrap();

        let decoded = decode(&out);
        assert_eq!(decoded.dimensions(), (50, 20));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let mut rgba = RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 0]));
        for x in 0..32 {
            for y in 0..64 {
                rgba.put_pixel(x, y, Rgba([200, 0, 0, 255]));
            }
        }
        let img = DynamicImage::ImageRgba8(rgba);

        let out = ImageNormalizer::normalize(&encode(&img, ImageFormat::Png), false).unwrap();
        let decoded = decode(&out);
        assert!(!decoded.color().has_alpha());

        let rgb = decoded.to_rgb8();
        let transparent_side = rgb.get_pixel(60, 32);
        assert!(transparent_side.0.iter().all(|&c| c >= 250), "{:?}", transparent_side);
        let opaque_side = rgb.get_pixel(4, 32);
        assert!(opaque_side[0] > 150 && opaque_side[1] < 50, "{:?}", opaque_side);
    }

    #[test]
    fn test_flatten_blends_partial_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128])));
        let flat = ImageNormalizer::flatten(&img);
        let px = flat.get_pixel(0, 0);
        assert_eq!(px.0, [127, 127, 127]);
    }

    #[test]
    fn test_flatten_without_alpha_is_plain_conversion() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(2, 2, image::Luma([77])));
        let flat = ImageNormalizer::flatten(&img);
        assert_eq!(flat.get_pixel(1, 1).0, [77, 77, 77]);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = ImageNormalizer::normalize(b"%PDF-1.4 definitely not a raster", true);
        assert!(matches!(result, Err(NormalizeError::Decode(_))));

        let result = ImageNormalizer::normalize(&[], false);
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn test_truncated_image_is_decode_error() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 40, Rgb([1, 2, 3])));
        let png = encode(&img, ImageFormat::Png);
        let result = ImageNormalizer::normalize(&png[..png.len() / 2], true);
        assert!(matches!(result, Err(NormalizeError::Decode(_))));
    }

    #[test]
    fn test_side_beyond_jpeg_limit() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(70_000, 1, Rgb([5, 5, 5])));
        let png = encode(&img, ImageFormat::Png);

        let result = ImageNormalizer::normalize(&png, false);
        assert!(matches!(result, Err(NormalizeError::Encode(_))));

        // resizing brings it back within range
        let out = ImageNormalizer::normalize(&png, true).unwrap();
        assert_eq!(decode(&out).dimensions(), (640, 640));
    }
}

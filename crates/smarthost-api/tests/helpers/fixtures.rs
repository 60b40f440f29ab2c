//! Test fixtures: images generated in memory, plus a few non-image blobs.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), format)
        .expect("encode fixture");
    buffer
}

/// Opaque PNG of the given size.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([30, 60, 90])));
    encode(&img, ImageFormat::Png)
}

/// PNG whose right half is fully transparent.
pub fn create_half_transparent_png(width: u32, height: u32) -> Vec<u8> {
    let mut rgba = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
    for x in 0..width / 2 {
        for y in 0..height {
            rgba.put_pixel(x, y, Rgba([0, 0, 200, 255]));
        }
    }
    encode(&DynamicImage::ImageRgba8(rgba), ImageFormat::Png)
}

pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 100, 50])));
    encode(&img, ImageFormat::Jpeg)
}

/// Small blob that starts like a PDF. Never decoded.
pub fn create_minimal_pdf() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n".to_vec()
}

/// Arbitrary bytes standing in for audio.
pub fn create_audio_blob() -> Vec<u8> {
    let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    data.extend((0..2048u32).map(|i| (i % 251) as u8));
    data
}

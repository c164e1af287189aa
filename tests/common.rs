#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, RgbImage};
use std::fs::{self, File};
use std::io::Cursor;
use std::path::Path;

/// Deterministic RGB noise. Lossless encoders cannot shrink it; lossy ones can.
pub fn noise_image(width: u32, height: u32, seed: u32) -> DynamicImage {
    let mut state = seed | 1;
    let img: RgbImage = ImageBuffer::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgb([r, g, b])
    });
    DynamicImage::ImageRgb8(img)
}

pub fn write_noise_png(path: &Path) {
    noise_image(64, 64, 42)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// A JPEG saved at quality 100, so any re-encode at 80-85 is smaller.
pub fn write_noise_jpeg(path: &Path) {
    let file = File::create(path).unwrap();
    noise_image(64, 64, 99)
        .write_with_encoder(JpegEncoder::new_with_quality(file, 100))
        .unwrap();
}

/// A smooth gradient stored with the fastest, unfiltered PNG settings.
pub fn write_loose_png(path: &Path) {
    let img: RgbImage = ImageBuffer::from_fn(96, 96, |x, y| {
        Rgb([(x * 2) as u8, (y * 2) as u8, ((x + y) % 256) as u8])
    });
    let encoder = PngEncoder::new_with_quality(
        File::create(path).unwrap(),
        CompressionType::Fast,
        FilterType::NoFilter,
    );
    DynamicImage::ImageRgb8(img)
        .write_with_encoder(encoder)
        .unwrap();
}

/// Valid PNG signature followed by garbage.
pub fn write_corrupt_png(path: &Path) {
    fs::write(path, b"\x89PNG\r\n\x1a\nnot a chunk at all").unwrap();
}

pub fn write_gif(path: &Path) {
    let mut cursor = Cursor::new(Vec::new());
    noise_image(32, 32, 7)
        .write_to(&mut cursor, ImageFormat::Gif)
        .unwrap();
    fs::write(path, cursor.into_inner()).unwrap();
}

use crate::constants::{MAX_LIBDEFLATER_LEVEL, MAX_PNG_COMPRESSION_LEVEL, OXIPNG_PRESET};
use crate::error::{OptimizeError, Result};
use crate::formats::{SourceFormat, TargetFormat};
use crate::profile::{JpegOptions, OptimizationProfile, PngOptions, WebpOptions};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use log::debug;
use mozjpeg::{ColorSpace, Compress};
use oxipng::{Deflaters, Interlacing, Options};
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

/// The encoder operations the pipeline needs. Implementations must be usable
/// from several worker threads at once.
pub trait Codec: Sync {
    /// Re-encode a decoded image as JPEG.
    fn encode_jpeg(&self, image: &DynamicImage, options: &JpegOptions) -> Result<Vec<u8>>;

    /// Optimize an encoded PNG without decoding it to pixels first.
    fn encode_png(&self, png: &[u8], options: &PngOptions) -> Result<Vec<u8>>;

    /// Encode a decoded image as lossy WebP.
    fn encode_webp(&self, image: &DynamicImage, options: &WebpOptions) -> Result<Vec<u8>>;
}

/// MozJPEG / `image` for JPEG, oxipng for PNG, libwebp for WebP.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCodec;

impl Codec for NativeCodec {
    fn encode_jpeg(&self, image: &DynamicImage, options: &JpegOptions) -> Result<Vec<u8>> {
        if options.use_mozjpeg {
            encode_mozjpeg(image, options)
        } else {
            let mut cursor = Cursor::new(Vec::new());
            let encoder = JpegEncoder::new_with_quality(&mut cursor, options.quality);
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| OptimizeError::encode("JPEG", e))?;
            Ok(cursor.into_inner())
        }
    }

    fn encode_png(&self, png: &[u8], options: &PngOptions) -> Result<Vec<u8>> {
        let mut oxipng_options = Options::from_preset(OXIPNG_PRESET);
        oxipng_options.deflate = Deflaters::Libdeflater {
            compression: libdeflater_level(options.compression_level),
        };
        if options.progressive {
            oxipng_options.interlace = Some(Interlacing::Adam7);
        }

        oxipng::optimize_from_memory(png, &oxipng_options)
            .map_err(|e| OptimizeError::encode("PNG", e))
    }

    fn encode_webp(&self, image: &DynamicImage, options: &WebpOptions) -> Result<Vec<u8>> {
        let (width, height) = (image.width(), image.height());
        let pixels: Vec<u8>;
        let encoder = if image.color().has_alpha() {
            pixels = image.to_rgba8().into_raw();
            webp::Encoder::from_rgba(&pixels, width, height)
        } else {
            pixels = image.to_rgb8().into_raw();
            webp::Encoder::from_rgb(&pixels, width, height)
        };

        let mut config = webp::WebPConfig::new()
            .map_err(|_| OptimizeError::encode("WebP", "could not initialise encoder config"))?;
        config.quality = f32::from(options.quality);
        config.method = i32::from(options.effort);

        let encoded = encoder
            .encode_advanced(&config)
            .map_err(|e| OptimizeError::encode("WebP", format!("{:?}", e)))?;
        Ok(encoded.to_vec())
    }
}

fn encode_mozjpeg(image: &DynamicImage, options: &JpegOptions) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    // libjpeg reports errors by unwinding.
    let encoded = panic::catch_unwind(AssertUnwindSafe(|| -> std::io::Result<Vec<u8>> {
        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(width, height);
        comp.set_quality(f32::from(options.quality));
        if options.progressive {
            comp.set_progressive_mode();
        }
        comp.set_optimize_coding(true);

        let mut started = comp.start_compress(Vec::new())?;
        started.write_scanlines(rgb.as_raw())?;
        started.finish()
    }));

    match encoded {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => Err(OptimizeError::encode("JPEG", e)),
        Err(_) => Err(OptimizeError::encode("JPEG", "mozjpeg aborted")),
    }
}

/// Scale a 0-9 zlib-style level onto libdeflate's 0-12.
fn libdeflater_level(level: u8) -> u8 {
    let level = level.min(MAX_PNG_COMPRESSION_LEVEL);
    (u16::from(level) * u16::from(MAX_LIBDEFLATER_LEVEL) / u16::from(MAX_PNG_COMPRESSION_LEVEL))
        as u8
}

/// Output of a successful transform.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub bytes: Vec<u8>,
    pub target: TargetFormat,
    /// True when a PNG's WebP conversion failed and the PNG re-encode was used.
    pub fell_back: bool,
}

/// Re-encode `bytes` according to `profile`.
///
/// PNGs go to WebP when the profile asks for it, falling back to a PNG
/// re-encode if anything on the WebP path fails. JPEGs stay JPEG. Every other
/// format the filter let through becomes WebP.
pub fn transform(
    bytes: &[u8],
    source: &SourceFormat,
    profile: &OptimizationProfile,
    codec: &dyn Codec,
) -> Result<Transformed> {
    match source {
        SourceFormat::Png if profile.convert_png_to_webp => {
            let webp = decode(bytes, source).and_then(|img| codec.encode_webp(&img, &profile.webp));
            match webp {
                Ok(encoded) => Ok(Transformed {
                    bytes: encoded,
                    target: TargetFormat::WebP,
                    fell_back: false,
                }),
                Err(e) => {
                    debug!("WebP conversion failed ({}), optimizing PNG instead", e);
                    let encoded = codec.encode_png(bytes, &profile.png)?;
                    Ok(Transformed {
                        bytes: encoded,
                        target: TargetFormat::Png,
                        fell_back: true,
                    })
                }
            }
        }
        SourceFormat::Png => Ok(Transformed {
            bytes: codec.encode_png(bytes, &profile.png)?,
            target: TargetFormat::Png,
            fell_back: false,
        }),
        SourceFormat::Jpeg => {
            let img = decode(bytes, source)?;
            Ok(Transformed {
                bytes: codec.encode_jpeg(&img, &profile.jpeg)?,
                target: TargetFormat::Jpeg,
                fell_back: false,
            })
        }
        _ => {
            let img = decode(bytes, source)?;
            Ok(Transformed {
                bytes: codec.encode_webp(&img, &profile.webp)?,
                target: TargetFormat::WebP,
                fell_back: false,
            })
        }
    }
}

fn decode(bytes: &[u8], source: &SourceFormat) -> Result<DynamicImage> {
    let decoded = match source {
        SourceFormat::Jpeg => image::load_from_memory_with_format(bytes, ImageFormat::Jpeg),
        SourceFormat::Png => image::load_from_memory_with_format(bytes, ImageFormat::Png),
        SourceFormat::Gif => image::load_from_memory_with_format(bytes, ImageFormat::Gif),
        SourceFormat::Bmp => image::load_from_memory_with_format(bytes, ImageFormat::Bmp),
        SourceFormat::Tiff => image::load_from_memory_with_format(bytes, ImageFormat::Tiff),
        SourceFormat::Other(_) => image::load_from_memory(bytes),
    };
    decoded.map_err(|e| OptimizeError::encode("decode", format!("cannot read {}: {}", source, e)))
}

use crate::constants::{
    MAX_PNG_COMPRESSION_LEVEL, MAX_QUALITY, MAX_WEBP_EFFORT, PERMISSIVE_EXTENSIONS,
    STRICT_EXTENSIONS,
};
use crate::error::{OptimizeError, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JpegOptions {
    pub quality: u8,
    pub progressive: bool,
    pub use_mozjpeg: bool,
}

/// `quality` is kept for parity with the other formats; the PNG path is a
/// lossless re-encode and only `compression_level` and `progressive` shape it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PngOptions {
    pub quality: u8,
    pub compression_level: u8,
    pub progressive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WebpOptions {
    pub quality: u8,
    pub effort: u8,
}

/// Which extensions a profile is willing to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionPolicy {
    /// jpg, jpeg, png only.
    Strict,
    /// Adds gif, bmp, tiff; anything else that decodes is converted to WebP.
    Permissive,
}

impl ExtensionPolicy {
    /// Extensions picked up when listing a directory.
    pub fn listed_extensions(&self) -> &'static [&'static str] {
        match self {
            ExtensionPolicy::Strict => STRICT_EXTENSIONS,
            ExtensionPolicy::Permissive => PERMISSIVE_EXTENSIONS,
        }
    }
}

/// Size thresholds in MB. `None` disables a rule.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Thresholds {
    /// Skip PNGs strictly smaller than this.
    pub png_skip_below_mb: Option<f64>,
    /// Skip JPEGs strictly smaller than this.
    pub jpeg_skip_below_mb: Option<f64>,
    /// Only touch PNGs strictly larger than this.
    pub png_require_above_mb: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    /// High quality, JPEG/PNG only, skips files that are already small
    Conservative,
    /// Re-encodes everything it recognizes, converts other formats to WebP
    Standard,
    /// Converts PNGs to WebP and keeps a backup of every overwritten file
    Aggressive,
}

impl ProfileName {
    pub fn all() -> [ProfileName; 3] {
        [
            ProfileName::Conservative,
            ProfileName::Standard,
            ProfileName::Aggressive,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileName::Conservative => "conservative",
            ProfileName::Standard => "standard",
            ProfileName::Aggressive => "aggressive",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, validated bundle of encoder options and skip rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationProfile {
    pub name: ProfileName,
    pub jpeg: JpegOptions,
    pub png: PngOptions,
    pub webp: WebpOptions,
    pub extension_policy: ExtensionPolicy,
    pub thresholds: Thresholds,
    pub convert_png_to_webp: bool,
    pub backup: bool,
}

impl OptimizationProfile {
    pub fn preset(name: ProfileName) -> Self {
        match name {
            ProfileName::Conservative => Self::conservative(),
            ProfileName::Standard => Self::standard(),
            ProfileName::Aggressive => Self::aggressive(),
        }
    }

    pub fn conservative() -> Self {
        Self {
            name: ProfileName::Conservative,
            jpeg: JpegOptions {
                quality: 85,
                progressive: true,
                use_mozjpeg: true,
            },
            png: PngOptions {
                quality: 90,
                compression_level: 6,
                progressive: true,
            },
            webp: WebpOptions {
                quality: 85,
                effort: 4,
            },
            extension_policy: ExtensionPolicy::Strict,
            thresholds: Thresholds {
                png_skip_below_mb: Some(0.5),
                jpeg_skip_below_mb: Some(0.8),
                png_require_above_mb: Some(1.0),
            },
            convert_png_to_webp: false,
            backup: false,
        }
    }

    pub fn standard() -> Self {
        Self {
            name: ProfileName::Standard,
            jpeg: JpegOptions {
                quality: 80,
                progressive: true,
                use_mozjpeg: true,
            },
            png: PngOptions {
                quality: 85,
                compression_level: 9,
                progressive: true,
            },
            webp: WebpOptions {
                quality: 80,
                effort: 6,
            },
            extension_policy: ExtensionPolicy::Permissive,
            thresholds: Thresholds::default(),
            convert_png_to_webp: false,
            backup: false,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            name: ProfileName::Aggressive,
            jpeg: JpegOptions {
                quality: 80,
                progressive: true,
                use_mozjpeg: true,
            },
            png: PngOptions {
                quality: 85,
                compression_level: 6,
                progressive: true,
            },
            webp: WebpOptions {
                quality: 85,
                effort: 6,
            },
            extension_policy: ExtensionPolicy::Strict,
            thresholds: Thresholds::default(),
            convert_png_to_webp: true,
            backup: true,
        }
    }

    /// Checks every numeric option against its encoder's range.
    pub fn validate(&self) -> Result<()> {
        for (label, quality) in [
            ("jpeg quality", self.jpeg.quality),
            ("png quality", self.png.quality),
            ("webp quality", self.webp.quality),
        ] {
            if quality > MAX_QUALITY {
                return Err(OptimizeError::InvalidProfile(format!(
                    "{} {} is out of range 0-{}",
                    label, quality, MAX_QUALITY
                )));
            }
        }

        if self.png.compression_level > MAX_PNG_COMPRESSION_LEVEL {
            return Err(OptimizeError::InvalidProfile(format!(
                "png compression level {} is out of range 0-{}",
                self.png.compression_level, MAX_PNG_COMPRESSION_LEVEL
            )));
        }

        if self.webp.effort > MAX_WEBP_EFFORT {
            return Err(OptimizeError::InvalidProfile(format!(
                "webp effort {} is out of range 0-{}",
                self.webp.effort, MAX_WEBP_EFFORT
            )));
        }

        for (label, value) in [
            ("png_skip_below_mb", self.thresholds.png_skip_below_mb),
            ("jpeg_skip_below_mb", self.thresholds.jpeg_skip_below_mb),
            ("png_require_above_mb", self.thresholds.png_require_above_mb),
        ] {
            if let Some(mb) = value {
                if !mb.is_finite() || mb < 0.0 {
                    return Err(OptimizeError::InvalidProfile(format!(
                        "{} must be a non-negative number, got {}",
                        label, mb
                    )));
                }
            }
        }

        Ok(())
    }

    /// Multi-line description used by `img-shrink profiles`.
    pub fn describe(&self) -> String {
        let mut lines = vec![format!("{}:", self.name)];
        lines.push(format!(
            "  jpeg: quality {}, progressive {}, mozjpeg {}",
            self.jpeg.quality, self.jpeg.progressive, self.jpeg.use_mozjpeg
        ));
        lines.push(format!(
            "  png:  quality {}, compression level {}, progressive {}",
            self.png.quality, self.png.compression_level, self.png.progressive
        ));
        lines.push(format!(
            "  webp: quality {}, effort {}",
            self.webp.quality, self.webp.effort
        ));
        lines.push(format!(
            "  formats: {}",
            self.extension_policy.listed_extensions().join(", ")
        ));

        let mut rules = Vec::new();
        if let Some(mb) = self.thresholds.png_skip_below_mb {
            rules.push(format!("skip PNG < {:.1}MB", mb));
        }
        if let Some(mb) = self.thresholds.jpeg_skip_below_mb {
            rules.push(format!("skip JPEG < {:.1}MB", mb));
        }
        if let Some(mb) = self.thresholds.png_require_above_mb {
            rules.push(format!("PNG only > {:.1}MB", mb));
        }
        if rules.is_empty() {
            rules.push("none".to_string());
        }
        lines.push(format!("  thresholds: {}", rules.join(", ")));
        lines.push(format!(
            "  png -> webp: {}, backup: {}",
            self.convert_png_to_webp, self.backup
        ));
        lines.join("\n")
    }
}

impl Default for OptimizationProfile {
    fn default() -> Self {
        Self::conservative()
    }
}

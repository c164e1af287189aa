//! Image format handling.
//!
//! Source formats are detected from the file extension only; nothing is
//! decoded until the eligibility filter has said yes.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Format of an input file, as detected from its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    /// Any other extension. Only the permissive policy lets these through,
    /// and they always go to WebP.
    Other(String),
}

impl SourceFormat {
    /// Returns `None` when the path has no (UTF-8) extension at all.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
    }

    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => SourceFormat::Jpeg,
            "png" => SourceFormat::Png,
            "gif" => SourceFormat::Gif,
            "bmp" => SourceFormat::Bmp,
            "tiff" => SourceFormat::Tiff,
            other => SourceFormat::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Png => "png",
            SourceFormat::Gif => "gif",
            SourceFormat::Bmp => "bmp",
            SourceFormat::Tiff => "tiff",
            SourceFormat::Other(ext) => ext,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_uppercase())
    }
}

/// Formats the transform engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    Jpeg,
    Png,
    WebP,
}

impl TargetFormat {
    /// Returns the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpg",
            TargetFormat::Png => "png",
            TargetFormat::WebP => "webp",
        }
    }

    /// Whether writing this format over a file with `path`'s extension keeps
    /// the path unchanged (`.jpeg` and `.jpg` are both JPEG).
    pub fn matches_extension(&self, path: &Path) -> bool {
        match SourceFormat::from_path(path) {
            Some(SourceFormat::Jpeg) => *self == TargetFormat::Jpeg,
            Some(SourceFormat::Png) => *self == TargetFormat::Png,
            Some(SourceFormat::Other(ext)) => ext == "webp" && *self == TargetFormat::WebP,
            _ => false,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TargetFormat::Jpeg => "JPEG",
            TargetFormat::Png => "PNG",
            TargetFormat::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}

/// Where the output of a transform goes: the input path itself, or a sibling
/// with the target's extension when the format changed.
pub fn output_path_for(input: &Path, target: TargetFormat) -> PathBuf {
    if target.matches_extension(input) {
        input.to_path_buf()
    } else {
        input.with_extension(target.extension())
    }
}

/// `photo.jpg` -> `photo.jpg.backup`
pub fn backup_path_for(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(crate::constants::BACKUP_SUFFIX);
    PathBuf::from(name)
}

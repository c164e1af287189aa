use crate::formats::SourceFormat;
use crate::inspect::FileSize;
use crate::profile::{ExtensionPolicy, OptimizationProfile};
use crate::utils::round2;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    UnsupportedFormat(String),
    /// `limit_mb` is the threshold the file failed against.
    BelowSizeThreshold { size_mb: f64, limit_mb: f64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedFormat(ext) if ext.is_empty() => {
                write!(f, "unsupported format (no extension)")
            }
            SkipReason::UnsupportedFormat(ext) => write!(f, "unsupported format: .{}", ext),
            SkipReason::BelowSizeThreshold { size_mb, limit_mb } => write!(
                f,
                "already small ({:.2}MB, threshold {:.1}MB)",
                size_mb, limit_mb
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    Proceed(SourceFormat),
    Skip(SkipReason),
}

/// Decides whether `path` is worth decoding at all.
///
/// Only the extension and the already-known size are consulted, so this
/// runs before the file is read.
pub fn check_eligibility(
    path: &Path,
    size: FileSize,
    profile: &OptimizationProfile,
) -> Eligibility {
    let format = match (
        SourceFormat::from_path(path),
        profile.extension_policy,
    ) {
        (Some(format @ (SourceFormat::Jpeg | SourceFormat::Png)), _) => format,
        (Some(format), ExtensionPolicy::Permissive) => format,
        (None, ExtensionPolicy::Permissive) => SourceFormat::Other(String::new()),
        (Some(format), ExtensionPolicy::Strict) => {
            return Eligibility::Skip(SkipReason::UnsupportedFormat(format.name().to_string()))
        }
        (None, ExtensionPolicy::Strict) => {
            return Eligibility::Skip(SkipReason::UnsupportedFormat(String::new()))
        }
    };

    // Thresholds apply to the size as shown, at two decimals.
    let size_mb = round2(size.mb());
    let thresholds = &profile.thresholds;
    let below = |limit: Option<f64>| limit.filter(|&limit_mb| size_mb < limit_mb);

    let failed_limit = match format {
        SourceFormat::Png => below(thresholds.png_skip_below_mb).or_else(|| {
            thresholds
                .png_require_above_mb
                .filter(|&limit_mb| size_mb <= limit_mb)
        }),
        SourceFormat::Jpeg => below(thresholds.jpeg_skip_below_mb),
        _ => None,
    };

    match failed_limit {
        Some(limit_mb) => Eligibility::Skip(SkipReason::BelowSizeThreshold { size_mb, limit_mb }),
        None => Eligibility::Proceed(format),
    }
}

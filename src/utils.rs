//! Small numeric and formatting helpers shared by the pipeline stages and
//! the report.

use crate::constants::BYTES_PER_MB;

/// Convert a byte count to MB (1024²), unrounded.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Format file size in human-readable format
///
/// # Arguments
/// * `bytes` - Size in bytes
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Size in MB with two decimals, the unit the per-file log lines use.
pub fn format_mb(bytes: u64) -> String {
    format!("{:.2}MB", bytes_to_mb(bytes))
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places, the precision sizes are compared at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reduction as a percentage of `original_size`, rounded to one decimal.
/// Positive means smaller; a zero-byte original reports 0.
pub fn reduction_percent(original_size: u64, optimized_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    round1((original_size as f64 - optimized_size as f64) / original_size as f64 * 100.0)
}

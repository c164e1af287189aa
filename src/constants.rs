pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub const MAX_QUALITY: u8 = 100;
pub const MAX_PNG_COMPRESSION_LEVEL: u8 = 9;
pub const MAX_WEBP_EFFORT: u8 = 6;

/// libdeflate tops out at 12; PNG levels 0-9 are scaled onto that range.
pub const MAX_LIBDEFLATER_LEVEL: u8 = 12;
pub const OXIPNG_PRESET: u8 = 2;

pub const BACKUP_SUFFIX: &str = "backup";

pub const STRICT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const PERMISSIVE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff"];

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const SKIP_PREFIX: &str = "⏭️ ";
pub const ERROR_PREFIX: &str = "❌";
pub const BACKUP_PREFIX: &str = "📦";
pub const NEW_FILE_PREFIX: &str = "📝";
pub const SUMMARY_PREFIX: &str = "📊";

use crate::error::{OptimizeError, Result};
use crate::utils::bytes_to_mb;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSize {
    pub bytes: u64,
}

impl FileSize {
    pub fn mb(&self) -> f64 {
        bytes_to_mb(self.bytes)
    }
}

/// Stats `path` and returns its size.
///
/// # Returns
/// * `Ok(FileSize)` for a regular file
/// * `Err(OptimizeError::NotFound)` if the path is missing or is not a file
/// * `Err(OptimizeError::Read)` for any other stat failure
pub fn inspect_size(path: &Path) -> Result<FileSize> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => OptimizeError::NotFound(path.to_path_buf()),
        _ => OptimizeError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_file() {
        return Err(OptimizeError::NotFound(path.to_path_buf()));
    }

    Ok(FileSize {
        bytes: metadata.len(),
    })
}

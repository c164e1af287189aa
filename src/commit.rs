use crate::constants::{BACKUP_PREFIX, NEW_FILE_PREFIX};
use crate::error::{OptimizeError, Result};
use crate::formats::{backup_path_for, output_path_for};
use crate::transform::Transformed;
use crate::utils::reduction_percent;
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOptions {
    pub backup: bool,
    /// When false an existing `<path>.backup` is left as it is.
    pub overwrite_backup: bool,
    pub dry_run: bool,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            backup: false,
            overwrite_backup: true,
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    pub original_size: u64,
    pub optimized_size: u64,
    pub reduction_percent: f64,
    /// Set only when the output went to a different path than the input.
    pub new_path: Option<PathBuf>,
    pub backup_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Committed(Committed),
    NoImprovement {
        original_size: u64,
        optimized_size: u64,
    },
}

/// Writes `transformed` for `input` if, and only if, it is strictly smaller
/// than `original`.
///
/// The backup (if any) is fully written before the destination is touched,
/// and the destination is replaced through a temp file in the same directory
/// so readers never see a partial image.
pub fn commit(
    input: &Path,
    original: &[u8],
    transformed: &Transformed,
    options: &CommitOptions,
) -> Result<CommitOutcome> {
    let original_size = original.len() as u64;
    let optimized_size = transformed.bytes.len() as u64;

    if optimized_size >= original_size {
        return Ok(CommitOutcome::NoImprovement {
            original_size,
            optimized_size,
        });
    }

    let output = output_path_for(input, transformed.target);
    let new_path = (output.as_path() != input).then(|| output.clone());

    // A converted sibling that already exists must be beaten too, so a
    // repeat run (or a second input mapping to the same name) leaves it alone.
    if let Some(path) = &new_path {
        if let Ok(existing) = fs::metadata(path) {
            if optimized_size >= existing.len() {
                debug!(
                    "{} already exists at {} bytes, keeping it",
                    path.display(),
                    existing.len()
                );
                return Ok(CommitOutcome::NoImprovement {
                    original_size,
                    optimized_size,
                });
            }
        }
    }

    let backup_path = if options.backup {
        let path = backup_path_for(input);
        if options.dry_run {
            debug!("dry run: would back up {} to {}", input.display(), path.display());
        } else if path.exists() && !options.overwrite_backup {
            debug!("keeping existing backup {}", path.display());
        } else {
            write_atomic(&path, original)?;
            info!("{} Backup created: {}", BACKUP_PREFIX, path.display());
        }
        Some(path)
    } else {
        None
    };

    if options.dry_run {
        debug!("dry run: would write {}", output.display());
    } else {
        write_atomic(&output, &transformed.bytes)?;
        if let Some(path) = &new_path {
            info!("{} New file: {}", NEW_FILE_PREFIX, path.display());
        }
    }

    Ok(CommitOutcome::Committed(Committed {
        original_size,
        optimized_size,
        reduction_percent: reduction_percent(original_size, optimized_size),
        new_path,
        backup_path,
    }))
}

/// Replace `path` with `data` via a sibling temp file and a rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let to_write_error = |source| OptimizeError::Write {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(parent).map_err(to_write_error)?;
    file.write_all(data).map_err(to_write_error)?;
    file.flush().map_err(to_write_error)?;

    // Carry the original's permissions over when replacing in place.
    if let Ok(metadata) = fs::metadata(path) {
        if let Err(e) = fs::set_permissions(file.path(), metadata.permissions()) {
            debug!("could not copy permissions to {}: {}", path.display(), e);
        }
    }

    file.persist(path).map_err(|e| to_write_error(e.error))?;
    Ok(())
}

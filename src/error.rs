use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{format} encoding failed: {reason}")]
    Encode { format: &'static str, reason: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("No usable input paths were given")]
    NoInputs,

    #[error("Directory traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),
}

impl OptimizeError {
    pub fn encode(format: &'static str, reason: impl ToString) -> Self {
        OptimizeError::Encode {
            format,
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizeError>;

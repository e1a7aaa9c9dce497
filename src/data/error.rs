use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised by the organizer before or outside the per-entry loop.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("manifest not found: {0:?}")]
    ManifestNotFound(PathBuf),

    #[error("source directory not found: {0:?}")]
    SourceDirNotFound(PathBuf),

    #[error("failed to create output directory {path:?}: {source}")]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read manifest {path:?}: {source}")]
    ManifestRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl OrganizeError {
    /// True for the configuration errors (missing manifest or raw-images root).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OrganizeError::ManifestNotFound(_) | OrganizeError::SourceDirNotFound(_)
        )
    }
}

/// Errors from single file operations.
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("copy failed from {src:?} to {dest:?}: {source}")]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        source: std::io::Error,
    },

    #[error("remove failed for {path:?}: {source}")]
    RemoveFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create directory {path:?}: {source}")]
    CreateDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type FileOpResult<T> = Result<T, FileOpError>;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("train fraction must be between 0 and 1 (exclusive), got {0}")]
    InvalidFraction(f64),

    #[error("failed to write split plan to {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize split plan: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset root not found: {0:?}")]
    NotFound(PathBuf),

    #[error("failed to read directory {path:?}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

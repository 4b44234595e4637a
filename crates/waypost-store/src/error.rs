//! Error types for the waypost-store crate

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by the primary store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Bucket directory could not be created
    #[error("failed to initialize storage at {path}: {source}")]
    StorageInit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Parent directory of a write target is missing
    #[error("path not found: {0}")]
    PathNotFound(String),

    /// Object is absent (caller-relative path)
    #[error("file not found: {0}")]
    NotFound(String),

    /// Range header is malformed or out of bounds
    #[error("range not satisfiable: {0}")]
    RangeNotSatisfiable(String),

    /// Text content could not be decoded with the requested encoding
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Any other IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// HTTP status hint for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::StorageInit { .. } | Self::Io(_) => 500,
            Self::PathNotFound(_) | Self::NotFound(_) => 404,
            Self::RangeNotSatisfiable(_) => 416,
            Self::Encoding(_) => 400,
        }
    }

    /// Whether the error means the object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::PathNotFound(_))
    }
}

/// Failure of a best-effort cleanup step (unlink, rollback rename).
///
/// Kept apart from [`StoreError`] so a failed cleanup can never replace the
/// error that triggered it. Callers may log it or drop it.
#[derive(Error, Debug)]
#[error("cleanup of {path} failed: {source}")]
pub struct CleanupError {
    /// Caller-relative path the cleanup targeted
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

impl CleanupError {
    pub(crate) fn new(path: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// True when the target was already gone
    pub fn is_already_absent(&self) -> bool {
        self.source.kind() == std::io::ErrorKind::NotFound
    }
}

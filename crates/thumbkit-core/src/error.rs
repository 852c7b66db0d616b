//! Error types for `thumbkit-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. The thumbnail cache itself
//! never surfaces these to its callers; they are produced by the
//! collaborators (decoders, album sources, config loading) and absorbed at
//! the worker boundary.

use std::path::PathBuf;

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target path does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the path.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// A directory was expected but the path points to a file.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// An image could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// An application package could not be read as an archive.
    #[error("archive error: {0}")]
    Archive(String),

    /// The external frame grabber failed.
    #[error("frame extraction error: {0}")]
    Frame(String),

    /// The change watcher could not be installed.
    #[error("watch error: {0}")]
    Watch(String),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for CoreError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => CoreError::Io(e),
            other => CoreError::Decode(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for CoreError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => CoreError::Io(e),
            other => CoreError::Archive(other.to_string()),
        }
    }
}

impl From<notify::Error> for CoreError {
    fn from(err: notify::Error) -> Self {
        CoreError::Watch(err.to_string())
    }
}

/// Convenience alias used throughout `thumbkit-core`.
pub type CoreResult<T> = Result<T, CoreError>;

//! Error types for filter-fs

use std::path::PathBuf;

/// Result type for filter-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in filter-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Resource not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to parse {format} file at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported property file format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    /// Wrap an I/O error, promoting `NotFound` to [`Error::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound { path };
        }
        Self::Io { path, source }
    }

    /// Whether this error means the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

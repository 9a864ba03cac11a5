//! Error types for filter-core

use std::path::PathBuf;

/// Result type for filter-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, merging or filtering
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Resource not found: {path}")]
    ResourceNotFound { path: PathBuf },

    #[error("Circular placeholder reference '{key}' in property definitions")]
    CircularPlaceholder { key: String },

    #[error("Could not resolve placeholder '{key}'")]
    UnresolvedPlaceholder { key: String },

    #[error("Placeholder '{key}' nests deeper than {limit} levels")]
    NestingTooDeep { key: String, limit: usize },

    #[error("I/O error while {action}: {source}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Filesystem error: {0}")]
    Fs(#[source] filter_fs::Error),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn io(action: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            action: action.into(),
            source,
        }
    }
}

impl From<filter_fs::Error> for Error {
    fn from(err: filter_fs::Error) -> Self {
        match err {
            filter_fs::Error::NotFound { path } => Self::ResourceNotFound { path },
            filter_fs::Error::Parse { .. } | filter_fs::Error::UnsupportedFormat { .. } => {
                Self::configuration(err.to_string())
            }
            other => Self::Fs(other),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::io("accessing a stream", source)
    }
}

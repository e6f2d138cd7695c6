//! Error types for the folder synchronization system.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring or running a synchronization pass
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Failed to {op} {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory {root:?}: {message}")]
    Walk { root: PathBuf, message: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl SyncError {
    /// Wrap an I/O error with the operation and path that produced it
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

impl From<config::ConfigError> for SyncError {
    fn from(err: config::ConfigError) -> Self {
        SyncError::InvalidConfig(err.to_string())
    }
}

impl From<walkdir::Error> for SyncError {
    fn from(err: walkdir::Error) -> Self {
        let root = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
        SyncError::Walk {
            root,
            message: err.to_string(),
        }
    }
}

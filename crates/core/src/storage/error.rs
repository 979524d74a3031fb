//! Error types for the storage module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while transferring objects.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The remote object does not exist.
    #[error("Object not found: {key}")]
    NotFound { key: String },

    /// The key cannot be mapped to a location (absolute or escaping the root).
    #[error("Invalid object key: {key}")]
    InvalidKey { key: String },

    /// Local file system error.
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request could not be completed.
    #[error("Request for {key} failed")]
    Request {
        key: String,
        #[source]
        source: reqwest::Error,
    },

    /// The object store answered with an unexpected status.
    #[error("Object store returned status {status} for {key}")]
    Status { key: String, status: u16 },

    /// HTTP client could not be constructed.
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
}

impl StorageError {
    /// Creates an I/O error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a later attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let server = StorageError::Status {
            key: "k".to_string(),
            status: 503,
        };
        let client = StorageError::Status {
            key: "k".to_string(),
            status: 403,
        };
        let missing = StorageError::NotFound {
            key: "k".to_string(),
        };

        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!missing.is_retryable());
    }
}

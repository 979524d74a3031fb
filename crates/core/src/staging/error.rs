//! Error types for the staging module.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors that can occur while staging window files.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The staging directory could not be created.
    #[error("Failed to create staging directory")]
    Workspace(#[source] std::io::Error),

    /// Two window files would be staged under the same name.
    #[error("{first} and {second} would both be staged as {name}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },

    /// A window file could not be downloaded.
    #[error("An error occurred while downloading {key}")]
    Transfer {
        key: String,
        #[source]
        source: StorageError,
    },
}

impl DownloadError {
    /// Whether a later attempt might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Workspace(_) | Self::DuplicateName { .. } => false,
            Self::Transfer { source, .. } => source.is_retryable(),
        }
    }
}

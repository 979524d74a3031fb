//! Error type for the processing pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::completion::CompletionError;
use crate::forecast::SelectionError;
use crate::preprocessor::PreprocessError;
use crate::staging::DownloadError;
use crate::storage::StorageError;

/// Errors surfaced by `Processing::process`.
///
/// Every variant carries the original failure as its source.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The batch cannot form a processing window.
    #[error("Sorting and validation failed")]
    Selection(#[from] SelectionError),

    /// Staging the window files failed.
    #[error("Staging failed")]
    Download(#[from] DownloadError),

    /// The temporary output directory could not be created.
    #[error("Failed to create output directory")]
    Workspace(#[source] std::io::Error),

    /// The external preprocessor failed.
    #[error("Preprocessing failed")]
    Preprocess(#[from] PreprocessError),

    /// The output directory could not be listed.
    #[error("Failed to read output directory {path}")]
    OutputScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The preprocessor did not produce the artifact for the target step.
    #[error("Expected output {expected} was not produced")]
    OutputMissing { expected: String },

    /// Uploading the artifact failed.
    #[error("Failed to upload {key}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },

    /// A staged input could not be deleted.
    #[error("Failed to delete staged file {path}")]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The completion store rejected the update.
    #[error("Failed to mark row as processed")]
    Completion(#[from] CompletionError),
}

impl ProcessingError {
    /// Short label of the failing phase, used for metrics.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Selection(_) => "selection_failed",
            Self::Download(_) => "download_failed",
            Self::Workspace(_) | Self::Cleanup { .. } => "workspace_failed",
            Self::Preprocess(_) => "preprocessing_failed",
            Self::OutputScan { .. } | Self::OutputMissing { .. } => "output_missing",
            Self::Upload { .. } => "upload_failed",
            Self::Completion(_) => "completion_failed",
        }
    }

    /// Whether retrying the whole batch might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Selection(_) | Self::OutputMissing { .. } => false,
            Self::Download(e) => e.is_retryable(),
            Self::Upload { source, .. } => source.is_retryable(),
            Self::Preprocess(PreprocessError::Timeout { .. }) => true,
            Self::Preprocess(_) => false,
            _ => true,
        }
    }
}

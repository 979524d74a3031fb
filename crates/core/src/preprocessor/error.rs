//! Error types for the preprocessor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running the preprocessor.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// Preprocessor executable not found.
    #[error("Preprocessor not found at path: {path}")]
    ProgramNotFound { path: PathBuf },

    /// The preprocessor exited unsuccessfully.
    #[error("Preprocessing failed: {reason}")]
    Failed {
        reason: String,
        stderr: Option<String>,
    },

    /// The preprocessor did not finish in time.
    #[error("Preprocessing timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while launching or talking to the preprocessor.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PreprocessError {
    /// Creates a new failed error with stderr output.
    pub fn failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
            stderr,
        }
    }
}

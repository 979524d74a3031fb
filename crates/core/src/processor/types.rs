//! Types for the processor module.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::storage::UploadReceipt;

/// Phase of a processing invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Idle,
    Selecting,
    Staging,
    Preprocessing,
    Publishing,
    Completing,
    Failed,
}

impl ProcessingState {
    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Selecting => "selecting",
            Self::Staging => "staging",
            Self::Preprocessing => "preprocessing",
            Self::Publishing => "publishing",
            Self::Completing => "completing",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful processing invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingReport {
    /// Correlation ID of the invocation.
    pub run_id: String,
    /// Row marked as processed.
    pub row_id: String,
    /// Step of the processed timestep.
    pub step: u32,
    /// Lead time of the processed timestep.
    pub lead_time: NaiveDateTime,
    /// The uploaded artifact.
    pub artifact: UploadReceipt,
    /// Number of files staged for the preprocessor.
    pub staged_files: usize,
    /// Staged files that were already gone at cleanup.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_inputs: Vec<PathBuf>,
    /// Preprocessing duration in milliseconds.
    pub preprocessing_duration_ms: u64,
    /// Total duration in milliseconds.
    pub total_duration_ms: u64,
}

//! Error types for window selection.

use thiserror::Error;

/// Errors that can occur while forming a processing window.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The batch does not contain enough descriptors to form a window.
    #[error("Not enough files for pre-processing: need at least {required}, got {actual}")]
    NotEnoughFiles { required: usize, actual: usize },

    /// The lead time of a descriptor is not representable.
    #[error("Lead time out of range for reference time {forecast_ref_time} and step {step}")]
    LeadTimeOutOfRange {
        forecast_ref_time: chrono::NaiveDateTime,
        step: u32,
    },
}

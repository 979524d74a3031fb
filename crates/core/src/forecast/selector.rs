//! Processing window selection.

use super::error::SelectionError;
use super::types::{FileDescriptor, ProcessingWindow};

/// Minimum number of descriptors a batch needs to form a window.
pub const MIN_BATCH_SIZE: usize = 3;

/// Maximum number of descriptors taken into a window.
pub const WINDOW_SIZE: usize = 4;

/// Orders a batch by step (descending) and picks the processing window.
///
/// Initializers are always the third and fourth entries, also when the
/// previous step is the analysis step 0. Descriptors beyond the fourth are
/// ignored. Ties between equal steps are resolved arbitrarily.
pub fn select(batch: Vec<FileDescriptor>) -> Result<ProcessingWindow, SelectionError> {
    let not_enough = SelectionError::NotEnoughFiles {
        required: MIN_BATCH_SIZE,
        actual: batch.len(),
    };
    if batch.len() < MIN_BATCH_SIZE {
        return Err(not_enough);
    }

    let mut sorted = batch;
    sorted.sort_by(|a, b| b.step.cmp(&a.step));
    sorted.truncate(WINDOW_SIZE);

    let mut files = sorted.into_iter();
    let (Some(target), Some(previous)) = (files.next(), files.next()) else {
        return Err(not_enough);
    };

    Ok(ProcessingWindow {
        target,
        previous,
        initializers: files.collect(),
    })
}

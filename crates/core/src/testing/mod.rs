//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the pipeline's collaborator
//! traits, allowing the processing pipeline to be tested without an object
//! store, a preprocessing program or a database.
//!
//! # Example
//!
//! ```rust,ignore
//! use flexprep_core::testing::{fixtures, MockCompletionStore, MockObjectStore, MockPreprocessor};
//!
//! let store = MockObjectStore::new();
//! let preprocessor = MockPreprocessor::new();
//! let completion = MockCompletionStore::new();
//!
//! let batch = fixtures::batch(&[0, 3, 6]);
//! store.put_batch(&batch).await;
//! preprocessor.add_output("dispf2024030106", b"artifact").await;
//! ```

mod mock_completion_store;
mod mock_object_store;
mod mock_preprocessor;

pub use mock_completion_store::MockCompletionStore;
pub use mock_object_store::{MockObjectStore, RecordedUpload};
pub use mock_preprocessor::{MockPreprocessor, RecordedRun};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::forecast::FileDescriptor;

    /// Reference time used by all fixtures: 2024-03-01T00:00:00.
    pub fn ref_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid fixture date")
    }

    /// Create a descriptor of the fixture run.
    pub fn descriptor(row_id: &str, step: u32) -> FileDescriptor {
        FileDescriptor::new(
            row_id,
            ref_time(),
            step,
            format!("ifs/2024030100/{}_{:03}", row_id, step),
        )
    }

    /// Create a batch with one descriptor per step, rows named `row-<index>`.
    pub fn batch(steps: &[u32]) -> Vec<FileDescriptor> {
        steps
            .iter()
            .enumerate()
            .map(|(i, step)| descriptor(&format!("row-{}", i), *step))
            .collect()
    }
}

//! Mock completion store for testing.

use chrono::{NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::completion::{CompletionError, CompletionRecord, CompletionStore};
use crate::forecast::FileDescriptor;

/// Mock implementation of the CompletionStore trait.
///
/// Unlike the SQLite store, marking an unregistered row succeeds, so tests
/// only need to register rows when they inspect records.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionStore {
    /// Records by row ID.
    records: Arc<Mutex<BTreeMap<String, CompletionRecord>>>,
    /// Row IDs passed to `mark_processed`, in call order.
    marked: Arc<Mutex<Vec<String>>>,
    /// If set, the next `mark_processed` will fail with this error.
    next_error: Arc<Mutex<Option<CompletionError>>>,
}

impl MockCompletionStore {
    /// Create a new mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the row IDs marked so far.
    pub fn recorded_marks(&self) -> Vec<String> {
        self.marked.lock().unwrap().clone()
    }

    /// Get the number of `mark_processed` calls that succeeded.
    pub fn mark_count(&self) -> usize {
        self.marked.lock().unwrap().len()
    }

    /// Configure the next `mark_processed` to fail with the given error.
    pub fn set_next_error(&self, error: CompletionError) {
        *self.next_error.lock().unwrap() = Some(error);
    }
}

impl CompletionStore for MockCompletionStore {
    fn mark_processed(&self, row_id: &str) -> Result<(), CompletionError> {
        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }

        if let Some(record) = self.records.lock().unwrap().get_mut(row_id) {
            if !record.processed {
                record.processed = true;
                record.processed_at = Some(Utc::now());
            }
        }
        self.marked.lock().unwrap().push(row_id.to_string());
        Ok(())
    }

    fn register(&self, descriptor: &FileDescriptor) -> Result<(), CompletionError> {
        self.records
            .lock()
            .unwrap()
            .entry(descriptor.row_id.clone())
            .or_insert_with(|| CompletionRecord {
                descriptor: descriptor.clone(),
                processed: false,
                processed_at: None,
            });
        Ok(())
    }

    fn get(&self, row_id: &str) -> Result<Option<CompletionRecord>, CompletionError> {
        Ok(self.records.lock().unwrap().get(row_id).cloned())
    }

    fn list_run(
        &self,
        forecast_ref_time: NaiveDateTime,
    ) -> Result<Vec<FileDescriptor>, CompletionError> {
        let mut descriptors: Vec<FileDescriptor> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.descriptor.forecast_ref_time == forecast_ref_time)
            .map(|r| r.descriptor.clone())
            .collect();
        descriptors.sort_by_key(|d| d.step);
        Ok(descriptors)
    }
}

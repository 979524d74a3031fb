//! Completion store trait and types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::forecast::FileDescriptor;

/// Error type for completion store operations.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// No record exists for the row.
    #[error("Completion record not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for CompletionError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// One input file known to the completion store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    /// File the record tracks.
    pub descriptor: FileDescriptor,
    /// Whether the file's timestep has been processed.
    pub processed: bool,
    /// When the record was marked processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

/// Durable record of which input rows have been processed.
///
/// `mark_processed` must be durable once it returns `Ok`. Marking a row that
/// is already processed succeeds and keeps the original timestamp.
pub trait CompletionStore: Send + Sync {
    /// Marks the row as processed.
    fn mark_processed(&self, row_id: &str) -> Result<(), CompletionError>;

    /// Records a new, unprocessed input file. Existing rows are left untouched.
    fn register(&self, descriptor: &FileDescriptor) -> Result<(), CompletionError>;

    /// Gets a record by row ID.
    fn get(&self, row_id: &str) -> Result<Option<CompletionRecord>, CompletionError>;

    /// Lists the descriptors of one forecast run, ordered by step.
    fn list_run(
        &self,
        forecast_ref_time: NaiveDateTime,
    ) -> Result<Vec<FileDescriptor>, CompletionError>;
}

impl<T: CompletionStore + ?Sized> CompletionStore for Arc<T> {
    fn mark_processed(&self, row_id: &str) -> Result<(), CompletionError> {
        (**self).mark_processed(row_id)
    }

    fn register(&self, descriptor: &FileDescriptor) -> Result<(), CompletionError> {
        (**self).register(descriptor)
    }

    fn get(&self, row_id: &str) -> Result<Option<CompletionRecord>, CompletionError> {
        (**self).get(row_id)
    }

    fn list_run(
        &self,
        forecast_ref_time: NaiveDateTime,
    ) -> Result<Vec<FileDescriptor>, CompletionError> {
        (**self).list_run(forecast_ref_time)
    }
}

//! Completion tracking: which input rows have been fully processed.

mod sqlite_store;
mod store;

pub use sqlite_store::SqliteCompletionStore;
pub use store::{CompletionError, CompletionRecord, CompletionStore};

//! SQLite-backed completion store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::forecast::FileDescriptor;

use super::{CompletionError, CompletionRecord, CompletionStore};

/// Storage format of reference times.
const REF_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// SQLite-backed completion store.
pub struct SqliteCompletionStore {
    conn: Mutex<Connection>,
}

impl SqliteCompletionStore {
    /// Create a new store, creating the database file and table if needed.
    pub fn new(path: &Path) -> Result<Self, CompletionError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, CompletionError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CompletionError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS processed_files (
                row_id TEXT PRIMARY KEY,
                forecast_ref_time TEXT NOT NULL,
                step INTEGER NOT NULL,
                key TEXT NOT NULL,
                processed INTEGER NOT NULL DEFAULT 0,
                processed_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_processed_files_run
                ON processed_files(forecast_ref_time, step);
            "#,
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, CompletionError> {
        self.conn
            .lock()
            .map_err(|_| CompletionError::Database("connection lock poisoned".to_string()))
    }

    fn parse_ref_time(text: &str) -> rusqlite::Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text, REF_TIME_FORMAT).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
    }

    fn row_to_descriptor(row: &rusqlite::Row) -> rusqlite::Result<FileDescriptor> {
        let row_id: String = row.get(0)?;
        let ref_time: String = row.get(1)?;
        let step: u32 = row.get(2)?;
        let key: String = row.get(3)?;

        Ok(FileDescriptor {
            row_id,
            forecast_ref_time: Self::parse_ref_time(&ref_time)?,
            step,
            key,
        })
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<CompletionRecord> {
        let descriptor = Self::row_to_descriptor(row)?;
        let processed: bool = row.get(4)?;
        let processed_at: Option<String> = row.get(5)?;

        let processed_at = processed_at.and_then(|text| {
            DateTime::parse_from_rfc3339(&text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        });

        Ok(CompletionRecord {
            descriptor,
            processed,
            processed_at,
        })
    }
}

impl CompletionStore for SqliteCompletionStore {
    fn mark_processed(&self, row_id: &str) -> Result<(), CompletionError> {
        let conn = self.lock()?;

        let updated = conn.execute(
            "UPDATE processed_files SET processed = 1, processed_at = COALESCE(processed_at, ?) WHERE row_id = ?",
            params![Utc::now().to_rfc3339(), row_id],
        )?;

        if updated == 0 {
            return Err(CompletionError::NotFound(row_id.to_string()));
        }
        debug!(row_id, "Marked row as processed");
        Ok(())
    }

    fn register(&self, descriptor: &FileDescriptor) -> Result<(), CompletionError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR IGNORE INTO processed_files (row_id, forecast_ref_time, step, key) VALUES (?, ?, ?, ?)",
            params![
                descriptor.row_id,
                descriptor.forecast_ref_time.format(REF_TIME_FORMAT).to_string(),
                descriptor.step,
                descriptor.key,
            ],
        )?;
        Ok(())
    }

    fn get(&self, row_id: &str) -> Result<Option<CompletionRecord>, CompletionError> {
        let conn = self.lock()?;

        let record = conn
            .query_row(
                "SELECT row_id, forecast_ref_time, step, key, processed, processed_at FROM processed_files WHERE row_id = ?",
                params![row_id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn list_run(
        &self,
        forecast_ref_time: NaiveDateTime,
    ) -> Result<Vec<FileDescriptor>, CompletionError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT row_id, forecast_ref_time, step, key FROM processed_files WHERE forecast_ref_time = ? ORDER BY step ASC",
        )?;
        let descriptors = stmt
            .query_map(
                params![forecast_ref_time.format(REF_TIME_FORMAT).to_string()],
                Self::row_to_descriptor,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    #[test]
    fn test_register_and_get() {
        let store = SqliteCompletionStore::in_memory().unwrap();
        let descriptor = fixtures::descriptor("row-1", 6);

        store.register(&descriptor).unwrap();
        let record = store.get("row-1").unwrap().unwrap();

        assert_eq!(record.descriptor, descriptor);
        assert!(!record.processed);
        assert!(record.processed_at.is_none());
    }

    #[test]
    fn test_get_unknown_row() {
        let store = SqliteCompletionStore::in_memory().unwrap();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_mark_processed_is_idempotent() {
        let store = SqliteCompletionStore::in_memory().unwrap();
        store.register(&fixtures::descriptor("row-1", 6)).unwrap();

        store.mark_processed("row-1").unwrap();
        let first = store.get("row-1").unwrap().unwrap();
        assert!(first.processed);
        assert!(first.processed_at.is_some());

        store.mark_processed("row-1").unwrap();
        let second = store.get("row-1").unwrap().unwrap();
        assert!(second.processed);
        assert_eq!(first.processed_at, second.processed_at);
    }

    #[test]
    fn test_sub_second_reference_time_round_trips() {
        let store = SqliteCompletionStore::in_memory().unwrap();
        let ref_time = fixtures::ref_time() + chrono::Duration::milliseconds(250);
        let descriptor = FileDescriptor::new("row-1", ref_time, 6, "ifs/a_006");
        store.register(&descriptor).unwrap();
        store.register(&fixtures::descriptor("row-2", 6)).unwrap();

        assert_eq!(store.get("row-1").unwrap().unwrap().descriptor, descriptor);
        assert_eq!(store.list_run(ref_time).unwrap(), vec![descriptor]);

        let whole = store.list_run(fixtures::ref_time()).unwrap();
        assert_eq!(whole.len(), 1);
        assert_eq!(whole[0].row_id, "row-2");
    }

    #[test]
    fn test_whole_second_reference_time_stored_without_fraction() {
        let store = SqliteCompletionStore::in_memory().unwrap();
        store.register(&fixtures::descriptor("row-1", 0)).unwrap();

        let stored: String = store
            .lock()
            .unwrap()
            .query_row(
                "SELECT forecast_ref_time FROM processed_files WHERE row_id = 'row-1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, "2024-03-01T00:00:00");
    }

    #[test]
    fn test_mark_unknown_row_fails() {
        let store = SqliteCompletionStore::in_memory().unwrap();
        let result = store.mark_processed("missing");
        assert!(matches!(result, Err(CompletionError::NotFound(id)) if id == "missing"));
    }

    #[test]
    fn test_register_keeps_existing_row() {
        let store = SqliteCompletionStore::in_memory().unwrap();
        let descriptor = fixtures::descriptor("row-1", 6);
        store.register(&descriptor).unwrap();
        store.mark_processed("row-1").unwrap();

        store.register(&descriptor).unwrap();
        assert!(store.get("row-1").unwrap().unwrap().processed);
    }

    #[test]
    fn test_list_run_filters_by_reference_time() {
        let store = SqliteCompletionStore::in_memory().unwrap();
        for descriptor in fixtures::batch(&[6, 0, 3]) {
            store.register(&descriptor).unwrap();
        }
        let mut other_run = fixtures::descriptor("other", 0);
        other_run.forecast_ref_time += chrono::Duration::hours(6);
        store.register(&other_run).unwrap();

        let run = store.list_run(fixtures::ref_time()).unwrap();
        let steps: Vec<u32> = run.iter().map(|d| d.step).collect();
        assert_eq!(steps, vec![0, 3, 6]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flexprep.db");

        {
            let store = SqliteCompletionStore::new(&path).unwrap();
            store.register(&fixtures::descriptor("row-1", 3)).unwrap();
            store.mark_processed("row-1").unwrap();
        }

        let store = SqliteCompletionStore::new(&path).unwrap();
        assert!(store.get("row-1").unwrap().unwrap().processed);
    }
}

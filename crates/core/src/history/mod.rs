//! Sync run history - one record per synchronization run.

mod sqlite;
mod types;

pub use sqlite::SqliteHistoryStore;
pub use types::*;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    NotFound(i64),
}

/// Trait for sync history storage.
pub trait HistoryStore: Send + Sync {
    /// Create a record for a starting run, returns the assigned id.
    ///
    /// The record is created with status `running` and the current time.
    fn create(&self, total_items: i64) -> Result<i64, HistoryError>;

    /// Apply a partial update to a run record. Only the populated fields
    /// of the update are written.
    fn update(&self, id: i64, update: &SyncRunUpdate) -> Result<(), HistoryError>;

    /// The most recent runs, newest first.
    fn recent(&self, limit: u32) -> Result<Vec<SyncRun>, HistoryError>;

    /// The most recent run, if any.
    fn latest(&self) -> Result<Option<SyncRun>, HistoryError>;

    /// Distinct run dates (UTC, `YYYY-MM-DD`) with per-date run counts,
    /// newest first.
    fn dates(&self) -> Result<Vec<DateCount>, HistoryError>;

    /// All runs started on the given date (UTC, `YYYY-MM-DD`), newest first.
    fn by_date(&self, date: &str) -> Result<Vec<SyncRun>, HistoryError>;
}

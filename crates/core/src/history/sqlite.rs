//! SQLite-backed sync history store.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, Row};

use super::{DateCount, HistoryError, HistoryStore, RunStatus, SyncRun, SyncRunUpdate};

/// SQLite-backed sync history store.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Create a new SQLite history store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, HistoryError> {
        let conn = Connection::open(path).map_err(|e| HistoryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite history store (useful for testing).
    pub fn in_memory() -> Result<Self, HistoryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| HistoryError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), HistoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sync_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at INTEGER NOT NULL,
                finished_at INTEGER,
                total_items INTEGER NOT NULL,
                matched_items INTEGER NOT NULL DEFAULT 0,
                failed_items INTEGER NOT NULL DEFAULT 0,
                already_present INTEGER NOT NULL DEFAULT 0,
                films_added INTEGER NOT NULL DEFAULT 0,
                documentaries_added INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL,
                error_message TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_sync_history_started ON sync_history(started_at);
            "#,
        )
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        Ok(())
    }

    /// Build the SET clause from the populated fields of a typed update.
    fn build_set_clause(update: &SyncRunUpdate) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut assignments = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(matched) = update.matched_items {
            assignments.push("matched_items = ?");
            params.push(Box::new(matched));
        }

        if let Some(failed) = update.failed_items {
            assignments.push("failed_items = ?");
            params.push(Box::new(failed));
        }

        if let Some(already) = update.already_present {
            assignments.push("already_present = ?");
            params.push(Box::new(already));
        }

        if let Some(films) = update.films_added {
            assignments.push("films_added = ?");
            params.push(Box::new(films));
        }

        if let Some(docs) = update.documentaries_added {
            assignments.push("documentaries_added = ?");
            params.push(Box::new(docs));
        }

        if let Some(status) = update.status {
            assignments.push("status = ?");
            params.push(Box::new(status.as_str().to_string()));
        }

        if let Some(ref message) = update.error_message {
            assignments.push("error_message = ?");
            params.push(Box::new(message.clone()));
        }

        if let Some(finished) = update.finished_at {
            assignments.push("finished_at = ?");
            params.push(Box::new(finished));
        }

        (assignments.join(", "), params)
    }

    fn row_to_run(row: &Row) -> rusqlite::Result<SyncRun> {
        let status_str: String = row.get(9)?;

        Ok(SyncRun {
            id: row.get(0)?,
            started_at: row.get(1)?,
            finished_at: row.get(2)?,
            total_items: row.get(3)?,
            matched_items: row.get(4)?,
            failed_items: row.get(5)?,
            already_present: row.get(6)?,
            films_added: row.get(7)?,
            documentaries_added: row.get(8)?,
            status: RunStatus::parse(&status_str).unwrap_or(RunStatus::Error),
            error_message: row.get(10)?,
        })
    }

    const SELECT_COLUMNS: &'static str = "id, started_at, finished_at, total_items, \
         matched_items, failed_items, already_present, films_added, documentaries_added, \
         status, error_message";
}

impl HistoryStore for SqliteHistoryStore {
    fn create(&self, total_items: i64) -> Result<i64, HistoryError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sync_history (started_at, total_items, status) VALUES (?, ?, ?)",
            params![
                Utc::now().timestamp_millis(),
                total_items,
                RunStatus::Running.as_str()
            ],
        )
        .map_err(|e| HistoryError::Database(e.to_string()))?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, id: i64, update: &SyncRunUpdate) -> Result<(), HistoryError> {
        if update.is_empty() {
            return Ok(());
        }

        let (set_clause, mut params) = Self::build_set_clause(update);
        params.push(Box::new(id));
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let sql = format!("UPDATE sync_history SET {} WHERE id = ?", set_clause);

        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(&sql, param_refs.as_slice())
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        if affected == 0 {
            return Err(HistoryError::NotFound(id));
        }
        Ok(())
    }

    fn recent(&self, limit: u32) -> Result<Vec<SyncRun>, HistoryError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM sync_history ORDER BY started_at DESC, id DESC LIMIT ?",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], Self::row_to_run)
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row.map_err(|e| HistoryError::Database(e.to_string()))?);
        }
        Ok(runs)
    }

    fn latest(&self) -> Result<Option<SyncRun>, HistoryError> {
        Ok(self.recent(1)?.into_iter().next())
    }

    fn dates(&self) -> Result<Vec<DateCount>, HistoryError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT DATE(started_at / 1000, 'unixepoch') as date, COUNT(*) as count
                 FROM sync_history
                 GROUP BY date
                 ORDER BY date DESC",
            )
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(DateCount {
                    date: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let mut dates = Vec::new();
        for row in rows {
            dates.push(row.map_err(|e| HistoryError::Database(e.to_string()))?);
        }
        Ok(dates)
    }

    fn by_date(&self, date: &str) -> Result<Vec<SyncRun>, HistoryError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM sync_history
             WHERE DATE(started_at / 1000, 'unixepoch') = ?
             ORDER BY started_at DESC, id DESC",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![date], Self::row_to_run)
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row.map_err(|e| HistoryError::Database(e.to_string()))?);
        }
        Ok(runs)
    }
}

//! SQLite-backed catalog implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::warn;

use super::{CatalogEntry, CatalogError, CatalogKind, CatalogQuery, CatalogStore, MediaKind};

/// SQLite-backed movie catalog.
pub struct SqliteCatalog {
    conn: Mutex<Connection>,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path).map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn =
            Connection::open_in_memory().map_err(|e| CatalogError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- One row per catalogued release (keyed by feed source identity)
            CREATE TABLE IF NOT EXISTS catalog_entries (
                source_id TEXT PRIMARY KEY,
                imdb_id TEXT,
                tmdb_id TEXT,
                catalog_kind TEXT NOT NULL,
                media_kind TEXT NOT NULL,
                title TEXT NOT NULL,
                year TEXT,
                poster_url TEXT,
                backdrop_url TEXT,
                overview TEXT,
                genre_ids TEXT,
                release_name TEXT NOT NULL,
                added_at INTEGER NOT NULL,
                vote_average REAL
            );

            CREATE INDEX IF NOT EXISTS idx_catalog_entries_kind ON catalog_entries(catalog_kind);
            CREATE INDEX IF NOT EXISTS idx_catalog_entries_imdb ON catalog_entries(imdb_id);
            CREATE INDEX IF NOT EXISTS idx_catalog_entries_added ON catalog_entries(added_at);
            "#,
        )
        .map_err(|e| CatalogError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_entry(row: &Row) -> rusqlite::Result<CatalogEntry> {
        let kind_str: String = row.get(3)?;
        let media_str: String = row.get(4)?;
        let genre_json: Option<String> = row.get(10)?;

        Ok(CatalogEntry {
            source_id: row.get(0)?,
            imdb_id: row.get(1)?,
            tmdb_id: row.get(2)?,
            catalog_kind: CatalogKind::parse(&kind_str).unwrap_or(CatalogKind::Film),
            media_kind: MediaKind::parse(&media_str).unwrap_or_default(),
            title: row.get(5)?,
            year: row.get(6)?,
            poster_url: row.get(7)?,
            backdrop_url: row.get(8)?,
            overview: row.get(9)?,
            genre_ids: genre_json
                .and_then(|j| serde_json::from_str(&j).ok())
                .unwrap_or_default(),
            release_name: row.get(11)?,
            added_at: row.get(12)?,
            vote_average: row.get(13)?,
        })
    }

    const SELECT_COLUMNS: &'static str = "source_id, imdb_id, tmdb_id, catalog_kind, media_kind, \
         title, year, poster_url, backdrop_url, overview, genre_ids, release_name, added_at, \
         vote_average";
}

impl CatalogStore for SqliteCatalog {
    fn exists(&self, source_id: &str) -> Result<bool, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let exists: bool = conn
            .query_row(
                "SELECT 1 FROM catalog_entries WHERE source_id = ?",
                params![source_id],
                |_| Ok(true),
            )
            .unwrap_or(false);
        Ok(exists)
    }

    fn upsert(&self, entry: &CatalogEntry) -> bool {
        // source id, title and release name are required for both dedup
        // and display; an entry missing any of them is rejected.
        if entry.source_id.is_empty() || entry.title.is_empty() || entry.release_name.is_empty() {
            warn!(
                source_id = %entry.source_id,
                title = %entry.title,
                "Rejecting catalog entry with missing required fields"
            );
            return false;
        }

        let genre_json = serde_json::to_string(&entry.genre_ids).unwrap_or_else(|_| "[]".into());

        let conn = self.conn.lock().unwrap();
        let result = conn.execute(
            "INSERT OR REPLACE INTO catalog_entries
             (source_id, imdb_id, tmdb_id, catalog_kind, media_kind, title, year,
              poster_url, backdrop_url, overview, genre_ids, release_name, added_at, vote_average)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.source_id,
                entry.imdb_id,
                entry.tmdb_id,
                entry.catalog_kind.as_str(),
                entry.media_kind.as_str(),
                entry.title,
                entry.year,
                entry.poster_url,
                entry.backdrop_url,
                entry.overview,
                genre_json,
                entry.release_name,
                entry.added_at,
                entry.vote_average,
            ],
        );

        match result {
            Ok(_) => true,
            Err(e) => {
                warn!(source_id = %entry.source_id, error = %e, "Failed to store catalog entry");
                false
            }
        }
    }

    fn list(&self, query: &CatalogQuery) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.conn.lock().unwrap();

        let rows: Vec<rusqlite::Result<CatalogEntry>> = if let Some(ref term) = query.search {
            let pattern = format!("%{}%", term);
            let sql = format!(
                "SELECT {} FROM catalog_entries
                 WHERE catalog_kind = ? AND imdb_id IS NOT NULL
                   AND (title LIKE ? OR release_name LIKE ?)
                 ORDER BY added_at DESC LIMIT ? OFFSET ?",
                Self::SELECT_COLUMNS
            );
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| CatalogError::Database(e.to_string()))?;
            let rows: Vec<rusqlite::Result<CatalogEntry>> = stmt
                .query_map(
                    params![query.kind.as_str(), pattern, pattern, query.limit, query.offset],
                    Self::row_to_entry,
                )
                .map_err(|e| CatalogError::Database(e.to_string()))?
                .collect();
            rows
        } else {
            let sql = format!(
                "SELECT {} FROM catalog_entries
                 WHERE catalog_kind = ? AND imdb_id IS NOT NULL
                 ORDER BY added_at DESC LIMIT ? OFFSET ?",
                Self::SELECT_COLUMNS
            );
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| CatalogError::Database(e.to_string()))?;
            let rows: Vec<rusqlite::Result<CatalogEntry>> = stmt
                .query_map(
                    params![query.kind.as_str(), query.limit, query.offset],
                    Self::row_to_entry,
                )
                .map_err(|e| CatalogError::Database(e.to_string()))?
                .collect();
            rows
        };

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(entries)
    }

    fn count(&self, kind: CatalogKind) -> Result<u64, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let count: u64 = conn
            .query_row(
                "SELECT COUNT(*) FROM catalog_entries
                 WHERE catalog_kind = ? AND imdb_id IS NOT NULL",
                params![kind.as_str()],
                |row| row.get(0),
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(count)
    }

    fn recent(&self, kind: CatalogKind, n: u32) -> Result<Vec<CatalogEntry>, CatalogError> {
        let conn = self.conn.lock().unwrap();
        let sql = format!(
            "SELECT {} FROM catalog_entries
             WHERE catalog_kind = ? AND imdb_id IS NOT NULL
             ORDER BY added_at DESC LIMIT ?",
            Self::SELECT_COLUMNS
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![kind.as_str(), n], Self::row_to_entry)
            .map_err(|e| CatalogError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| CatalogError::Database(e.to_string()))?);
        }
        Ok(entries)
    }

    fn prune_older_than(&self, days: u32) -> Result<usize, CatalogError> {
        let cutoff = Utc::now().timestamp_millis() - i64::from(days) * 24 * 60 * 60 * 1000;
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute(
                "DELETE FROM catalog_entries WHERE added_at < ?",
                params![cutoff],
            )
            .map_err(|e| CatalogError::Database(e.to_string()))?;
        Ok(deleted)
    }
}

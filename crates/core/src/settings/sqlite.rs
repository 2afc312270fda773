//! SQLite-backed settings store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection};

use super::{SettingsError, SettingsStore, SyncSettings};

/// SQLite-backed settings store.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
}

impl SqliteSettingsStore {
    /// Open a settings store, creating the table and seeding defaults if needed.
    pub fn new(path: &Path) -> Result<Self, SettingsError> {
        let conn = Connection::open(path).map_err(|e| SettingsError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory settings store (useful for testing).
    pub fn in_memory() -> Result<Self, SettingsError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SettingsError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), SettingsError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;

        // Seed defaults so the dashboard always sees every key. Existing
        // values are left untouched.
        let defaults = SyncSettings::default().to_map();
        let mut stmt = conn
            .prepare("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .map_err(|e| SettingsError::Database(e.to_string()))?;
        for (key, value) in &defaults {
            stmt.execute(params![key, value])
                .map_err(|e| SettingsError::Database(e.to_string()))?;
        }

        Ok(())
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(SettingsError::Database(other.to_string())),
            })?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;
        Ok(())
    }

    fn all(&self) -> Result<HashMap<String, String>, SettingsError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT key, value FROM settings")
            .map_err(|e| SettingsError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| SettingsError::Database(e.to_string()))?;

        let mut map = HashMap::new();
        for row in rows {
            let (key, value) = row.map_err(|e| SettingsError::Database(e.to_string()))?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn set_many(&self, values: &HashMap<String, String>) -> Result<(), SettingsError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
            .map_err(|e| SettingsError::Database(e.to_string()))?;
        for (key, value) in values {
            stmt.execute(params![key, value])
                .map_err(|e| SettingsError::Database(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::types::keys;

    fn create_test_store() -> SqliteSettingsStore {
        SqliteSettingsStore::in_memory().unwrap()
    }

    #[test]
    fn test_defaults_seeded() {
        let store = create_test_store();
        let all = store.all().unwrap();
        assert_eq!(all.get(keys::METADATA_LANGUAGE).unwrap(), "en-US");
        assert_eq!(all.get(keys::SYNC_INTERVAL_MINUTES).unwrap(), "180");
        assert_eq!(all.get(keys::AUTO_SYNC_ENABLED).unwrap(), "false");
        assert_eq!(all.get(keys::FEED_URL).unwrap(), "");
    }

    #[test]
    fn test_set_and_get() {
        let store = create_test_store();
        store.set(keys::FEED_URL, "https://feeds.example/rss").unwrap();
        assert_eq!(
            store.get(keys::FEED_URL).unwrap().as_deref(),
            Some("https://feeds.example/rss")
        );
    }

    #[test]
    fn test_get_unknown_key_returns_none() {
        let store = create_test_store();
        assert!(store.get("no_such_key").unwrap().is_none());
    }

    #[test]
    fn test_set_many() {
        let store = create_test_store();
        let mut values = HashMap::new();
        values.insert(keys::FEED_URL.to_string(), "https://x".to_string());
        values.insert(keys::METADATA_API_KEY.to_string(), "k".to_string());
        store.set_many(&values).unwrap();

        assert_eq!(store.get(keys::FEED_URL).unwrap().as_deref(), Some("https://x"));
        assert_eq!(store.get(keys::METADATA_API_KEY).unwrap().as_deref(), Some("k"));
    }

    #[test]
    fn test_load_typed_view() {
        let store = create_test_store();
        store.set(keys::AUTO_SYNC_ENABLED, "true").unwrap();
        store.set(keys::SYNC_INTERVAL_MINUTES, "45").unwrap();

        let settings = store.load().unwrap();
        assert!(settings.auto_sync_enabled);
        assert_eq!(settings.sync_interval_minutes, 45);
    }

    #[test]
    fn test_reseeding_preserves_existing_values() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("settings.db");

        {
            let store = SqliteSettingsStore::new(&db_path).unwrap();
            store.set(keys::FEED_URL, "https://keep.example/rss").unwrap();
        }

        // Re-opening runs the seeding pass again; values must survive.
        let store = SqliteSettingsStore::new(&db_path).unwrap();
        assert_eq!(
            store.get(keys::FEED_URL).unwrap().as_deref(),
            Some("https://keep.example/rss")
        );
    }
}

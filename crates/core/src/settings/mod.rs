//! Operator settings - persisted key/value storage with a typed view.
//!
//! Settings are stored as strings in a `settings` table so the dashboard
//! can patch individual keys, but the rest of the system only ever sees
//! the strongly-typed [`SyncSettings`] struct. Conversion to and from the
//! string map happens exclusively at this boundary.

mod sqlite;
mod types;

pub use sqlite::SqliteSettingsStore;
pub use types::*;

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: String, reason: String },
}

/// Trait for settings storage.
pub trait SettingsStore: Send + Sync {
    /// Get a single raw value.
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    /// Set a single raw value.
    fn set(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Get all raw key/value pairs.
    fn all(&self) -> Result<HashMap<String, String>, SettingsError>;

    /// Set several raw values at once.
    fn set_many(&self, values: &HashMap<String, String>) -> Result<(), SettingsError>;

    /// Load the typed settings view from the current raw values.
    fn load(&self) -> Result<SyncSettings, SettingsError> {
        Ok(SyncSettings::from_map(&self.all()?))
    }
}

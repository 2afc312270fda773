use serde::Serialize;

use crate::catalog::CatalogEntry;
use crate::history::RunStatus;

/// Aggregate statistics of a finished run, as handed to notification sinks.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub status: RunStatus,
    pub films_added: i64,
    pub documentaries_added: i64,
    pub total_films: u64,
    pub total_documentaries: u64,
    pub matched: u64,
    pub failed: u64,
    pub duration_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Install URL for the listing manifest, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_url: Option<String>,
    /// Most recent additions per kind, populated only for enhanced
    /// notifications and only when something was added.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent_films: Vec<CatalogEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recent_documentaries: Vec<CatalogEntry>,
}

impl SyncReport {
    /// A minimal error report.
    pub fn for_error(message: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            status: RunStatus::Error,
            films_added: 0,
            documentaries_added: 0,
            total_films: 0,
            total_documentaries: 0,
            matched: 0,
            failed: 0,
            duration_secs,
            error_message: Some(message.into()),
            manifest_url: None,
            recent_films: Vec::new(),
            recent_documentaries: Vec::new(),
        }
    }
}

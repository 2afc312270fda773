use serde::{Deserialize, Serialize};

/// Terminal or in-flight state of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "running" => Some(RunStatus::Running),
            "completed" => Some(RunStatus::Completed),
            "error" => Some(RunStatus::Error),
            _ => None,
        }
    }
}

/// A persisted sync run record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRun {
    pub id: i64,
    /// Run start, epoch milliseconds.
    pub started_at: i64,
    /// Run end, epoch milliseconds. Absent while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<i64>,
    pub total_items: i64,
    pub matched_items: i64,
    pub failed_items: i64,
    pub already_present: i64,
    pub films_added: i64,
    pub documentaries_added: i64,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Typed partial update for a run record.
///
/// Only populated fields are written; the update is applied as a single
/// statement.
#[derive(Debug, Clone, Default)]
pub struct SyncRunUpdate {
    pub matched_items: Option<i64>,
    pub failed_items: Option<i64>,
    pub already_present: Option<i64>,
    pub films_added: Option<i64>,
    pub documentaries_added: Option<i64>,
    pub status: Option<RunStatus>,
    pub error_message: Option<String>,
    pub finished_at: Option<i64>,
}

impl SyncRunUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(mut self, matched: i64, failed: i64, already_present: i64) -> Self {
        self.matched_items = Some(matched);
        self.failed_items = Some(failed);
        self.already_present = Some(already_present);
        self
    }

    pub fn with_added(mut self, films: i64, documentaries: i64) -> Self {
        self.films_added = Some(films);
        self.documentaries_added = Some(documentaries);
        self
    }

    pub fn with_status(mut self, status: RunStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_finished_at(mut self, finished_at: i64) -> Self {
        self.finished_at = Some(finished_at);
        self
    }

    /// Whether the update carries any field at all.
    pub fn is_empty(&self) -> bool {
        self.matched_items.is_none()
            && self.failed_items.is_none()
            && self.already_present.is_none()
            && self.films_added.is_none()
            && self.documentaries_added.is_none()
            && self.status.is_none()
            && self.error_message.is_none()
            && self.finished_at.is_none()
    }
}

/// A distinct run date with its run count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateCount {
    /// UTC date, `YYYY-MM-DD`.
    pub date: String,
    pub count: i64,
}

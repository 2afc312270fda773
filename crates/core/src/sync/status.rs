//! Live run status, polled by external observers.

use serde::{Deserialize, Serialize};

/// Stage of the current or most recent run.
///
/// `NoItems` is a terminal outcome of its own: the feeds answered but
/// carried nothing, which is neither a completed run nor a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStage {
    #[default]
    Idle,
    Starting,
    Fetching,
    Matching,
    Completed,
    NoItems,
    Failed,
}

/// Snapshot of the live run state.
///
/// Single writer (the run task), many readers; readers get an
/// eventually-consistent copy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    pub running: bool,
    pub stage: SyncStage,
    /// Items processed so far.
    pub progress: usize,
    /// Total items in this run, known once fetching finished.
    pub total: usize,
    pub matched: u64,
    pub failed: u64,
    pub already_present: u64,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub films_added: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentaries_added: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncStatus {
    /// Fresh status for a starting run.
    pub(crate) fn starting() -> Self {
        Self {
            running: true,
            stage: SyncStage::Starting,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_idle() {
        let status = SyncStatus::default();
        assert!(!status.running);
        assert_eq!(status.stage, SyncStage::Idle);
        assert!(!status.completed);
        assert!(status.error.is_none());
    }

    #[test]
    fn test_stage_serialization() {
        assert_eq!(
            serde_json::to_string(&SyncStage::NoItems).unwrap(),
            "\"no_items\""
        );
        assert_eq!(
            serde_json::to_string(&SyncStage::Fetching).unwrap(),
            "\"fetching\""
        );
    }

    #[test]
    fn test_status_serialization_skips_absent_fields() {
        let status = SyncStatus::starting();
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"running\":true"));
        assert!(!json.contains("error"));
        assert!(!json.contains("films_added"));
    }
}

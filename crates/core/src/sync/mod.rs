//! Sync orchestration.
//!
//! Drives one end-to-end run - fetch, match, persist, history, notify -
//! and owns the run state machine: `idle -> running -> {completed | no
//! items | failed}`. Only one run may be active at a time; a second start
//! request is rejected, never queued.

mod scheduler;
mod service;
mod status;

pub use scheduler::SyncScheduler;
pub use service::SyncService;
pub use status::{SyncStage, SyncStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A run is already active. Synchronous rejection, not queued.
    #[error("A synchronization is already running")]
    AlreadyRunning,

    /// A required setting is absent.
    #[error("Missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Settings error: {0}")]
    Settings(#[from] crate::settings::SettingsError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),

    #[error("History error: {0}")]
    History(#[from] crate::history::HistoryError),
}

//! Run-outcome notifications.
//!
//! Delivery failures are reported to the caller as errors but are expected
//! to be logged and swallowed there - a broken webhook must never affect a
//! sync run's outcome.

mod types;
mod webhook;

pub use types::SyncReport;
pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification request failed: {0}")]
    Request(String),

    #[error("Notification endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Settings error: {0}")]
    Settings(String),
}

/// Trait for a sink receiving run outcome reports.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a run report. A disabled or unconfigured sink is a no-op.
    async fn notify(&self, report: &SyncReport) -> Result<(), NotifyError>;
}

//! Mock notification sink for testing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::notify::{NotificationSink, NotifyError, SyncReport};

/// Mock implementation of [`NotificationSink`] recording every report.
pub struct MockNotificationSink {
    reports: Arc<RwLock<Vec<SyncReport>>>,
    fail_next: AtomicBool,
}

impl Default for MockNotificationSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotificationSink {
    pub fn new() -> Self {
        Self {
            reports: Arc::new(RwLock::new(Vec::new())),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Make the next delivery fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// All reports received so far.
    pub async fn reports(&self) -> Vec<SyncReport> {
        self.reports.read().await.clone()
    }
}

#[async_trait]
impl NotificationSink for MockNotificationSink {
    async fn notify(&self, report: &SyncReport) -> Result<(), NotifyError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(NotifyError::Status(500));
        }
        self.reports.write().await.push(report.clone());
        Ok(())
    }
}

//! Mock feed source for testing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::feed::{FeedSource, ReleaseDescriptor};

/// Mock implementation of [`FeedSource`].
///
/// Returns a configurable descriptor list, optionally after a delay (used
/// to keep a sync run in flight while tests assert on concurrent starts).
pub struct MockFeedSource {
    descriptors: Arc<RwLock<Vec<ReleaseDescriptor>>>,
    delay: Arc<RwLock<Duration>>,
    fetch_count: Arc<RwLock<u32>>,
}

impl Default for MockFeedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFeedSource {
    pub fn new() -> Self {
        Self {
            descriptors: Arc::new(RwLock::new(Vec::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            fetch_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Set the descriptors returned by the next fetches.
    pub async fn set_descriptors(&self, descriptors: Vec<ReleaseDescriptor>) {
        *self.descriptors.write().await = descriptors;
    }

    /// Delay each fetch by the given duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Number of fetches made so far.
    pub async fn fetch_count(&self) -> u32 {
        *self.fetch_count.read().await
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    async fn fetch_all(&self) -> Vec<ReleaseDescriptor> {
        *self.fetch_count.write().await += 1;
        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.descriptors.read().await.clone()
    }
}

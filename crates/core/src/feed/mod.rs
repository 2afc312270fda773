//! RSS feed fetching.
//!
//! Turns the configured feed sources into a flat list of release
//! descriptors. A failing source never aborts the whole pass: it logs and
//! contributes nothing.

mod fetcher;
mod types;

pub use fetcher::FeedFetcher;
pub use types::*;

use async_trait::async_trait;

/// Trait for a source of release descriptors.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse every configured feed.
    ///
    /// Never fails: per-source errors are logged and skipped. The result
    /// preserves fetch order across sources (primary feed first).
    async fn fetch_all(&self) -> Vec<ReleaseDescriptor>;
}

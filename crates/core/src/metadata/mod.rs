//! Metadata matching.
//!
//! Resolves release descriptors to canonical movie metadata through an
//! external search provider, with bounded retry on rate limits, and drives
//! whole batches against the catalog store.

mod matcher;
mod retry;
mod tmdb;
mod types;

pub use matcher::{BatchOutcome, BatchProgress, ReleaseMatcher, INTER_ITEM_DELAY};
pub use retry::{retry_on_rate_limit, RetryPolicy};
pub use tmdb::TmdbProvider;
pub use types::*;

use async_trait::async_trait;

/// Trait for a movie metadata search provider.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search for a movie by title, optionally filtered by year.
    ///
    /// Returns the provider's top-ranked result, or `None` when nothing
    /// matched or no API key is configured. Errors only for transport
    /// failures, including rate-limit retry exhaustion.
    async fn search_movie(
        &self,
        title: &str,
        year: Option<&str>,
    ) -> Result<Option<MovieMatch>, ProviderError>;
}

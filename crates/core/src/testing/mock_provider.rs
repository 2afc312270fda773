//! Mock metadata provider for testing.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::metadata::{MetadataProvider, MovieMatch, ProviderError};

/// A recorded search for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedSearch {
    pub title: String,
    pub year: Option<String>,
}

/// Mock implementation of [`MetadataProvider`].
///
/// Matches are keyed by exact title; unknown titles resolve to `None`.
/// Titles registered via [`fail_query`](Self::fail_query) error with
/// retry exhaustion, mimicking a persistent rate limit.
pub struct MockMetadataProvider {
    matches: Arc<RwLock<HashMap<String, MovieMatch>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
}

impl Default for MockMetadataProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMetadataProvider {
    pub fn new() -> Self {
        Self {
            matches: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Register a match for a title.
    pub async fn add_match(&self, title: &str, movie: MovieMatch) {
        self.matches.write().await.insert(title.to_string(), movie);
    }

    /// Make searches for a title fail with a transport error.
    pub async fn fail_query(&self, title: &str) {
        self.failing.write().await.insert(title.to_string());
    }

    /// All searches made so far.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }
}

#[async_trait]
impl MetadataProvider for MockMetadataProvider {
    async fn search_movie(
        &self,
        title: &str,
        year: Option<&str>,
    ) -> Result<Option<MovieMatch>, ProviderError> {
        self.searches.write().await.push(RecordedSearch {
            title: title.to_string(),
            year: year.map(str::to_string),
        });

        if self.failing.read().await.contains(title) {
            return Err(ProviderError::RetriesExhausted(3));
        }

        Ok(self.matches.read().await.get(title).cloned())
    }
}

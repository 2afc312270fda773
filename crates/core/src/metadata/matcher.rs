//! Batch matching of release descriptors against the catalog.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogEntry, CatalogStore};
use crate::feed::ReleaseDescriptor;

use super::{MetadataProvider, ProviderError};

/// Pause between items that issued a network call, to stay under the
/// provider's request-rate ceiling (~30 req/s).
pub const INTER_ITEM_DELAY: Duration = Duration::from_millis(33);

/// Running totals reported after every processed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// Items processed so far, including this one.
    pub current: usize,
    pub total: usize,
    pub matched: u64,
    pub failed: u64,
    pub already_present: u64,
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Successfully matched items, including already-present ones.
    pub matched: u64,
    pub failed: u64,
    pub already_present: u64,
    /// Entries written to the catalog by this batch.
    pub new_entries: Vec<CatalogEntry>,
}

/// Sequential batch driver: resolves descriptors one by one and persists
/// the matches.
///
/// Sequential on purpose - the provider enforces a global per-key rate
/// limit, so parallel fan-out would only produce more 429s.
pub struct ReleaseMatcher {
    provider: Arc<dyn MetadataProvider>,
    catalog: Arc<dyn CatalogStore>,
    inter_item_delay: Duration,
}

impl ReleaseMatcher {
    pub fn new(provider: Arc<dyn MetadataProvider>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            provider,
            catalog,
            inter_item_delay: INTER_ITEM_DELAY,
        }
    }

    /// Override the inter-item delay (tests use zero).
    pub fn with_inter_item_delay(mut self, delay: Duration) -> Self {
        self.inter_item_delay = delay;
        self
    }

    /// Resolve a single descriptor to a catalog entry.
    ///
    /// `None` means no usable match (no result, or a result without a
    /// cross-reference id). Errors are transport failures only.
    pub async fn match_release(
        &self,
        descriptor: &ReleaseDescriptor,
    ) -> Result<Option<CatalogEntry>, ProviderError> {
        let matched = self
            .provider
            .search_movie(&descriptor.clean_name, descriptor.year.as_deref())
            .await?;

        let Some(movie) = matched else {
            return Ok(None);
        };

        let Some(imdb_id) = movie.imdb_id else {
            debug!(
                title = %movie.title,
                "Match has no cross-reference id, treating as unmatched"
            );
            return Ok(None);
        };

        Ok(Some(CatalogEntry {
            source_id: descriptor.source_id.clone(),
            imdb_id: Some(imdb_id),
            tmdb_id: Some(movie.provider_id.to_string()),
            catalog_kind: descriptor.catalog_kind,
            media_kind: descriptor.media_kind,
            title: movie.title,
            year: movie.year,
            poster_url: movie.poster_url,
            backdrop_url: movie.backdrop_url,
            overview: movie.overview,
            genre_ids: movie.genre_ids,
            release_name: descriptor.release_name.clone(),
            added_at: Utc::now().timestamp_millis(),
            vote_average: movie.vote_average,
        }))
    }

    /// Process a whole descriptor list sequentially.
    ///
    /// One item's failure never aborts the rest. Re-running the same list
    /// is idempotent: already-catalogued source ids are counted
    /// matched+already-present without a network call.
    pub async fn match_batch(
        &self,
        descriptors: &[ReleaseDescriptor],
        mut on_progress: impl FnMut(&BatchProgress) + Send,
    ) -> BatchOutcome {
        let total = descriptors.len();
        let mut outcome = BatchOutcome::default();
        info!(total, "Starting batch match");

        for (i, descriptor) in descriptors.iter().enumerate() {
            let mut issued_network_call = false;

            if descriptor.source_id.is_empty() || descriptor.clean_name.is_empty() {
                warn!(
                    release_name = %descriptor.release_name,
                    "Descriptor missing source id or clean name, counting as failed"
                );
                outcome.failed += 1;
            } else {
                match self.catalog.exists(&descriptor.source_id) {
                    Err(e) => {
                        warn!(source_id = %descriptor.source_id, error = %e, "Existence check failed");
                        outcome.failed += 1;
                    }
                    Ok(true) => {
                        outcome.matched += 1;
                        outcome.already_present += 1;
                    }
                    Ok(false) => {
                        issued_network_call = true;
                        match self.match_release(descriptor).await {
                            Err(e) => {
                                warn!(
                                    clean_name = %descriptor.clean_name,
                                    error = %e,
                                    "Match failed, continuing with next item"
                                );
                                outcome.failed += 1;
                            }
                            Ok(None) => {
                                debug!(clean_name = %descriptor.clean_name, "No match");
                                outcome.failed += 1;
                            }
                            Ok(Some(entry)) => {
                                if self.catalog.upsert(&entry) {
                                    debug!(
                                        clean_name = %descriptor.clean_name,
                                        imdb_id = entry.imdb_id.as_deref().unwrap_or(""),
                                        "Matched"
                                    );
                                    outcome.matched += 1;
                                    outcome.new_entries.push(entry);
                                } else {
                                    outcome.failed += 1;
                                }
                            }
                        }
                    }
                }
            }

            on_progress(&BatchProgress {
                current: i + 1,
                total,
                matched: outcome.matched,
                failed: outcome.failed,
                already_present: outcome.already_present,
            });

            // Delay only between network-issuing items, skipped after the
            // final one.
            if issued_network_call && i + 1 < total && !self.inter_item_delay.is_zero() {
                sleep(self.inter_item_delay).await;
            }
        }

        info!(
            matched = outcome.matched,
            failed = outcome.failed,
            already_present = outcome.already_present,
            "Batch match finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogKind, CatalogQuery, SqliteCatalog};
    use crate::testing::{fixtures, MockMetadataProvider};

    fn matcher(
        provider: Arc<MockMetadataProvider>,
        catalog: Arc<SqliteCatalog>,
    ) -> ReleaseMatcher {
        ReleaseMatcher::new(provider, catalog).with_inter_item_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_match_batch_happy_path() {
        let provider = Arc::new(MockMetadataProvider::new());
        provider
            .add_match("Some Movie", fixtures::movie_match(603, "tt0133093", "Some Movie"))
            .await;
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());

        let descriptors = vec![fixtures::descriptor("src-1", "Some Movie")];
        let outcome = matcher(provider, Arc::clone(&catalog))
            .match_batch(&descriptors, |_| {})
            .await;

        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.failed, 0);
        assert_eq!(outcome.already_present, 0);
        assert_eq!(outcome.new_entries.len(), 1);
        assert!(catalog.exists("src-1").unwrap());
    }

    #[tokio::test]
    async fn test_match_batch_is_idempotent() {
        let provider = Arc::new(MockMetadataProvider::new());
        provider
            .add_match("Movie A", fixtures::movie_match(1, "tt0000001", "Movie A"))
            .await;
        provider
            .add_match("Movie B", fixtures::movie_match(2, "tt0000002", "Movie B"))
            .await;
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());

        let descriptors = vec![
            fixtures::descriptor("src-a", "Movie A"),
            fixtures::descriptor("src-b", "Movie B"),
        ];

        let m = matcher(Arc::clone(&provider), Arc::clone(&catalog));
        let first = m.match_batch(&descriptors, |_| {}).await;
        assert_eq!(first.matched, 2);
        assert_eq!(first.already_present, 0);

        let second = m.match_batch(&descriptors, |_| {}).await;
        assert_eq!(second.matched, 2);
        assert_eq!(second.already_present, first.matched);
        assert!(second.new_entries.is_empty());

        // no extra rows, and no extra provider calls on the second run
        assert_eq!(catalog.count(CatalogKind::Film).unwrap(), 2);
        assert_eq!(provider.recorded_searches().await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_descriptors_fail_without_network() {
        let provider = Arc::new(MockMetadataProvider::new());
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());

        let mut no_source = fixtures::descriptor("", "Movie A");
        no_source.source_id = String::new();
        let mut no_clean_name = fixtures::descriptor("src-b", "");
        no_clean_name.clean_name = String::new();

        let outcome = matcher(Arc::clone(&provider), catalog)
            .match_batch(&[no_source, no_clean_name], |_| {})
            .await;

        assert_eq!(outcome.failed, 2);
        assert!(provider.recorded_searches().await.is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_and_missing_canonical_id_count_failed() {
        let provider = Arc::new(MockMetadataProvider::new());
        // "No Canonical" resolves but carries no imdb id
        let mut without_imdb = fixtures::movie_match(9, "", "No Canonical");
        without_imdb.imdb_id = None;
        provider.add_match("No Canonical", without_imdb).await;
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());

        let descriptors = vec![
            fixtures::descriptor("src-1", "Unknown Movie"),
            fixtures::descriptor("src-2", "No Canonical"),
        ];
        let outcome = matcher(provider, Arc::clone(&catalog))
            .match_batch(&descriptors, |_| {})
            .await;

        assert_eq!(outcome.matched, 0);
        assert_eq!(outcome.failed, 2);
        // nothing was written
        assert!(!catalog.exists("src-1").unwrap());
        assert!(!catalog.exists("src-2").unwrap());
    }

    #[tokio::test]
    async fn test_provider_error_isolated_per_item() {
        let provider = Arc::new(MockMetadataProvider::new());
        provider.fail_query("Broken Movie").await;
        provider
            .add_match("Good Movie", fixtures::movie_match(5, "tt0000005", "Good Movie"))
            .await;
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());

        let descriptors = vec![
            fixtures::descriptor("src-broken", "Broken Movie"),
            fixtures::descriptor("src-good", "Good Movie"),
        ];
        let outcome = matcher(provider, Arc::clone(&catalog))
            .match_batch(&descriptors, |_| {})
            .await;

        // the failing item did not abort the batch
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.matched, 1);
        assert!(catalog.exists("src-good").unwrap());
    }

    #[tokio::test]
    async fn test_progress_reported_after_every_item() {
        let provider = Arc::new(MockMetadataProvider::new());
        provider
            .add_match("Movie A", fixtures::movie_match(1, "tt0000001", "Movie A"))
            .await;
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());

        // one matched, one invalid, one already present
        catalog.upsert(&fixtures::catalog_entry("src-present", "Seen Before"));
        let mut invalid = fixtures::descriptor("", "X");
        invalid.source_id = String::new();

        let descriptors = vec![
            fixtures::descriptor("src-a", "Movie A"),
            invalid,
            fixtures::descriptor("src-present", "Seen Before"),
        ];

        let mut snapshots = Vec::new();
        let outcome = matcher(provider, catalog)
            .match_batch(&descriptors, |p| snapshots.push(*p))
            .await;

        assert_eq!(snapshots.len(), 3);
        assert_eq!(snapshots[0].current, 1);
        assert_eq!(snapshots[2].current, 3);
        assert_eq!(snapshots[2].total, 3);
        assert_eq!(snapshots[2].matched, 2);
        assert_eq!(snapshots[2].failed, 1);
        assert_eq!(snapshots[2].already_present, 1);
        assert_eq!(outcome.already_present, 1);
    }

    #[tokio::test]
    async fn test_write_failure_counts_failed() {
        let provider = Arc::new(MockMetadataProvider::new());
        // the match comes back with an empty title, which the store rejects
        let mut unstorable = fixtures::movie_match(7, "tt0000007", "");
        unstorable.title = String::new();
        provider.add_match("Ghost Title", unstorable).await;
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());

        let outcome = matcher(provider, Arc::clone(&catalog))
            .match_batch(&[fixtures::descriptor("src-1", "Ghost Title")], |_| {})
            .await;

        assert_eq!(outcome.matched, 0);
        assert_eq!(outcome.failed, 1);
        assert!(catalog
            .list(&CatalogQuery::new(CatalogKind::Film))
            .unwrap()
            .is_empty());
    }
}

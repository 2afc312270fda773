//! Sync run lifecycle integration tests.
//!
//! These tests drive complete runs through the public API over a
//! file-backed database: fetch -> match -> persist -> history -> notify.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use cinefeed_core::{
    testing::{fixtures, MockFeedSource, MockMetadataProvider, MockNotificationSink},
    CatalogKind, CatalogQuery, CatalogStore, HistoryStore, ReleaseMatcher, RunStatus,
    SettingsStore, SqliteCatalog, SqliteHistoryStore, SqliteSettingsStore, SyncService, SyncStage,
};

/// Test helper wiring every collaborator over one temp database.
struct TestHarness {
    service: Arc<SyncService>,
    settings: Arc<SqliteSettingsStore>,
    catalog: Arc<SqliteCatalog>,
    history: Arc<SqliteHistoryStore>,
    feeds: Arc<MockFeedSource>,
    provider: Arc<MockMetadataProvider>,
    notifier: Arc<MockNotificationSink>,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let settings =
            Arc::new(SqliteSettingsStore::new(&db_path).expect("Failed to create settings store"));
        settings.set("feed_url", "https://feeds.example/rss").unwrap();
        settings.set("metadata_api_key", "key123").unwrap();

        let catalog = Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));
        let history =
            Arc::new(SqliteHistoryStore::new(&db_path).expect("Failed to create history store"));
        let feeds = Arc::new(MockFeedSource::new());
        let provider = Arc::new(MockMetadataProvider::new());
        let notifier = Arc::new(MockNotificationSink::new());

        let matcher = ReleaseMatcher::new(
            Arc::clone(&provider) as _,
            Arc::clone(&catalog) as _,
        )
        .with_inter_item_delay(Duration::ZERO);

        let service = Arc::new(SyncService::new(
            Arc::clone(&settings) as _,
            Arc::clone(&catalog) as _,
            Arc::clone(&history) as _,
            Arc::clone(&feeds) as _,
            matcher,
            Arc::clone(&notifier) as _,
        ));

        Self {
            service,
            settings,
            catalog,
            history,
            feeds,
            provider,
            notifier,
            _temp_dir: temp_dir,
        }
    }

    async fn run_to_completion(&self) {
        self.service.start().expect("start should be accepted");
        for _ in 0..500 {
            if !self.service.is_running() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("sync run did not finish in time");
    }
}

#[tokio::test]
async fn test_full_run_lifecycle() {
    let h = TestHarness::new();
    h.feeds
        .set_descriptors(vec![
            fixtures::descriptor("src-film", "Great Film"),
            fixtures::documentary_descriptor("src-doc", "Deep Oceans"),
            fixtures::descriptor("src-unmatched", "Nothing Known"),
        ])
        .await;
    h.provider
        .add_match("Great Film", fixtures::movie_match(1, "tt0000001", "Great Film"))
        .await;
    h.provider
        .add_match("Deep Oceans", fixtures::movie_match(2, "tt0000002", "Deep Oceans"))
        .await;

    h.run_to_completion().await;

    // live status reached the completed stage with final counts
    let status = h.service.status();
    assert_eq!(status.stage, SyncStage::Completed);
    assert_eq!(status.total, 3);
    assert_eq!(status.matched, 2);
    assert_eq!(status.failed, 1);

    // both kinds were persisted and are listable
    let films = h.catalog.list(&CatalogQuery::new(CatalogKind::Film)).unwrap();
    assert_eq!(films.len(), 1);
    assert_eq!(films[0].title, "Great Film");
    assert_eq!(films[0].imdb_id.as_deref(), Some("tt0000001"));
    assert_eq!(h.catalog.count(CatalogKind::Documentary).unwrap(), 1);

    // the history record is finalized
    let run = h.history.latest().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.total_items, 3);
    assert_eq!(run.matched_items, 2);
    assert_eq!(run.failed_items, 1);
    assert_eq!(run.films_added, 1);
    assert_eq!(run.documentaries_added, 1);
    assert!(run.finished_at.is_some());

    // the sink received the aggregate report
    let reports = h.notifier.reports().await;
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].total_films, 1);
    assert_eq!(reports[0].total_documentaries, 1);
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let h = TestHarness::new();
    h.feeds
        .set_descriptors(vec![
            fixtures::descriptor("src-1", "Movie One"),
            fixtures::descriptor("src-2", "Movie Two"),
        ])
        .await;
    h.provider
        .add_match("Movie One", fixtures::movie_match(1, "tt0000001", "Movie One"))
        .await;
    h.provider
        .add_match("Movie Two", fixtures::movie_match(2, "tt0000002", "Movie Two"))
        .await;

    h.run_to_completion().await;
    let first = h.service.status();
    h.run_to_completion().await;
    let second = h.service.status();

    // second run: everything already present, no new rows
    assert_eq!(second.already_present, first.matched);
    assert_eq!(second.films_added, Some(0));
    assert_eq!(h.catalog.count(CatalogKind::Film).unwrap(), 2);

    // the provider was only queried during the first run
    assert_eq!(h.provider.recorded_searches().await.len(), 2);

    // both runs are in the history
    assert_eq!(h.history.recent(10).unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_feed_leaves_no_history() {
    let h = TestHarness::new();

    h.run_to_completion().await;

    let status = h.service.status();
    assert_eq!(status.stage, SyncStage::NoItems);
    assert!(status.error.is_none());
    assert!(h.history.latest().unwrap().is_none());

    // a later run with items proceeds normally
    h.feeds
        .set_descriptors(vec![fixtures::descriptor("src-1", "Movie One")])
        .await;
    h.provider
        .add_match("Movie One", fixtures::movie_match(1, "tt0000001", "Movie One"))
        .await;
    h.run_to_completion().await;
    assert_eq!(h.service.status().stage, SyncStage::Completed);
}

#[tokio::test]
async fn test_concurrent_start_rejected() {
    let h = TestHarness::new();
    h.feeds.set_delay(Duration::from_millis(150)).await;
    h.feeds
        .set_descriptors(vec![fixtures::descriptor("src-1", "Movie One")])
        .await;

    h.service.start().unwrap();
    assert!(h.service.start().is_err());

    // wait out the first run
    for _ in 0..500 {
        if !h.service.is_running() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(h.feeds.fetch_count().await, 1);
}

#[tokio::test]
async fn test_settings_changes_apply_between_runs() {
    let h = TestHarness::new();
    h.feeds
        .set_descriptors(vec![fixtures::descriptor("src-1", "Movie One")])
        .await;
    h.provider
        .add_match("Movie One", fixtures::movie_match(1, "tt0000001", "Movie One"))
        .await;

    h.run_to_completion().await;

    // operator clears the API key: the next start is rejected synchronously
    h.settings.set("metadata_api_key", "").unwrap();
    assert!(h.service.start().is_err());
}

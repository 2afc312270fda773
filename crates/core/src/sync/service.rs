//! Sync run orchestration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::catalog::{CatalogKind, CatalogStore};
use crate::feed::FeedSource;
use crate::history::{HistoryStore, RunStatus, SyncRunUpdate};
use crate::metadata::ReleaseMatcher;
use crate::notify::{NotificationSink, SyncReport};
use crate::settings::SettingsStore;

use super::status::{SyncStage, SyncStatus};
use super::SyncError;

/// Recent entries attached to enhanced notifications, per kind.
const RECENT_PER_KIND: u32 = 5;

/// Orchestrates sync runs and owns the run state machine.
///
/// One instance per process. The `running` flag is the concurrency guard:
/// a start request while a run is active is rejected synchronously.
pub struct SyncService {
    settings: Arc<dyn SettingsStore>,
    catalog: Arc<dyn CatalogStore>,
    history: Arc<dyn HistoryStore>,
    feeds: Arc<dyn FeedSource>,
    matcher: ReleaseMatcher,
    notifier: Arc<dyn NotificationSink>,

    running: AtomicBool,
    status: RwLock<SyncStatus>,
    /// Manifest install URL for notifications, captured from the last
    /// start request.
    manifest_url: RwLock<Option<String>>,
}

impl SyncService {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        catalog: Arc<dyn CatalogStore>,
        history: Arc<dyn HistoryStore>,
        feeds: Arc<dyn FeedSource>,
        matcher: ReleaseMatcher,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            settings,
            catalog,
            history,
            feeds,
            matcher,
            notifier,
            running: AtomicBool::new(false),
            status: RwLock::new(SyncStatus::default()),
            manifest_url: RwLock::new(None),
        }
    }

    /// Whether a run is currently active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Snapshot of the live run state.
    pub fn status(&self) -> SyncStatus {
        self.status.read().unwrap().clone()
    }

    /// Remember the externally-visible manifest URL for notifications.
    pub fn set_manifest_url(&self, url: impl Into<String>) {
        *self.manifest_url.write().unwrap() = Some(url.into());
    }

    /// Start a run.
    ///
    /// Rejects synchronously when required settings are missing or a run
    /// is already active; otherwise spawns the run task and returns.
    pub fn start(self: &Arc<Self>) -> Result<(), SyncError> {
        let settings = self.settings.load()?;
        if settings.feed_url.trim().is_empty() {
            return Err(SyncError::MissingConfig("feed_url"));
        }
        if settings.metadata_api_key.is_empty() {
            return Err(SyncError::MissingConfig("metadata_api_key"));
        }

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SyncError::AlreadyRunning);
        }

        *self.status.write().unwrap() = SyncStatus::starting();
        info!("Synchronization started");

        let service = Arc::clone(self);
        tokio::spawn(async move {
            service.run().await;
            service.running.store(false, Ordering::SeqCst);
        });

        Ok(())
    }

    fn update_status(&self, apply: impl FnOnce(&mut SyncStatus)) {
        let mut status = self.status.write().unwrap();
        apply(&mut status);
    }

    async fn run(&self) {
        let started = Instant::now();
        let mut run_id: Option<i64> = None;

        if let Err(e) = self.execute(&mut run_id, started).await {
            error!(error = %e, "Synchronization failed");
            self.finalize_error(run_id, &e.to_string(), started).await;
        }
    }

    async fn execute(
        &self,
        run_id: &mut Option<i64>,
        started: Instant,
    ) -> Result<(), SyncError> {
        // Pre-run counts, needed to compute per-kind deltas afterwards.
        let films_before = self.catalog.count(CatalogKind::Film)?;
        let documentaries_before = self.catalog.count(CatalogKind::Documentary)?;

        self.update_status(|s| s.stage = SyncStage::Fetching);
        let descriptors = self.feeds.fetch_all().await;

        if descriptors.is_empty() {
            // Terminal outcome of its own, distinguishable from a failure,
            // and no history record: the run never had an item count.
            info!("No items found in feeds");
            self.update_status(|s| {
                s.running = false;
                s.stage = SyncStage::NoItems;
            });
            return Ok(());
        }

        let id = self.history.create(descriptors.len() as i64)?;
        *run_id = Some(id);

        info!(total = descriptors.len(), "Matching fetched releases");
        self.update_status(|s| {
            s.total = descriptors.len();
            s.stage = SyncStage::Matching;
        });

        let outcome = self
            .matcher
            .match_batch(&descriptors, |progress| {
                self.update_status(|s| {
                    s.progress = progress.current;
                    s.matched = progress.matched;
                    s.failed = progress.failed;
                    s.already_present = progress.already_present;
                });
            })
            .await;

        let films_after = self.catalog.count(CatalogKind::Film)?;
        let documentaries_after = self.catalog.count(CatalogKind::Documentary)?;
        let films_added = films_after as i64 - films_before as i64;
        let documentaries_added = documentaries_after as i64 - documentaries_before as i64;

        self.history.update(
            id,
            &SyncRunUpdate::new()
                .with_counts(
                    outcome.matched as i64,
                    outcome.failed as i64,
                    outcome.already_present as i64,
                )
                .with_added(films_added, documentaries_added)
                .with_status(RunStatus::Completed)
                .with_finished_at(Utc::now().timestamp_millis()),
        )?;

        self.update_status(|s| {
            s.running = false;
            s.stage = SyncStage::Completed;
            s.completed = true;
            s.films_added = Some(films_added);
            s.documentaries_added = Some(documentaries_added);
        });

        info!(
            matched = outcome.matched,
            failed = outcome.failed,
            films_added,
            documentaries_added,
            "Synchronization completed"
        );

        let report = self.build_completed_report(
            &outcome,
            films_added,
            documentaries_added,
            films_after,
            documentaries_after,
            started,
        );
        self.send_notification(report).await;

        Ok(())
    }

    fn build_completed_report(
        &self,
        outcome: &crate::metadata::BatchOutcome,
        films_added: i64,
        documentaries_added: i64,
        total_films: u64,
        total_documentaries: u64,
        started: Instant,
    ) -> SyncReport {
        let enhanced = self
            .settings
            .load()
            .map(|s| s.enhanced_notifications_enabled)
            .unwrap_or(false);

        let mut recent_films = Vec::new();
        let mut recent_documentaries = Vec::new();
        if enhanced && (films_added > 0 || documentaries_added > 0) {
            if films_added > 0 {
                recent_films = self
                    .catalog
                    .recent(CatalogKind::Film, RECENT_PER_KIND)
                    .unwrap_or_default();
            }
            if documentaries_added > 0 {
                recent_documentaries = self
                    .catalog
                    .recent(CatalogKind::Documentary, RECENT_PER_KIND)
                    .unwrap_or_default();
            }
        }

        SyncReport {
            status: RunStatus::Completed,
            films_added,
            documentaries_added,
            total_films,
            total_documentaries,
            matched: outcome.matched,
            failed: outcome.failed,
            duration_secs: started.elapsed().as_secs(),
            error_message: None,
            manifest_url: self.manifest_url.read().unwrap().clone(),
            recent_films,
            recent_documentaries,
        }
    }

    async fn finalize_error(&self, run_id: Option<i64>, message: &str, started: Instant) {
        if let Some(id) = run_id {
            let update = SyncRunUpdate::new()
                .with_status(RunStatus::Error)
                .with_error_message(message)
                .with_finished_at(Utc::now().timestamp_millis());
            if let Err(e) = self.history.update(id, &update) {
                warn!(run_id = id, error = %e, "Failed to finalize history record");
            }
        }

        self.update_status(|s| {
            s.running = false;
            s.stage = SyncStage::Failed;
            s.error = Some(message.to_string());
        });

        let mut report = SyncReport::for_error(message, started.elapsed().as_secs());
        report.manifest_url = self.manifest_url.read().unwrap().clone();
        self.send_notification(report).await;
    }

    /// Delivery failures are logged and swallowed; they never affect the
    /// run outcome.
    async fn send_notification(&self, report: SyncReport) {
        if let Err(e) = self.notifier.notify(&report).await {
            warn!(error = %e, "Notification delivery failed");
        }
    }
}

//! Recurring sync trigger.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::settings::SettingsStore;

use super::service::SyncService;
use super::SyncError;

/// Triggers sync runs on the operator-configured interval.
///
/// A tick while a run is active is skipped silently, never queued.
/// Restartable: settings changes take effect by calling [`restart`](Self::restart).
pub struct SyncScheduler {
    service: Arc<SyncService>,
    settings: Arc<dyn SettingsStore>,
    shutdown_tx: Mutex<Option<broadcast::Sender<()>>>,
}

impl SyncScheduler {
    pub fn new(service: Arc<SyncService>, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            service,
            settings,
            shutdown_tx: Mutex::new(None),
        }
    }

    /// Start the schedule from the current settings.
    ///
    /// Returns whether a schedule is now active (false when auto-sync is
    /// disabled or settings cannot be read).
    pub fn start(&self) -> bool {
        self.stop();

        let settings = match self.settings.load() {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to load settings, auto sync not scheduled");
                return false;
            }
        };

        if !settings.auto_sync_enabled {
            info!("Auto sync disabled");
            return false;
        }

        let interval = Duration::from_secs(u64::from(settings.sync_interval_minutes) * 60);
        let (tx, rx) = broadcast::channel(1);
        *self.shutdown_tx.lock().unwrap() = Some(tx);
        self.spawn_loop(interval, rx);

        info!(
            interval_minutes = settings.sync_interval_minutes,
            "Auto sync enabled"
        );
        true
    }

    fn spawn_loop(&self, interval: Duration, mut shutdown_rx: broadcast::Receiver<()>) {
        let service = Arc::clone(&self.service);

        tokio::spawn(async move {
            info!("Auto sync loop started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Auto sync loop received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if service.is_running() {
                            info!("Synchronization already in progress, skipping tick");
                            continue;
                        }
                        match service.start() {
                            Ok(()) => info!("Scheduled synchronization started"),
                            Err(SyncError::AlreadyRunning) => {
                                info!("Synchronization already in progress, skipping tick");
                            }
                            Err(e) => {
                                warn!(error = %e, "Scheduled synchronization not started");
                            }
                        }
                    }
                }
            }
            info!("Auto sync loop stopped");
        });
    }

    /// Stop the schedule, if one is active.
    pub fn stop(&self) {
        if let Some(tx) = self.shutdown_tx.lock().unwrap().take() {
            let _ = tx.send(());
        }
    }

    /// Re-read settings and start over. Used after settings changes.
    pub fn restart(&self) -> bool {
        self.start()
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

use std::sync::Arc;

use cinefeed_core::{
    CatalogStore, HistoryStore, SettingsStore, SyncScheduler, SyncService,
};

/// Shared application state
pub struct AppState {
    settings: Arc<dyn SettingsStore>,
    catalog: Arc<dyn CatalogStore>,
    history: Arc<dyn HistoryStore>,
    sync: Arc<SyncService>,
    scheduler: Arc<SyncScheduler>,
}

impl AppState {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        catalog: Arc<dyn CatalogStore>,
        history: Arc<dyn HistoryStore>,
        sync: Arc<SyncService>,
        scheduler: Arc<SyncScheduler>,
    ) -> Self {
        Self {
            settings,
            catalog,
            history,
            sync,
            scheduler,
        }
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn catalog(&self) -> &dyn CatalogStore {
        self.catalog.as_ref()
    }

    pub fn history(&self) -> &dyn HistoryStore {
        self.history.as_ref()
    }

    pub fn sync(&self) -> &Arc<SyncService> {
        &self.sync
    }

    pub fn scheduler(&self) -> &SyncScheduler {
        &self.scheduler
    }
}

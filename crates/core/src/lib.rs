//! cinefeed-core: RSS-driven movie catalog synchronization.
//!
//! The pipeline: feed fetch -> release-name parsing -> metadata matching
//! (rate-limit aware) -> catalog deduplication/persistence -> run history
//! and notifications, orchestrated by [`sync::SyncService`].

pub mod addon;
pub mod catalog;
pub mod config;
pub mod feed;
pub mod history;
pub mod metadata;
pub mod notify;
pub mod release;
pub mod settings;
pub mod sync;
pub mod testing;
pub mod transport;

pub use addon::{handle_catalog, manifest, CatalogResponse, Manifest, MetaPreview};
pub use catalog::{
    CatalogEntry, CatalogError, CatalogKind, CatalogQuery, CatalogStore, MediaKind, SqliteCatalog,
};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError,
};
pub use feed::{FeedError, FeedFetcher, FeedSource, ReleaseDescriptor};
pub use history::{
    DateCount, HistoryError, HistoryStore, RunStatus, SqliteHistoryStore, SyncRun, SyncRunUpdate,
};
pub use metadata::{
    retry_on_rate_limit, MetadataProvider, MovieMatch, ProviderError, ReleaseMatcher, RetryPolicy,
    TmdbProvider,
};
pub use notify::{NotificationSink, NotifyError, SyncReport, WebhookNotifier};
pub use release::{parse, ParsedRelease};
pub use settings::{
    SanitizedSettings, SettingsError, SettingsStore, SqliteSettingsStore, SyncSettings,
};
pub use sync::{SyncError, SyncScheduler, SyncService, SyncStage, SyncStatus};

mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cinefeed_core::{
    load_config, load_config_or_default, validate_config, CatalogStore, FeedFetcher, FeedSource,
    HistoryStore, MetadataProvider, NotificationSink, ReleaseMatcher, SettingsStore,
    SqliteCatalog, SqliteHistoryStore, SqliteSettingsStore, SyncScheduler, SyncService,
    TmdbProvider, WebhookNotifier,
};

use api::create_router;
use state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration. An explicitly named file must exist; the default
    // location is optional.
    let config = match std::env::var("CINEFEED_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            load_config(&path)
                .with_context(|| format!("Failed to load config from {:?}", path))?
        }
        Err(_) => load_config_or_default(&PathBuf::from("config.toml"))
            .context("Failed to load configuration")?,
    };

    validate_config(&config).context("Configuration validation failed")?;
    info!("Database path: {:?}", config.database.path);

    // Make sure the database directory exists
    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }
    }

    // Stores (separate connections over the same database file)
    let settings: Arc<dyn SettingsStore> = Arc::new(
        SqliteSettingsStore::new(&config.database.path)
            .context("Failed to create settings store")?,
    );
    info!("Settings store initialized");

    let catalog: Arc<dyn CatalogStore> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to create catalog store")?,
    );
    info!("Catalog store initialized");

    let history: Arc<dyn HistoryStore> = Arc::new(
        SqliteHistoryStore::new(&config.database.path)
            .context("Failed to create history store")?,
    );
    info!("History store initialized");

    // Pipeline collaborators, all reading current settings per call
    let feeds: Arc<dyn FeedSource> = Arc::new(FeedFetcher::new(Arc::clone(&settings)));
    let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(Arc::clone(&settings)));
    let notifier: Arc<dyn NotificationSink> = Arc::new(WebhookNotifier::new(Arc::clone(&settings)));

    let matcher = ReleaseMatcher::new(Arc::clone(&provider), Arc::clone(&catalog));
    let sync = Arc::new(SyncService::new(
        Arc::clone(&settings),
        Arc::clone(&catalog),
        Arc::clone(&history),
        Arc::clone(&feeds),
        matcher,
        Arc::clone(&notifier),
    ));

    // Scheduler picks up the persisted auto-sync settings
    let scheduler = Arc::new(SyncScheduler::new(
        Arc::clone(&sync),
        Arc::clone(&settings),
    ));
    scheduler.start();

    // Create app state and router
    let state = Arc::new(AppState::new(
        settings,
        catalog,
        history,
        sync,
        Arc::clone(&scheduler),
    ));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);
    info!("Manifest: http://{}/manifest.json", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    scheduler.stop();

    Ok(())
}

/// Resolve when the process is asked to stop (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}

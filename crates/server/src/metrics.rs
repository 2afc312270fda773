//! Prometheus metrics for observability.
//!
//! Gauges are refreshed at scrape time from the stores and the live sync
//! status, so the endpoint always reflects current state.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};

use cinefeed_core::CatalogKind;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    registry
        .register(Box::new(CATALOG_ENTRIES.clone()))
        .unwrap();
    registry.register(Box::new(SYNC_RUNNING.clone())).unwrap();
    registry
        .register(Box::new(LAST_RUN_MATCHED.clone()))
        .unwrap();
    registry
        .register(Box::new(LAST_RUN_FAILED.clone()))
        .unwrap();
    registry
});

/// Listable catalog entries per kind.
pub static CATALOG_ENTRIES: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("cinefeed_catalog_entries", "Listable catalog entries"),
        &["kind"],
    )
    .unwrap()
});

/// Whether a sync run is currently active.
pub static SYNC_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("cinefeed_sync_running", "Whether a sync run is active").unwrap()
});

/// Matched items of the most recent run.
pub static LAST_RUN_MATCHED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinefeed_last_run_matched_items",
        "Matched items of the most recent sync run",
    )
    .unwrap()
});

/// Failed items of the most recent run.
pub static LAST_RUN_FAILED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "cinefeed_last_run_failed_items",
        "Failed items of the most recent sync run",
    )
    .unwrap()
});

/// Refresh all gauges and render the registry as Prometheus text.
pub fn render(state: &AppState) -> String {
    for kind in CatalogKind::all() {
        if let Ok(count) = state.catalog().count(kind) {
            CATALOG_ENTRIES
                .with_label_values(&[kind.as_str()])
                .set(count as i64);
        }
    }

    SYNC_RUNNING.set(i64::from(state.sync().is_running()));

    if let Ok(Some(run)) = state.history().latest() {
        LAST_RUN_MATCHED.set(run.matched_items);
        LAST_RUN_FAILED.set(run.failed_items);
    }

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

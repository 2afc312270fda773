//! Health, stats, metrics and maintenance handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use cinefeed_core::CatalogKind;

use super::ErrorResponse;
use crate::metrics;
use crate::state::AppState;

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub films: u64,
    pub documentaries: u64,
    pub total: u64,
}

/// GET /api/stats
pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let films = state.catalog().count(CatalogKind::Film);
    let documentaries = state.catalog().count(CatalogKind::Documentary);

    match (films, documentaries) {
        (Ok(films), Ok(documentaries)) => (
            StatusCode::OK,
            Json(StatsResponse {
                films,
                documentaries,
                total: films + documentaries,
            }),
        )
            .into_response(),
        (Err(e), _) | (_, Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct PruneParams {
    #[serde(default)]
    pub days: Option<u32>,
}

/// POST /api/catalog/prune
///
/// Age-based retention sweep over the catalog.
pub async fn prune_catalog(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PruneParams>,
) -> impl IntoResponse {
    let days = params.days.unwrap_or(30);
    match state.catalog().prune_older_than(days) {
        Ok(deleted) => (
            StatusCode::OK,
            Json(serde_json::json!({ "deleted": deleted })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    metrics::render(&state)
}

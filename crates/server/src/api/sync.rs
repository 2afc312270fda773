//! Sync control and history endpoints.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use cinefeed_core::SyncError;

use super::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

/// Reconstruct the externally-visible base URL from the request headers,
/// honoring reverse-proxy forwarding headers.
fn base_url(headers: &HeaderMap) -> Option<String> {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get("host"))
        .and_then(|v| v.to_str().ok())?;
    Some(format!("{}://{}", proto, host))
}

/// POST /api/sync
pub async fn start_sync(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(base) = base_url(&headers) {
        state
            .sync()
            .set_manifest_url(format!("{}/manifest.json", base));
    }

    match state.sync().start() {
        Ok(()) => (
            StatusCode::OK,
            Json(SuccessResponse::with_message("Synchronization started")),
        )
            .into_response(),
        Err(e @ SyncError::AlreadyRunning) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e @ SyncError::MissingConfig(_)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
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

/// GET /api/sync/status
pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.sync().status())
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /api/sync/history
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(3);
    match state.history().recent(limit) {
        Ok(runs) => (StatusCode::OK, Json(runs)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// GET /api/sync/history/dates
pub async fn get_history_dates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.history().dates() {
        Ok(dates) => (StatusCode::OK, Json(dates)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ByDateParams {
    #[serde(default)]
    pub date: Option<String>,
}

/// GET /api/sync/history/by-date
pub async fn get_history_by_date(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ByDateParams>,
) -> impl IntoResponse {
    let Some(date) = params.date else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Date required".to_string(),
            }),
        )
            .into_response();
    };

    match state.history().by_date(&date) {
        Ok(runs) => (StatusCode::OK, Json(runs)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

//! Operator settings endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use cinefeed_core::{SanitizedSettings, SyncSettings};

use super::{ErrorResponse, SuccessResponse};
use crate::state::AppState;

/// GET /api/settings
///
/// Secrets are redacted; the dashboard only learns whether they are set.
pub async fn get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.settings().load() {
        Ok(settings) => (StatusCode::OK, Json(SanitizedSettings::from(&settings))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// POST /api/settings
///
/// Accepts a partial key/value map. The merged settings pass through the
/// typed view, so malformed values are normalized and the interval clamp
/// applies before anything is persisted. The scheduler is restarted so a
/// changed interval or toggle takes effect immediately.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(changes): Json<HashMap<String, String>>,
) -> impl IntoResponse {
    let mut merged = match state.settings().all() {
        Ok(current) => current,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };
    merged.extend(changes);

    let normalized = SyncSettings::from_map(&merged).to_map();
    if let Err(e) = state.settings().set_many(&normalized) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    info!("Settings updated, restarting scheduler");
    state.scheduler().restart();

    (StatusCode::OK, Json(SuccessResponse::ok())).into_response()
}

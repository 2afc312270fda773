//! Listing-protocol endpoints consumed by the media-center client.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::error;

use cinefeed_core::addon;
use cinefeed_core::CatalogResponse;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CatalogParams {
    #[serde(default)]
    pub skip: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
}

/// GET /manifest.json
pub async fn get_manifest() -> Json<cinefeed_core::Manifest> {
    Json(addon::manifest())
}

/// GET /catalog/{type}/{id}
///
/// The client appends `.json` to the catalog id; tolerate both forms.
pub async fn get_catalog(
    State(state): State<Arc<AppState>>,
    Path((_media_type, id)): Path<(String, String)>,
    Query(params): Query<CatalogParams>,
) -> impl IntoResponse {
    let catalog_id = id.trim_end_matches(".json");
    let skip = params.skip.unwrap_or(0);

    match addon::handle_catalog(
        state.catalog(),
        catalog_id,
        skip,
        params.search.as_deref(),
    ) {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => {
            error!(catalog_id, error = %e, "Catalog listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CatalogResponse { metas: Vec::new() }),
            )
        }
    }
}

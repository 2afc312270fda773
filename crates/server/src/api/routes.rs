use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{catalog, handlers, settings, sync};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and stats
        .route("/health", get(handlers::health))
        .route("/stats", get(handlers::stats))
        // Sync control and history
        .route("/sync", post(sync::start_sync))
        .route("/sync/status", get(sync::get_status))
        .route("/sync/history", get(sync::get_history))
        .route("/sync/history/dates", get(sync::get_history_dates))
        .route("/sync/history/by-date", get(sync::get_history_by_date))
        // Operator settings
        .route("/settings", get(settings::get_settings))
        .route("/settings", post(settings::update_settings))
        // Catalog maintenance
        .route("/catalog/prune", post(handlers::prune_catalog));

    // The listing endpoints are served at the root with permissive CORS -
    // the media-center client calls them cross-origin.
    Router::new()
        .route("/manifest.json", get(catalog::get_manifest))
        .route("/catalog/{type}/{id}", get(catalog::get_catalog))
        .route("/metrics", get(handlers::metrics))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use cinefeed_core::testing::{
        fixtures, MockFeedSource, MockMetadataProvider, MockNotificationSink,
    };
    use cinefeed_core::{
        ReleaseMatcher, SqliteCatalog, SqliteHistoryStore, SqliteSettingsStore, SyncScheduler,
        SyncService,
    };

    fn test_state() -> Arc<AppState> {
        let settings = Arc::new(SqliteSettingsStore::in_memory().unwrap());
        let catalog = Arc::new(SqliteCatalog::in_memory().unwrap());
        let history = Arc::new(SqliteHistoryStore::in_memory().unwrap());

        let matcher = ReleaseMatcher::new(
            Arc::new(MockMetadataProvider::new()) as _,
            Arc::clone(&catalog) as _,
        )
        .with_inter_item_delay(Duration::ZERO);

        let sync = Arc::new(SyncService::new(
            Arc::clone(&settings) as _,
            Arc::clone(&catalog) as _,
            Arc::clone(&history) as _,
            Arc::new(MockFeedSource::new()) as _,
            matcher,
            Arc::new(MockNotificationSink::new()) as _,
        ));

        let scheduler = Arc::new(SyncScheduler::new(
            Arc::clone(&sync),
            Arc::clone(&settings) as _,
        ));

        Arc::new(AppState::new(
            settings,
            catalog,
            history,
            sync,
            scheduler,
        ))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_manifest() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/manifest.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["resources"][0], "catalog");
        assert_eq!(json["catalogs"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_catalog_listing_with_json_suffix() {
        let state = test_state();
        state
            .catalog()
            .upsert(&fixtures::catalog_entry("src-1", "Some Movie"));

        let app = create_router(state);
        let response = app
            .oneshot(
                Request::get("/catalog/movie/cinefeed_films.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let metas = json["metas"].as_array().unwrap();
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0]["name"], "Some Movie");
    }

    #[tokio::test]
    async fn test_catalog_search_param() {
        let state = test_state();
        state
            .catalog()
            .upsert(&fixtures::catalog_entry("src-1", "The Great Escape"));
        state
            .catalog()
            .upsert(&fixtures::catalog_entry("src-2", "Another Film"));

        let app = create_router(state);
        let response = app
            .oneshot(
                Request::get("/catalog/movie/cinefeed_films.json?search=escape")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["metas"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sync_start_without_config_is_rejected() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::post("/api/sync").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sync_status_idle() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/api/sync/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["running"], false);
        assert_eq!(json["stage"], "idle");
    }

    #[tokio::test]
    async fn test_stats() {
        let state = test_state();
        state
            .catalog()
            .upsert(&fixtures::catalog_entry("src-1", "Some Movie"));

        let app = create_router(state);
        let response = app
            .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["films"], 1);
        assert_eq!(json["documentaries"], 0);
        assert_eq!(json["total"], 1);
    }

    #[tokio::test]
    async fn test_settings_are_sanitized() {
        let state = test_state();
        state.settings().set("metadata_api_key", "secret").unwrap();

        let app = create_router(state);
        let response = app
            .oneshot(Request::get("/api/settings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let raw = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!raw.contains("secret"));
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["metadata_api_key_configured"], true);
    }

    #[tokio::test]
    async fn test_settings_update_persists_normalized_values() {
        let state = test_state();
        let app = create_router(Arc::clone(&state));

        let payload = serde_json::json!({
            "feed_url": "https://feeds.example/rss",
            "sync_interval_minutes": "1"
        });
        let response = app
            .oneshot(
                Request::post("/api/settings")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let settings = state.settings().load().unwrap();
        assert_eq!(settings.feed_url, "https://feeds.example/rss");
        // clamped to the minimum interval
        assert_eq!(settings.sync_interval_minutes, 5);
    }

    #[tokio::test]
    async fn test_history_by_date_requires_date() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::get("/api/sync/history/by-date")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("cinefeed_sync_running"));
    }
}

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build(state: Arc<AppState>, cors_allowed_origins: &[String]) -> Router {
    let cors = if cors_allowed_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(netmap_http_util::build_cors_allowed_origin(&origins))
    };

    Router::new()
        .route("/api/v1/netmap/netstat", post(handlers::handle_netstat))
        .route("/api/v1/netmap/status", post(handlers::handle_status))
        .route("/api/v1/netmap/tracert", post(handlers::handle_tracert))
        .route(
            "/api/v1/netmap/records",
            get(handlers::handle_get_records)
                .post(handlers::handle_post_records)
                .delete(handlers::handle_delete_records),
        )
        .route(
            "/api/v1/netmap/exceptions",
            get(handlers::handle_get_exceptions)
                .post(handlers::handle_post_exceptions)
                .delete(handlers::handle_delete_exceptions),
        )
        .route("/api/v1/netmap/webhook", post(handlers::handle_webhook))
        .route("/-/healthy", get(netmap_http_util::handle_liveness_check))
        .route(
            "/metrics",
            get({
                let state = Arc::clone(&state);
                move || {
                    let state = Arc::clone(&state);
                    async move { netmap_http_util::handle_prometheus(&state.metrics).await }
                }
            }),
        )
        .layer(CompressionLayer::new().gzip(true))
        .layer(RequestDecompressionLayer::new().gzip(true))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

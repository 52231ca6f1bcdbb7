//! Small axum handlers shared by every HTTP surface in the workspace.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use netmap_ore::metrics::MetricsRegistry;
use prometheus::Encoder;

/// Serves a basic liveness check response.
pub async fn handle_liveness_check() -> impl IntoResponse {
    (StatusCode::OK, "Liveness check successful!")
}

/// Serves metrics from the process-wide registry in Prometheus text format.
pub async fn handle_prometheus(registry: &MetricsRegistry) -> impl IntoResponse {
    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();
    if let Err(err) = encoder.encode(&registry.registry().gather(), &mut buffer) {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
    }
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    ))
}

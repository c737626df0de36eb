use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Health check endpoint for Docker/K8s liveness probes. The gateway has no
/// backing store, so liveness is unconditional.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "cursor-gateway-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

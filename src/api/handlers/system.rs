//! System endpoints: health check and live gateway stats.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    gateway_initialized: bool,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, and whether the WebSocket transport is up.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            gateway_initialized: state.gateway_handle.is_initialized(),
        }),
    )
}

/// Live connection and channel counts.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    connections: usize,
    channels: usize,
}

/// `GET /stats` — Number of live connections and non-empty channels.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "System",
    summary = "Gateway stats",
    responses(
        (status = 200, description = "Current counts", body = StatsResponse),
    )
)]
pub async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    let registry = state.gateway.registry();
    Json(StatsResponse {
        connections: registry.len().await,
        channels: registry.router().channel_count().await,
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

//! # posts-gateway
//!
//! Real-time WebSocket fan-out gateway for post notifications.
//!
//! Clients connect over WebSocket, authenticate with a bearer token, and
//! are placed in their personal `user_<id>` channel. They may subscribe to
//! individual `post_<id>` channels. The posts service reports updates and
//! deletions over HTTP, and the gateway pushes them to the matching
//! channel members. Delivery is best-effort and at-most-once.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket)          Posts service (HTTP)
//!     │                              │
//!     ├── WS Handler (ws/)           ├── REST Handlers (api/)
//!     │     └── AuthGate (auth/)     │
//!     │                              ├── EventBroadcaster (service/)
//!     │                              │
//!     └──────── ConnectionRegistry ──┴── ChannelRouter (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the full application router: REST API plus the `/posts`
/// WebSocket endpoint.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .route("/posts", get(ws::handler::ws_handler))
        .with_state(state)
}

/// Wraps an application router in the HTTP middleware stack: request
/// tracing, permissive CORS, and a request timeout answered with `408`.
pub fn with_http_layers(app: Router, request_timeout: Duration) -> Router {
    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                request_timeout,
            )),
    )
}

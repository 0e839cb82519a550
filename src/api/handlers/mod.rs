//! REST endpoint handlers organized by resource.

pub mod events;
pub mod system;

use axum::Router;
use axum::routing::get;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .route("/stats", get(system::stats_handler))
}

//! Axum WebSocket upgrade handler.

use std::collections::HashMap;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};

use super::connection::run_connection;
use super::session::ConnectionState;
use crate::app_state::AppState;
use crate::auth::HandshakeCredentials;
use crate::error::GatewayError;

/// `GET /posts` — Authenticate the handshake, then upgrade to WebSocket.
///
/// A missing or invalid credential is answered with `401` and the
/// connection is never upgraded or registered.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    tracing::debug!(state = %ConnectionState::Connecting, "ws handshake");
    let credentials = HandshakeCredentials::from_parts(&headers, &params);

    let principal = match state.gateway.authenticate(&credentials).await {
        Ok(principal) => principal,
        Err(failure) => return GatewayError::from(failure).into_response(),
    };

    let gateway = state.gateway;
    ws.on_upgrade(move |socket| async move {
        match gateway.activate(principal).await {
            Ok((session, outbox)) => run_connection(socket, session, outbox).await,
            Err(e) => tracing::error!(error = %e, "failed to activate connection"),
        }
    })
}

//! Publish endpoints called by the posts service after a mutation.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::domain::{PostEvent, PostEventKind, PublishRequest};
use crate::error::{ErrorResponse, GatewayError};
use crate::service::DeliveryReport;

/// `POST /events/post-updated` — Broadcast a post update.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the body is not a JSON
/// object, [`GatewayError::InvalidEvent`] if `id` or `userId` is missing,
/// or [`GatewayError::Configuration`] if the gateway is not initialized.
#[utoipa::path(
    post,
    path = "/api/v1/events/post-updated",
    tag = "Events",
    summary = "Broadcast a post update",
    description = "Delivers a POST_UPDATED frame to every connection subscribed to `post_<id>`.",
    request_body = PublishRequest,
    responses(
        (status = 202, description = "Event fanned out", body = DeliveryReport),
        (status = 400, description = "Malformed body, or missing id or userId", body = ErrorResponse),
        (status = 503, description = "Gateway not initialized", body = ErrorResponse),
    )
)]
pub async fn publish_post_updated(
    State(state): State<AppState>,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    publish(&state, PostEventKind::PostUpdated, body).await
}

/// `POST /events/post-deleted` — Broadcast a post deletion to its owner.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] if the body is not a JSON
/// object, [`GatewayError::InvalidEvent`] if `id` or `userId` is missing,
/// or [`GatewayError::Configuration`] if the gateway is not initialized.
#[utoipa::path(
    post,
    path = "/api/v1/events/post-deleted",
    tag = "Events",
    summary = "Broadcast a post deletion",
    description = "Delivers a POST_DELETED frame to the owner's `user_<userId>` channel.",
    request_body = PublishRequest,
    responses(
        (status = 202, description = "Event fanned out", body = DeliveryReport),
        (status = 400, description = "Malformed body, or missing id or userId", body = ErrorResponse),
        (status = 503, description = "Gateway not initialized", body = ErrorResponse),
    )
)]
pub async fn publish_post_deleted(
    State(state): State<AppState>,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    publish(&state, PostEventKind::PostDeleted, body).await
}

async fn publish(
    state: &AppState,
    kind: PostEventKind,
    body: Result<Json<PublishRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeliveryReport>), GatewayError> {
    let Json(req) = body.map_err(|rejection| {
        tracing::warn!(error = %rejection, event = kind.as_str(), "rejected publish body");
        GatewayError::InvalidRequest(rejection.body_text())
    })?;
    let event = PostEvent::from_request(kind, req).inspect_err(|e| {
        tracing::warn!(error = %e, event = kind.as_str(), "rejected publish");
    })?;
    let report = state.broadcaster.publish(event).await?;
    Ok((StatusCode::ACCEPTED, Json(report)))
}

/// Event publish routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/post-updated", post(publish_post_updated))
        .route("/events/post-deleted", post(publish_post_deleted))
}

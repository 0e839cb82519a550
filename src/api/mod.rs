//! REST API layer: publish endpoints, system endpoints, and OpenAPI docs.
//!
//! Resource endpoints are mounted under `/api/v1`.

pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::domain::{PostEventKind, PublishRequest};
use crate::error::{ErrorBody, ErrorResponse};
use crate::service::DeliveryReport;

/// OpenAPI document for the HTTP surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "posts-gateway", description = "Real-time post notification gateway"),
    paths(
        handlers::events::publish_post_updated,
        handlers::events::publish_post_deleted,
        handlers::system::health_handler,
        handlers::system::stats_handler,
    ),
    components(schemas(
        PublishRequest,
        DeliveryReport,
        PostEventKind,
        ErrorResponse,
        ErrorBody,
        handlers::system::HealthResponse,
        handlers::system::StatsResponse,
    )),
    tags(
        (name = "Events", description = "Post event publishing"),
        (name = "System", description = "Health and stats"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

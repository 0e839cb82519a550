//! posts-gateway server entry point.
//!
//! Starts the Axum HTTP server with the REST publish API and the `/posts`
//! WebSocket endpoint.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use posts_gateway::app_state::AppState;
use posts_gateway::auth::JwtVerifier;
use posts_gateway::config::{GatewayConfig, LogFormat};
use posts_gateway::{build_app, with_http_layers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting posts-gateway");

    // Build domain, auth, and service layers
    let verifier = Arc::new(JwtVerifier::new(config.jwt_secret.as_bytes()));
    let app_state = AppState::new(verifier, config.connection_buffer);

    // Build router
    let app = with_http_layers(
        build_app(app_state.clone()),
        Duration::from_secs(config.request_timeout_secs),
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    app_state.start_gateway()?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

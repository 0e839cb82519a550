//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::auth::{AuthGate, CredentialVerifier};
use crate::domain::{ChannelRouter, ConnectionRegistry, GatewayHandle};
use crate::service::EventBroadcaster;
use crate::ws::Gateway;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// WebSocket front-end: auth gate plus connection admission.
    pub gateway: Arc<Gateway>,
    /// Fans post events out to channel members.
    pub broadcaster: EventBroadcaster,
    /// Late-bound transport handle shared with the broadcaster.
    pub gateway_handle: GatewayHandle,
}

impl AppState {
    /// Wires the router, registry, gateway, and broadcaster together.
    ///
    /// The returned state's [`GatewayHandle`] is still uninitialized;
    /// call [`AppState::start_gateway`] once the transport is listening.
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>, outbox_capacity: usize) -> Self {
        let router = Arc::new(ChannelRouter::new());
        let registry = Arc::new(ConnectionRegistry::new(router));
        let gateway = Arc::new(Gateway::new(
            AuthGate::new(verifier),
            registry,
            outbox_capacity,
        ));
        let gateway_handle = GatewayHandle::new();
        Self {
            gateway,
            broadcaster: EventBroadcaster::new(gateway_handle.clone()),
            gateway_handle,
        }
    }

    /// Marks the WebSocket transport as live, enabling publishes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GatewayError::Configuration`] if called
    /// more than once.
    pub fn start_gateway(&self) -> Result<(), crate::error::GatewayError> {
        self.gateway_handle
            .initialize(Arc::clone(self.gateway.registry()))
    }
}

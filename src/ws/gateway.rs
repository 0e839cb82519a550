//! Connection admission: auth gate, registration, and auto-join.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::session::{ConnectionState, Session};
use crate::auth::{AuthFailure, AuthGate, HandshakeCredentials};
use crate::domain::{ChannelName, Connection, ConnectionRegistry, OutboundFrame, PrincipalId};
use crate::error::GatewayError;

/// Drives connections from handshake to `Active`.
///
/// Collaborators are injected at construction; the gateway owns no
/// global state.
#[derive(Debug, Clone)]
pub struct Gateway {
    auth: AuthGate,
    registry: Arc<ConnectionRegistry>,
    outbox_capacity: usize,
}

impl Gateway {
    /// Creates a gateway. `outbox_capacity` bounds each connection's
    /// queue of pending outbound frames.
    #[must_use]
    pub fn new(auth: AuthGate, registry: Arc<ConnectionRegistry>, outbox_capacity: usize) -> Self {
        Self {
            auth,
            registry,
            outbox_capacity: outbox_capacity.max(1),
        }
    }

    /// Returns the connection registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Runs the auth gate on a handshake.
    ///
    /// A rejected handshake leaves no trace in the registry or router.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthFailure`] reported by the gate.
    pub async fn authenticate(
        &self,
        credentials: &HandshakeCredentials,
    ) -> Result<PrincipalId, AuthFailure> {
        tracing::debug!(state = %ConnectionState::Authenticating, "verifying handshake");
        self.auth.authenticate(credentials).await.inspect_err(|failure| {
            tracing::warn!(%failure, state = %ConnectionState::Closed, "handshake rejected");
        })
    }

    /// Registers an authenticated connection and joins its personal
    /// channel.
    ///
    /// Returns the session together with the receiving end of the
    /// connection's outbox.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if registration fails.
    pub async fn activate(
        &self,
        principal: PrincipalId,
    ) -> Result<(Session, mpsc::Receiver<OutboundFrame>), GatewayError> {
        let (outbox, outbox_rx) = mpsc::channel(self.outbox_capacity);
        let connection = Connection::new(principal.clone(), outbox);
        let id = connection.id;
        self.registry.register(connection).await?;

        let user_channel = ChannelName::for_user(&principal);
        self.registry.router().join(id, &user_channel).await;
        tracing::info!(
            connection_id = %id,
            %principal,
            channel = %user_channel,
            state = %ConnectionState::Active,
            "connection active"
        );

        Ok((
            Session::new(id, principal, Arc::clone(&self.registry)),
            outbox_rx,
        ))
    }
}

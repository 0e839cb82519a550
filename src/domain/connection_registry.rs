//! Live connection table.
//!
//! [`ConnectionRegistry`] owns the push handle of every admitted
//! connection. Unregistering a connection first unwinds its channel
//! memberships through the shared [`ChannelRouter`], so no channel is ever
//! left pointing at a dead connection.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};

use super::{ChannelRouter, ConnectionId, PrincipalId};
use crate::error::GatewayError;

/// A serialized frame queued for delivery to one client.
pub type OutboundFrame = Arc<str>;

/// An admitted connection as stored in the registry.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Connection identifier (immutable).
    pub id: ConnectionId,
    /// Authenticated principal (immutable after admission).
    pub principal: PrincipalId,
    /// Push handle into the connection task's outbox.
    pub outbox: mpsc::Sender<OutboundFrame>,
    /// Admission timestamp.
    pub connected_at: DateTime<Utc>,
}

impl Connection {
    /// Builds a connection record with a fresh id.
    #[must_use]
    pub fn new(principal: PrincipalId, outbox: mpsc::Sender<OutboundFrame>) -> Self {
        Self {
            id: ConnectionId::new(),
            principal,
            outbox,
            connected_at: Utc::now(),
        }
    }
}

/// Read-only view of a registered connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    /// Connection identifier.
    pub id: ConnectionId,
    /// Authenticated principal.
    pub principal: PrincipalId,
    /// Admission timestamp.
    pub connected_at: DateTime<Utc>,
}

/// Table of live connections keyed by [`ConnectionId`].
///
/// A single `RwLock` guards the whole table; broadcast resolution takes
/// the read lock once per publish.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, Connection>>,
    router: Arc<ChannelRouter>,
}

impl ConnectionRegistry {
    /// Creates an empty registry bound to the given router.
    #[must_use]
    pub fn new(router: Arc<ChannelRouter>) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            router,
        }
    }

    /// Returns the router this registry unwinds memberships through.
    #[must_use]
    pub fn router(&self) -> &Arc<ChannelRouter> {
        &self.router
    }

    /// Registers an admitted connection.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if a connection with the same id
    /// is already registered (should never happen with UUID v4).
    pub async fn register(&self, connection: Connection) -> Result<(), GatewayError> {
        let id = connection.id;
        let mut map = self.connections.write().await;
        if map.contains_key(&id) {
            return Err(GatewayError::Internal(format!(
                "connection {id} already registered"
            )));
        }
        tracing::info!(connection_id = %id, principal = %connection.principal, "connection registered");
        map.insert(id, connection);
        Ok(())
    }

    /// Removes a connection from every channel, then from the table.
    ///
    /// Unknown ids are ignored. Returns `true` if the connection was
    /// registered.
    pub async fn unregister(&self, connection_id: ConnectionId) -> bool {
        self.router.remove_connection_from_all(connection_id).await;
        let removed = self.connections.write().await.remove(&connection_id);
        if removed.is_some() {
            tracing::info!(%connection_id, "connection unregistered");
        }
        removed.is_some()
    }

    /// Looks up a connection by id.
    pub async fn lookup(&self, connection_id: ConnectionId) -> Option<ConnectionSnapshot> {
        self.connections
            .read()
            .await
            .get(&connection_id)
            .map(|c| ConnectionSnapshot {
                id: c.id,
                principal: c.principal.clone(),
                connected_at: c.connected_at,
            })
    }

    /// Resolves member ids to push handles. Ids that are no longer
    /// registered are skipped.
    pub async fn senders_for(
        &self,
        ids: &HashSet<ConnectionId>,
    ) -> Vec<(ConnectionId, mpsc::Sender<OutboundFrame>)> {
        let map = self.connections.read().await;
        ids.iter()
            .filter_map(|id| map.get(id).map(|c| (*id, c.outbox.clone())))
            .collect()
    }

    /// Returns the number of registered connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Returns `true` if no connection is registered.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}

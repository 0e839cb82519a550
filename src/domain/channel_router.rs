//! Channel membership table.
//!
//! [`ChannelRouter`] maps channel names to the connections subscribed to
//! them. Both directions of the relation live behind a single
//! [`tokio::sync::RwLock`], so every join/leave/disconnect is atomic with
//! respect to concurrent broadcast snapshots.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use super::{ChannelName, ConnectionId};

#[derive(Debug, Default)]
struct MembershipTable {
    /// channel -> members. An empty channel is never stored.
    channels: HashMap<ChannelName, HashSet<ConnectionId>>,
    /// connection -> joined channels, used to unwind on disconnect.
    memberships: HashMap<ConnectionId, HashSet<ChannelName>>,
}

/// Routes channel names to member connections.
///
/// Members are stored by [`ConnectionId`] only; the router never holds a
/// connection's push handle, so membership cannot keep a connection alive.
///
/// # Concurrency
///
/// - Broadcast snapshots ([`ChannelRouter::members_of`]) take the read lock.
/// - Join, leave, and disconnect take the write lock.
#[derive(Debug, Default)]
pub struct ChannelRouter {
    table: RwLock<MembershipTable>,
}

impl ChannelRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a channel, creating the channel lazily.
    ///
    /// Joining a channel twice is a no-op. Returns `true` if the
    /// connection was newly added.
    pub async fn join(&self, connection_id: ConnectionId, channel: &ChannelName) -> bool {
        let mut table = self.table.write().await;
        let added = table
            .channels
            .entry(channel.clone())
            .or_default()
            .insert(connection_id);
        if added {
            table
                .memberships
                .entry(connection_id)
                .or_default()
                .insert(channel.clone());
            tracing::debug!(%connection_id, %channel, "joined channel");
        }
        added
    }

    /// Removes a connection from a channel.
    ///
    /// Leaving a channel that was never joined is a no-op. Returns `true`
    /// if the connection was a member.
    pub async fn leave(&self, connection_id: ConnectionId, channel: &ChannelName) -> bool {
        let mut table = self.table.write().await;
        let removed = remove_member(&mut table.channels, channel, connection_id);
        if removed {
            if let Some(joined) = table.memberships.get_mut(&connection_id) {
                joined.remove(channel);
                if joined.is_empty() {
                    table.memberships.remove(&connection_id);
                }
            }
            tracing::debug!(%connection_id, %channel, "left channel");
        }
        removed
    }

    /// Removes a connection from every channel it joined.
    ///
    /// Only the connection's own membership set is visited. Returns the
    /// number of channels the connection was removed from.
    pub async fn remove_connection_from_all(&self, connection_id: ConnectionId) -> usize {
        let mut table = self.table.write().await;
        let Some(joined) = table.memberships.remove(&connection_id) else {
            return 0;
        };
        for channel in &joined {
            remove_member(&mut table.channels, channel, connection_id);
        }
        tracing::debug!(%connection_id, channels = joined.len(), "removed from all channels");
        joined.len()
    }

    /// Returns a snapshot of the members of a channel.
    ///
    /// An unknown channel yields an empty set.
    pub async fn members_of(&self, channel: &ChannelName) -> HashSet<ConnectionId> {
        self.table
            .read()
            .await
            .channels
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns a snapshot of the channels a connection has joined.
    pub async fn channels_of(&self, connection_id: ConnectionId) -> HashSet<ChannelName> {
        self.table
            .read()
            .await
            .memberships
            .get(&connection_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of non-empty channels.
    pub async fn channel_count(&self) -> usize {
        self.table.read().await.channels.len()
    }
}

/// Removes `connection_id` from `channel`, dropping the channel entry once
/// it is empty.
fn remove_member(
    channels: &mut HashMap<ChannelName, HashSet<ConnectionId>>,
    channel: &ChannelName,
    connection_id: ConnectionId,
) -> bool {
    let Some(members) = channels.get_mut(channel) else {
        return false;
    };
    let removed = members.remove(&connection_id);
    if members.is_empty() {
        channels.remove(channel);
    }
    removed
}

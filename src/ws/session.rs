//! Per-connection state machine and command dispatch.
//!
//! A [`Session`] exists only for connections that passed the auth gate.
//! It applies client commands to the [`ChannelRouter`](crate::domain::ChannelRouter)
//! in the order they arrive and unwinds all memberships on close.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use super::messages::{
    ClientCommand, CommandError, ERROR, ErrorPayload, SUBSCRIBED_TO_POST, ServerFrame,
    SubscriptionAck, UNSUBSCRIBED_FROM_POST,
};
use crate::domain::{ChannelName, ConnectionId, ConnectionRegistry, PostId, PrincipalId};

/// Lifecycle of a client connection.
///
/// `Connecting → Authenticating → Active → Closed`, or
/// `Authenticating → Closed` when the auth gate rejects the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport handshake in progress.
    Connecting,
    /// Credential being verified.
    Authenticating,
    /// Registered and accepting commands.
    Active,
    /// Unregistered; no further commands are applied.
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Authenticating => "authenticating",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// What the connection loop should do after a client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Send this JSON text back to the client.
    Reply(String),
    /// Nothing to send; keep reading.
    Continue,
    /// Close the connection.
    Disconnect,
}

/// An admitted, active connection.
#[derive(Debug)]
pub struct Session {
    id: ConnectionId,
    principal: PrincipalId,
    state: ConnectionState,
    registry: Arc<ConnectionRegistry>,
}

impl Session {
    pub(super) fn new(
        id: ConnectionId,
        principal: PrincipalId,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            id,
            principal,
            state: ConnectionState::Active,
            registry,
        }
    }

    /// Connection identifier.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Authenticated principal.
    #[must_use]
    pub const fn principal(&self) -> &PrincipalId {
        &self.principal
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> ConnectionState {
        self.state
    }

    /// Parses and applies one client text frame.
    ///
    /// Errors are reported back to this client only.
    pub async fn handle_text(&mut self, text: &str) -> Outcome {
        if self.state != ConnectionState::Active {
            return Outcome::Disconnect;
        }
        match ClientCommand::parse(text) {
            Ok(ClientCommand::SubscribeToPost(post_id)) => {
                let channel = ChannelName::for_post(&post_id);
                self.registry.router().join(self.id, &channel).await;
                tracing::info!(connection_id = %self.id, %channel, "subscribed to post");
                ack(SUBSCRIBED_TO_POST, post_id, channel)
            }
            Ok(ClientCommand::UnsubscribeFromPost(post_id)) => {
                let channel = ChannelName::for_post(&post_id);
                self.registry.router().leave(self.id, &channel).await;
                tracing::info!(connection_id = %self.id, %channel, "unsubscribed from post");
                ack(UNSUBSCRIBED_FROM_POST, post_id, channel)
            }
            Ok(ClientCommand::Disconnect) => {
                tracing::debug!(connection_id = %self.id, "client requested disconnect");
                Outcome::Disconnect
            }
            Err(err) => {
                tracing::debug!(connection_id = %self.id, error = %err, "rejected client frame");
                error_reply(&err)
            }
        }
    }

    /// Removes the connection from every channel and from the registry.
    ///
    /// Safe to call more than once.
    pub async fn close(&mut self) {
        if self.state == ConnectionState::Closed {
            return;
        }
        self.registry.unregister(self.id).await;
        self.state = ConnectionState::Closed;
        tracing::info!(connection_id = %self.id, state = %self.state, "connection closed");
    }
}

fn ack(event: &'static str, post_id: PostId, channel: ChannelName) -> Outcome {
    reply(&ServerFrame {
        event,
        data: SubscriptionAck {
            post_id,
            channel,
            timestamp: Utc::now(),
        },
    })
}

fn error_reply(err: &CommandError) -> Outcome {
    reply(&ServerFrame {
        event: ERROR,
        data: ErrorPayload {
            code: err.code(),
            message: err.to_string(),
        },
    })
}

fn reply<T: Serialize>(frame: &ServerFrame<T>) -> Outcome {
    match serde_json::to_string(frame) {
        Ok(json) => Outcome::Reply(json),
        Err(e) => {
            tracing::error!(event = frame.event, error = %e, "failed to serialize reply");
            Outcome::Continue
        }
    }
}

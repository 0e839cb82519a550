//! Domain layer: identifiers, channel routing, connection registry, and
//! post events.
//!
//! This module contains the server-side model of the fan-out gateway:
//! who is connected ([`ConnectionRegistry`]), who listens where
//! ([`ChannelRouter`]), and what gets broadcast ([`PostEvent`]).

pub mod channel_name;
pub mod channel_router;
pub mod connection_registry;
pub mod gateway_handle;
pub mod ids;
pub mod post_event;

pub use channel_name::ChannelName;
pub use channel_router::ChannelRouter;
pub use connection_registry::{Connection, ConnectionRegistry, ConnectionSnapshot, OutboundFrame};
pub use gateway_handle::GatewayHandle;
pub use ids::{ConnectionId, PostId, PrincipalId};
pub use post_event::{PostEvent, PostEventKind, PostNotification, PublishRequest};

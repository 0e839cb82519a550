//! Event broadcaster: routes post events to channels and fans them out.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use utoipa::ToSchema;

use crate::domain::{ChannelName, GatewayHandle, OutboundFrame, PostEvent, PostEventKind};
use crate::error::GatewayError;

/// Outcome of a single publish.
///
/// Records where the event went and how many members the channel had at
/// delivery time. There is no per-member acknowledgment.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReport {
    /// Channel the event was routed to.
    #[schema(value_type = String)]
    pub channel: ChannelName,
    /// Event kind.
    pub event: PostEventKind,
    /// Number of channel members when the event was fanned out.
    pub member_count: usize,
    /// Time of delivery.
    pub timestamp: DateTime<Utc>,
}

/// Fans validated [`PostEvent`]s out to channel members.
///
/// Holds a [`GatewayHandle`] rather than the registry itself, so a publish
/// that arrives before the WebSocket transport is up fails with
/// [`GatewayError::Configuration`] instead of silently going nowhere.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    gateway: GatewayHandle,
}

impl EventBroadcaster {
    /// Creates a broadcaster bound to the given gateway handle.
    #[must_use]
    pub fn new(gateway: GatewayHandle) -> Self {
        Self { gateway }
    }

    /// Routes `event` to its target channel and pushes it to every
    /// current member.
    ///
    /// Members whose outbox is closed or full are skipped; the frame is
    /// dropped for them and the publish still succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the gateway transport is
    /// not initialized, or [`GatewayError::Internal`] if the event cannot
    /// be serialized.
    pub async fn publish(&self, event: PostEvent) -> Result<DeliveryReport, GatewayError> {
        let registry = self.gateway.get().inspect_err(|e| {
            tracing::error!(error = %e, event = event.kind().as_str(), "publish without gateway");
        })?;

        let channel = event.target_channel();
        let frame: OutboundFrame = serde_json::to_string(&event.to_notification())
            .map_err(|e| GatewayError::Internal(format!("serialize notification: {e}")))?
            .into();

        let members = registry.router().members_of(&channel).await;
        let member_count = members.len();
        if member_count > 0 {
            for (connection_id, outbox) in registry.senders_for(&members).await {
                match outbox.try_send(Arc::clone(&frame)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(%connection_id, %channel, "outbox full, dropping frame");
                    }
                    Err(TrySendError::Closed(_)) => {
                        tracing::debug!(%connection_id, %channel, "connection gone, dropping frame");
                    }
                }
            }
        }

        tracing::info!(
            event = event.kind().as_str(),
            post_id = %event.post_id(),
            owner_id = %event.owner_id(),
            %channel,
            member_count,
            "event broadcast"
        );

        Ok(DeliveryReport {
            channel,
            event: event.kind(),
            member_count,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{
        ChannelRouter, Connection, ConnectionRegistry, PostId, PrincipalId, PublishRequest,
    };
    use tokio::sync::mpsc;

    struct Fixture {
        broadcaster: EventBroadcaster,
        registry: Arc<ConnectionRegistry>,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(ConnectionRegistry::new(Arc::new(ChannelRouter::new())));
        let handle = GatewayHandle::new();
        let _ = handle.initialize(Arc::clone(&registry));
        Fixture {
            broadcaster: EventBroadcaster::new(handle),
            registry,
        }
    }

    async fn connect(
        registry: &ConnectionRegistry,
        principal: &str,
    ) -> (Connection, mpsc::Receiver<OutboundFrame>) {
        let (tx, rx) = mpsc::channel(8);
        let conn = Connection::new(PrincipalId::new(principal), tx);
        let _ = registry.register(conn.clone()).await;
        registry
            .router()
            .join(conn.id, &ChannelName::for_user(&conn.principal))
            .await;
        (conn, rx)
    }

    fn event(kind: PostEventKind, id: &str, user: &str) -> PostEvent {
        let req = PublishRequest {
            id: Some(id.into()),
            user_id: Some(user.into()),
            data: Some(serde_json::json!({"body": "x"})),
        };
        let Ok(event) = PostEvent::from_request(kind, req) else {
            panic!("valid event rejected");
        };
        event
    }

    fn post_channel(id: &str) -> ChannelName {
        ChannelName::for_post(&PostId::new(id))
    }

    #[tokio::test]
    async fn publish_before_initialize_is_configuration_error() {
        let broadcaster = EventBroadcaster::new(GatewayHandle::new());
        let result = broadcaster
            .publish(event(PostEventKind::PostUpdated, "p1", "u1"))
            .await;
        assert!(matches!(result, Err(GatewayError::Configuration(_))));
    }

    #[tokio::test]
    async fn publish_to_empty_channel_is_noop() {
        let fx = fixture();
        let Ok(report) = fx
            .broadcaster
            .publish(event(PostEventKind::PostUpdated, "p1", "u1"))
            .await
        else {
            panic!("publish failed");
        };
        assert_eq!(report.member_count, 0);
        assert_eq!(report.channel.as_str(), "post_p1");
    }

    #[tokio::test]
    async fn updated_reaches_post_subscribers_only() {
        let fx = fixture();
        let (watcher, mut watcher_rx) = connect(&fx.registry, "watcher").await;
        let (_owner, mut owner_rx) = connect(&fx.registry, "u1").await;
        fx.registry.router().join(watcher.id, &post_channel("p1")).await;

        let Ok(report) = fx
            .broadcaster
            .publish(event(PostEventKind::PostUpdated, "p1", "u1"))
            .await
        else {
            panic!("publish failed");
        };
        assert_eq!(report.member_count, 1);

        let Ok(frame) = watcher_rx.try_recv() else {
            panic!("watcher did not receive update");
        };
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap_or_default();
        assert_eq!(value["event"], "POST_UPDATED");
        assert_eq!(value["postId"], "p1");
        assert!(owner_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn deleted_reaches_owner_channel_only() {
        let fx = fixture();
        let (watcher, mut watcher_rx) = connect(&fx.registry, "watcher").await;
        let (_owner, mut owner_rx) = connect(&fx.registry, "u1").await;
        fx.registry.router().join(watcher.id, &post_channel("p1")).await;

        let Ok(report) = fx
            .broadcaster
            .publish(event(PostEventKind::PostDeleted, "p1", "u1"))
            .await
        else {
            panic!("publish failed");
        };
        assert_eq!(report.channel.as_str(), "user_u1");
        assert_eq!(report.member_count, 1);

        let Ok(frame) = owner_rx.try_recv() else {
            panic!("owner did not receive deletion");
        };
        assert!(frame.contains("POST_DELETED"));
        assert!(watcher_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn late_joiner_gets_no_replay() {
        let fx = fixture();
        let _ = fx
            .broadcaster
            .publish(event(PostEventKind::PostUpdated, "p1", "u1"))
            .await;

        let (late, mut late_rx) = connect(&fx.registry, "late").await;
        fx.registry.router().join(late.id, &post_channel("p1")).await;
        assert!(late_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn closed_member_is_skipped() {
        let fx = fixture();
        let (gone, gone_rx) = connect(&fx.registry, "gone").await;
        let (alive, mut alive_rx) = connect(&fx.registry, "alive").await;
        fx.registry.router().join(gone.id, &post_channel("p1")).await;
        fx.registry.router().join(alive.id, &post_channel("p1")).await;
        drop(gone_rx);

        let result = fx
            .broadcaster
            .publish(event(PostEventKind::PostUpdated, "p1", "u1"))
            .await;
        assert!(result.is_ok());
        assert!(alive_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn full_outbox_drops_frame_without_error() {
        let fx = fixture();
        let (tx, mut rx) = mpsc::channel(1);
        let conn = Connection::new(PrincipalId::new("slow"), tx);
        let id = conn.id;
        let _ = fx.registry.register(conn).await;
        fx.registry.router().join(id, &post_channel("p1")).await;

        for _ in 0..3 {
            let result = fx
                .broadcaster
                .publish(event(PostEventKind::PostUpdated, "p1", "u1"))
                .await;
            assert!(result.is_ok());
        }
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }
}

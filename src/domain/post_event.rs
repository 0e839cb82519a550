//! Post domain events reported by the external posts service.
//!
//! Inbound publish calls arrive as loosely-typed [`PublishRequest`] bodies
//! and are validated into a [`PostEvent`] before any routing happens.
//! Outbound frames use the [`PostNotification`] shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ChannelName, PostId, PrincipalId};
use crate::error::GatewayError;

/// Kind of post event, also the `event` tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostEventKind {
    /// A post's content changed.
    PostUpdated,
    /// A post was deleted.
    PostDeleted,
}

impl PostEventKind {
    /// Returns the wire tag as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PostUpdated => "POST_UPDATED",
            Self::PostDeleted => "POST_DELETED",
        }
    }
}

/// Validated domain event.
#[derive(Debug, Clone, PartialEq)]
pub enum PostEvent {
    /// Emitted after a post is updated.
    PostUpdated {
        /// Updated post.
        post_id: PostId,
        /// Owner of the post.
        owner_id: PrincipalId,
        /// Opaque payload supplied by the posts service.
        data: serde_json::Value,
        /// Time the event was accepted.
        timestamp: DateTime<Utc>,
    },

    /// Emitted after a post is deleted.
    PostDeleted {
        /// Deleted post.
        post_id: PostId,
        /// Owner of the post.
        owner_id: PrincipalId,
        /// Opaque payload supplied by the posts service.
        data: serde_json::Value,
        /// Time the event was accepted.
        timestamp: DateTime<Utc>,
    },
}

impl PostEvent {
    /// Validates a raw publish call into an event of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidEvent`] if `id` or `userId` is
    /// absent, blank, or neither a string nor a number.
    pub fn from_request(kind: PostEventKind, request: PublishRequest) -> Result<Self, GatewayError> {
        let post_id = request
            .id
            .as_ref()
            .and_then(PostId::from_json)
            .ok_or_else(|| missing("id"))?;
        let owner_id = request
            .user_id
            .as_ref()
            .and_then(PrincipalId::from_json)
            .ok_or_else(|| missing("userId"))?;
        let data = request.data.unwrap_or(serde_json::Value::Null);
        let timestamp = Utc::now();

        Ok(match kind {
            PostEventKind::PostUpdated => Self::PostUpdated {
                post_id,
                owner_id,
                data,
                timestamp,
            },
            PostEventKind::PostDeleted => Self::PostDeleted {
                post_id,
                owner_id,
                data,
                timestamp,
            },
        })
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> PostEventKind {
        match self {
            Self::PostUpdated { .. } => PostEventKind::PostUpdated,
            Self::PostDeleted { .. } => PostEventKind::PostDeleted,
        }
    }

    /// Returns the post this event concerns.
    #[must_use]
    pub fn post_id(&self) -> &PostId {
        match self {
            Self::PostUpdated { post_id, .. } | Self::PostDeleted { post_id, .. } => post_id,
        }
    }

    /// Returns the post owner.
    #[must_use]
    pub fn owner_id(&self) -> &PrincipalId {
        match self {
            Self::PostUpdated { owner_id, .. } | Self::PostDeleted { owner_id, .. } => owner_id,
        }
    }

    /// Channel this event is delivered on.
    ///
    /// Updates go to everyone watching the post; deletions go to the
    /// owner's personal channel.
    #[must_use]
    pub fn target_channel(&self) -> ChannelName {
        match self {
            Self::PostUpdated { post_id, .. } => ChannelName::for_post(post_id),
            Self::PostDeleted { owner_id, .. } => ChannelName::for_user(owner_id),
        }
    }

    /// Builds the outbound frame pushed to subscribers.
    #[must_use]
    pub fn to_notification(&self) -> PostNotification {
        let (Self::PostUpdated {
            post_id,
            owner_id,
            data,
            timestamp,
        }
        | Self::PostDeleted {
            post_id,
            owner_id,
            data,
            timestamp,
        }) = self;
        PostNotification {
            event: self.kind(),
            post_id: post_id.clone(),
            user_id: owner_id.clone(),
            data: data.clone(),
            timestamp: *timestamp,
        }
    }
}

fn missing(field: &str) -> GatewayError {
    GatewayError::InvalidEvent(format!("missing {field}"))
}

/// Body of an external publish call: `{id, userId, data}`.
///
/// `id` and `userId` are kept as raw JSON so that a wrongly typed field is
/// reported as an invalid event rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    /// Post identifier (string or number).
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub id: Option<serde_json::Value>,
    /// Owner principal identifier (string or number).
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub user_id: Option<serde_json::Value>,
    /// Opaque payload forwarded to subscribers.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
}

/// Outbound frame: `{event, postId, userId, data, timestamp}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostNotification {
    /// `POST_UPDATED` or `POST_DELETED`.
    pub event: PostEventKind,
    /// Post identifier.
    pub post_id: PostId,
    /// Owner principal identifier.
    pub user_id: PrincipalId,
    /// Opaque payload.
    pub data: serde_json::Value,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn request(id: Option<&str>, user_id: Option<&str>) -> PublishRequest {
        PublishRequest {
            id: id.map(serde_json::Value::from),
            user_id: user_id.map(serde_json::Value::from),
            data: Some(serde_json::json!({"title": "hello"})),
        }
    }

    #[test]
    fn updated_targets_post_channel() {
        let Ok(event) =
            PostEvent::from_request(PostEventKind::PostUpdated, request(Some("p1"), Some("u1")))
        else {
            panic!("valid request rejected");
        };
        assert_eq!(event.target_channel().as_str(), "post_p1");
    }

    #[test]
    fn deleted_targets_owner_channel() {
        let Ok(event) =
            PostEvent::from_request(PostEventKind::PostDeleted, request(Some("p1"), Some("u1")))
        else {
            panic!("valid request rejected");
        };
        assert_eq!(event.target_channel().as_str(), "user_u1");
    }

    #[test]
    fn missing_id_is_rejected() {
        let result = PostEvent::from_request(PostEventKind::PostUpdated, request(None, Some("u1")));
        assert!(matches!(result, Err(GatewayError::InvalidEvent(_))));
    }

    #[test]
    fn missing_user_id_is_rejected() {
        let result = PostEvent::from_request(PostEventKind::PostDeleted, request(Some("p1"), None));
        assert!(matches!(result, Err(GatewayError::InvalidEvent(_))));
    }

    #[test]
    fn blank_ids_are_rejected() {
        let result =
            PostEvent::from_request(PostEventKind::PostUpdated, request(Some("  "), Some("u1")));
        assert!(result.is_err());
    }

    #[test]
    fn data_only_body_deserializes_and_is_rejected() {
        let Ok(req) = serde_json::from_str::<PublishRequest>(r#"{"data": {}}"#) else {
            panic!("body should deserialize");
        };
        let result = PostEvent::from_request(PostEventKind::PostUpdated, req);
        assert!(result.is_err());
    }

    #[test]
    fn padded_id_is_kept_verbatim() {
        let Ok(event) =
            PostEvent::from_request(PostEventKind::PostUpdated, request(Some("p1 "), Some("u1")))
        else {
            panic!("valid request rejected");
        };
        assert_eq!(event.post_id(), &PostId::new("p1 "));
        assert_eq!(event.target_channel(), ChannelName::for_post(&PostId::new("p1 ")));
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let Ok(req) = serde_json::from_str::<PublishRequest>(r#"{"id": 42, "userId": 7}"#) else {
            panic!("body should deserialize");
        };
        let Ok(event) = PostEvent::from_request(PostEventKind::PostDeleted, req) else {
            panic!("numeric ids rejected");
        };
        assert_eq!(event.owner_id(), &PrincipalId::new("7"));
        assert_eq!(event.target_channel().as_str(), "user_7");
    }

    #[test]
    fn wrongly_typed_ids_are_invalid_events() {
        for body in [
            r#"{"userId": 7}"#,
            r#"{"id": true, "userId": "u1"}"#,
            r#"{"id": "p1", "userId": {}}"#,
        ] {
            let Ok(req) = serde_json::from_str::<PublishRequest>(body) else {
                panic!("body should deserialize: {body}");
            };
            let result = PostEvent::from_request(PostEventKind::PostUpdated, req);
            assert!(matches!(result, Err(GatewayError::InvalidEvent(_))), "{body}");
        }
    }

    #[test]
    fn notification_wire_shape() {
        let Ok(event) =
            PostEvent::from_request(PostEventKind::PostUpdated, request(Some("p1"), Some("u1")))
        else {
            panic!("valid request rejected");
        };
        let value = serde_json::to_value(event.to_notification()).unwrap_or_default();
        assert_eq!(value["event"], "POST_UPDATED");
        assert_eq!(value["postId"], "p1");
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["data"]["title"], "hello");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn kind_tags() {
        assert_eq!(PostEventKind::PostUpdated.as_str(), "POST_UPDATED");
        assert_eq!(PostEventKind::PostDeleted.as_str(), "POST_DELETED");
    }
}

//! WebSocket wire frames: client commands, acknowledgments, and errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChannelName, PostId};

/// Command name for subscribing to a post channel.
pub const SUBSCRIBE_TO_POST: &str = "subscribeToPost";

/// Command name for leaving a post channel.
pub const UNSUBSCRIBE_FROM_POST: &str = "unsubscribeFromPost";

/// Command name for an explicit client-side disconnect.
pub const DISCONNECT: &str = "disconnect";

/// Raw client frame: `{"event": "<command>", "data": <argument>}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientFrame {
    /// Command name.
    pub event: String,
    /// Command argument.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A parsed client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Join `post_<postId>`.
    SubscribeToPost(PostId),
    /// Leave `post_<postId>`.
    UnsubscribeFromPost(PostId),
    /// Close the connection.
    Disconnect,
}

/// Why a client frame could not be turned into a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Frame was not valid JSON or lacked an `event` field.
    #[error("malformed JSON")]
    Malformed,
    /// Frame named a command the gateway does not handle.
    #[error("unknown command: {0}")]
    Unknown(String),
    /// Command argument was missing, blank, or not a string or number.
    #[error("{0} requires a non-empty post id")]
    MissingPostId(&'static str),
}

impl CommandError {
    /// Numeric code carried in the error frame.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Malformed | Self::MissingPostId(_) => 400,
            Self::Unknown(_) => 404,
        }
    }
}

impl ClientCommand {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] for malformed JSON, unknown command names,
    /// or missing post ids.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let frame: ClientFrame = serde_json::from_str(text).map_err(|_| CommandError::Malformed)?;
        match frame.event.as_str() {
            SUBSCRIBE_TO_POST => post_id(&frame.data, SUBSCRIBE_TO_POST).map(Self::SubscribeToPost),
            UNSUBSCRIBE_FROM_POST => {
                post_id(&frame.data, UNSUBSCRIBE_FROM_POST).map(Self::UnsubscribeFromPost)
            }
            DISCONNECT => Ok(Self::Disconnect),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn post_id(data: &serde_json::Value, command: &'static str) -> Result<PostId, CommandError> {
    PostId::from_json(data).ok_or(CommandError::MissingPostId(command))
}

/// Server → client frame: `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
pub struct ServerFrame<T> {
    /// Event name.
    pub event: &'static str,
    /// Event payload.
    pub data: T,
}

/// Payload acknowledging a subscribe or unsubscribe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionAck {
    /// Post the command referred to.
    pub post_id: PostId,
    /// Channel joined or left.
    pub channel: ChannelName,
    /// ISO-8601 acknowledgment time.
    pub timestamp: DateTime<Utc>,
}

/// Payload of an error frame.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    /// Numeric error code.
    pub code: u16,
    /// Human-readable message.
    pub message: String,
}

/// Event name acknowledging [`ClientCommand::SubscribeToPost`].
pub const SUBSCRIBED_TO_POST: &str = "SUBSCRIBED_TO_POST";

/// Event name acknowledging [`ClientCommand::UnsubscribeFromPost`].
pub const UNSUBSCRIBED_FROM_POST: &str = "UNSUBSCRIBED_FROM_POST";

/// Event name of error frames.
pub const ERROR: &str = "ERROR";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscribe() {
        let cmd = ClientCommand::parse(r#"{"event":"subscribeToPost","data":"p1"}"#);
        assert_eq!(cmd, Ok(ClientCommand::SubscribeToPost(PostId::new("p1"))));
    }

    #[test]
    fn parses_unsubscribe() {
        let cmd = ClientCommand::parse(r#"{"event":"unsubscribeFromPost","data":"p1"}"#);
        assert_eq!(cmd, Ok(ClientCommand::UnsubscribeFromPost(PostId::new("p1"))));
    }

    #[test]
    fn parses_disconnect_without_data() {
        assert_eq!(
            ClientCommand::parse(r#"{"event":"disconnect"}"#),
            Ok(ClientCommand::Disconnect)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(ClientCommand::parse("{not json"), Err(CommandError::Malformed));
        assert_eq!(ClientCommand::parse(r#"{"data":"p1"}"#), Err(CommandError::Malformed));
    }

    #[test]
    fn rejects_unknown_command() {
        let err = ClientCommand::parse(r#"{"event":"launchRockets","data":"p1"}"#);
        assert_eq!(err, Err(CommandError::Unknown("launchRockets".to_string())));
        assert_eq!(CommandError::Unknown(String::new()).code(), 404);
    }

    #[test]
    fn rejects_missing_post_id() {
        for text in [
            r#"{"event":"subscribeToPost"}"#,
            r#"{"event":"subscribeToPost","data":""}"#,
            r#"{"event":"subscribeToPost","data":"  "}"#,
            r#"{"event":"subscribeToPost","data":true}"#,
        ] {
            assert_eq!(
                ClientCommand::parse(text),
                Err(CommandError::MissingPostId(SUBSCRIBE_TO_POST))
            );
        }
    }

    #[test]
    fn post_id_is_taken_verbatim() {
        let cmd = ClientCommand::parse(r#"{"event":"subscribeToPost","data":"p1 "}"#);
        assert_eq!(cmd, Ok(ClientCommand::SubscribeToPost(PostId::new("p1 "))));
        let cmd = ClientCommand::parse(r#"{"event":"subscribeToPost","data":42}"#);
        assert_eq!(cmd, Ok(ClientCommand::SubscribeToPost(PostId::new("42"))));
    }

    #[test]
    fn ack_frame_shape() {
        let frame = ServerFrame {
            event: SUBSCRIBED_TO_POST,
            data: SubscriptionAck {
                post_id: PostId::new("p1"),
                channel: ChannelName::for_post(&PostId::new("p1")),
                timestamp: Utc::now(),
            },
        };
        let value = serde_json::to_value(&frame).unwrap_or_default();
        assert_eq!(value["event"], "SUBSCRIBED_TO_POST");
        assert_eq!(value["data"]["postId"], "p1");
        assert_eq!(value["data"]["channel"], "post_p1");
    }
}

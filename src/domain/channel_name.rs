//! Deterministic channel naming.
//!
//! Every broadcast target is addressed by a [`ChannelName`]. Names are only
//! ever built through [`ChannelName::for_user`] and [`ChannelName::for_post`],
//! so the auto-join path and the broadcaster always agree on identity.

use std::fmt;

use serde::Serialize;

use super::{PostId, PrincipalId};

/// Prefix of per-user channels.
pub const USER_CHANNEL_PREFIX: &str = "user_";

/// Prefix of per-post channels.
pub const POST_CHANNEL_PREFIX: &str = "post_";

/// Name of a broadcast channel (`user_<principalId>` or `post_<postId>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    /// Personal channel of a principal.
    #[must_use]
    pub fn for_user(principal: &PrincipalId) -> Self {
        Self(format!("{USER_CHANNEL_PREFIX}{principal}"))
    }

    /// Channel carrying updates for a single post.
    #[must_use]
    pub fn for_post(post_id: &PostId) -> Self {
        Self(format!("{POST_CHANNEL_PREFIX}{post_id}"))
    }

    /// Returns the channel name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

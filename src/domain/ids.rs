//! Type-safe identifiers for connections, principals, and posts.
//!
//! [`ConnectionId`] wraps a [`uuid::Uuid`] (v4) minted by the gateway.
//! [`PrincipalId`] and [`PostId`] wrap opaque strings handed to us by
//! external services; they are never parsed, only compared and formatted.
//! Both are read from JSON through one conversion, so a subscribe command
//! and a publish call carrying the same id name the same channel.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a live client connection.
///
/// Generated once on admission and immutable thereafter. Used as the key
/// in [`super::ConnectionRegistry`] and as the member entry in
/// [`super::ChannelRouter`] channel sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    /// Creates a new random `ConnectionId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated identity behind a connection (the `sub` of a verified
/// credential) and the owner of a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Wraps a principal identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads an identifier from a JSON string or number.
    ///
    /// Strings are kept verbatim. Returns `None` for blank strings and
    /// every other JSON type.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        id_text(value).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a post owned by the external posts service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wraps a post identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reads an identifier from a JSON string or number.
    ///
    /// Strings are kept verbatim. Returns `None` for blank strings and
    /// every other JSON type.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        id_text(value).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn id_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn connection_id_displays_as_uuid() {
        let s = ConnectionId::new().to_string();
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn principal_id_serializes_transparently() {
        let json = serde_json::to_string(&PrincipalId::new("42")).unwrap_or_default();
        assert_eq!(json, "\"42\"");
    }

    #[test]
    fn post_id_display_is_raw_string() {
        assert_eq!(PostId::new("abc").to_string(), "abc");
    }

    #[test]
    fn ids_from_json_keep_strings_verbatim() {
        assert_eq!(PostId::from_json(&json!("p1 ")), Some(PostId::new("p1 ")));
        assert_eq!(PostId::from_json(&json!(42)), Some(PostId::new("42")));
        assert_eq!(PrincipalId::from_json(&json!(7)), Some(PrincipalId::new("7")));
    }

    #[test]
    fn ids_from_json_reject_blank_and_other_types() {
        for value in [json!(""), json!("   "), json!(null), json!(true), json!({}), json!([])] {
            assert_eq!(PostId::from_json(&value), None);
            assert_eq!(PrincipalId::from_json(&value), None);
        }
    }
}

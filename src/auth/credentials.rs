//! Credential material carried by a WebSocket handshake.

use std::collections::HashMap;

use axum::http::HeaderMap;

/// Header carrying a `Bearer <token>` credential.
pub const AUTHENTICATION_HEADER: &str = "authentication";

/// Handshake header carrying a raw out-of-band token.
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Query parameter carrying a raw token.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Every place a handshake may carry a credential.
///
/// Built from the upgrade request; the transport is otherwise irrelevant
/// to credential extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeCredentials {
    /// First `Authentication` header value, if it is valid UTF-8.
    pub authentication: Option<String>,
    /// Out-of-band token supplied alongside the handshake.
    pub auth_token: Option<String>,
    /// Value of the `token` query parameter.
    pub query_token: Option<String>,
}

impl HandshakeCredentials {
    /// Collects credential candidates from request headers and query
    /// parameters. Header names are matched case-insensitively. Only the
    /// first `Authentication` value is considered; later values never
    /// stand in for an unreadable first one.
    #[must_use]
    pub fn from_parts(headers: &HeaderMap, query: &HashMap<String, String>) -> Self {
        let authentication = headers
            .get(AUTHENTICATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let auth_token = headers
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let query_token = query.get(TOKEN_QUERY_PARAM).cloned();
        Self {
            authentication,
            auth_token,
            query_token,
        }
    }

    /// Picks the credential to verify.
    ///
    /// Precedence: `Authentication: Bearer <token>` (first header value,
    /// scheme matched case-insensitively), then the out-of-band token, then
    /// the `token` query parameter. Empty candidates are skipped.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.authentication
            .as_deref()
            .and_then(bearer_token)
            .or_else(|| non_empty(self.auth_token.as_deref()))
            .or_else(|| non_empty(self.query_token.as_deref()))
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split_whitespace();
    let scheme = parts.next()?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    parts.next()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

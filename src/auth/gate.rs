//! Admission check run once per connection.

use std::sync::Arc;

use super::{CredentialVerifier, HandshakeCredentials};
use crate::domain::PrincipalId;

/// Why a handshake was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// No credential was found in any supported location.
    #[error("missing credential")]
    MissingCredential,
    /// A credential was found but failed verification.
    #[error("invalid credential")]
    InvalidCredential,
}

/// Extracts a credential from a handshake and verifies it.
#[derive(Debug, Clone)]
pub struct AuthGate {
    verifier: Arc<dyn CredentialVerifier>,
}

impl AuthGate {
    /// Creates a gate backed by the given verifier.
    #[must_use]
    pub fn new(verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { verifier }
    }

    /// Authenticates a handshake and returns the verified principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFailure::MissingCredential`] if no candidate token is
    /// present, or [`AuthFailure::InvalidCredential`] if verification fails.
    pub async fn authenticate(
        &self,
        credentials: &HandshakeCredentials,
    ) -> Result<PrincipalId, AuthFailure> {
        let Some(token) = credentials.token() else {
            return Err(AuthFailure::MissingCredential);
        };
        self.verifier.verify_credential(token).await.map_err(|e| {
            tracing::debug!(error = %e, "credential verification failed");
            AuthFailure::InvalidCredential
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::VerifyError;
    use async_trait::async_trait;

    /// Accepts tokens of the form `ok:<principal>`.
    #[derive(Debug)]
    struct PrefixVerifier;

    #[async_trait]
    impl CredentialVerifier for PrefixVerifier {
        async fn verify_credential(&self, token: &str) -> Result<PrincipalId, VerifyError> {
            token
                .strip_prefix("ok:")
                .map(PrincipalId::new)
                .ok_or_else(|| VerifyError::Rejected("bad prefix".to_string()))
        }
    }

    fn gate() -> AuthGate {
        AuthGate::new(Arc::new(PrefixVerifier))
    }

    #[tokio::test]
    async fn missing_credential() {
        let result = gate().authenticate(&HandshakeCredentials::default()).await;
        assert_eq!(result, Err(AuthFailure::MissingCredential));
    }

    #[tokio::test]
    async fn invalid_credential() {
        let creds = HandshakeCredentials {
            query_token: Some("nope".to_string()),
            ..HandshakeCredentials::default()
        };
        assert_eq!(
            gate().authenticate(&creds).await,
            Err(AuthFailure::InvalidCredential)
        );
    }

    #[tokio::test]
    async fn header_token_is_verified_over_query() {
        let creds = HandshakeCredentials {
            authentication: Some("Bearer ok:header-user".to_string()),
            auth_token: None,
            query_token: Some("ok:query-user".to_string()),
        };
        assert_eq!(
            gate().authenticate(&creds).await,
            Ok(PrincipalId::new("header-user"))
        );
    }

    #[tokio::test]
    async fn bad_header_token_does_not_fall_back() {
        let creds = HandshakeCredentials {
            authentication: Some("Bearer broken".to_string()),
            auth_token: None,
            query_token: Some("ok:query-user".to_string()),
        };
        assert_eq!(
            gate().authenticate(&creds).await,
            Err(AuthFailure::InvalidCredential)
        );
    }
}

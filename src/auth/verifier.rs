//! Credential verification capability.
//!
//! The gateway never decides on its own whether a token is valid; it asks
//! a [`CredentialVerifier`]. [`JwtVerifier`] is the shared-secret HS256
//! implementation used in production.

use std::fmt;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::PrincipalId;

/// Reason a credential failed verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// The credential's `exp` is in the past.
    #[error("credential expired")]
    Expired,
    /// Malformed token, bad signature, or missing subject.
    #[error("credential rejected: {0}")]
    Rejected(String),
}

/// Verifies a raw token and returns the principal it encodes.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + fmt::Debug {
    /// Verifies `token`.
    ///
    /// # Errors
    ///
    /// Returns a [`VerifyError`] if the token is expired, malformed, or
    /// carries a bad signature.
    async fn verify_credential(&self, token: &str) -> Result<PrincipalId, VerifyError>;
}

/// Claims the gateway reads from a JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal identifier.
    pub sub: String,
    /// Expiry (seconds since the Unix epoch).
    pub exp: u64,
}

/// HS256 JWT verifier keyed by a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Creates a verifier for tokens signed with `secret`.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialVerifier for JwtVerifier {
    async fn verify_credential(&self, token: &str) -> Result<PrincipalId, VerifyError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => VerifyError::Expired,
                _ => VerifyError::Rejected(e.to_string()),
            },
        )?;
        if data.claims.sub.trim().is_empty() {
            return Err(VerifyError::Rejected("empty subject".to_string()));
        }
        Ok(PrincipalId::new(data.claims.sub))
    }
}

//! Handshake authentication: credential extraction and verification.
//!
//! [`AuthGate`] runs exactly once per connection, before the connection is
//! registered or joins any channel.

pub mod credentials;
pub mod gate;
pub mod verifier;

pub use credentials::HandshakeCredentials;
pub use gate::{AuthFailure, AuthGate};
pub use verifier::{Claims, CredentialVerifier, JwtVerifier, VerifyError};

//! Late-bound handle to the live connection table.
//!
//! The broadcaster is built before the WebSocket transport starts
//! accepting connections. [`GatewayHandle`] makes that window explicit:
//! until [`GatewayHandle::initialize`] runs, [`GatewayHandle::get`] reports
//! [`GatewayError::Configuration`].

use std::sync::{Arc, OnceLock};

use super::ConnectionRegistry;
use crate::error::GatewayError;

/// Shared, write-once reference to the [`ConnectionRegistry`] backing the
/// WebSocket transport.
#[derive(Debug, Clone, Default)]
pub struct GatewayHandle {
    inner: Arc<OnceLock<Arc<ConnectionRegistry>>>,
}

impl GatewayHandle {
    /// Creates an uninitialized handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the handle to a live registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the handle was already
    /// initialized.
    pub fn initialize(&self, registry: Arc<ConnectionRegistry>) -> Result<(), GatewayError> {
        self.inner
            .set(registry)
            .map_err(|_| GatewayError::Configuration("gateway already initialized".to_string()))
    }

    /// Returns the bound registry.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the transport has not been
    /// initialized yet.
    pub fn get(&self) -> Result<&Arc<ConnectionRegistry>, GatewayError> {
        self.inner
            .get()
            .ok_or_else(|| GatewayError::Configuration("gateway not initialized".to_string()))
    }

    /// Returns `true` once [`GatewayHandle::initialize`] has succeeded.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.inner.get().is_some()
    }
}

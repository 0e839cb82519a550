//! Service layer: event routing and fan-out.
//!
//! Services coordinate domain components and are the only code that
//! publishes frames to connected clients.

pub mod event_broadcaster;

pub use event_broadcaster::{DeliveryReport, EventBroadcaster};

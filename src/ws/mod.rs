//! WebSocket front-end: handshake, per-connection sessions, and the
//! read/write loop.
//!
//! The endpoint at `/posts` accepts authenticated clients, auto-joins them
//! to their personal channel, and lets them subscribe to individual posts.

pub mod connection;
pub mod gateway;
pub mod handler;
pub mod messages;
pub mod session;

pub use gateway::Gateway;
pub use session::{ConnectionState, Outcome, Session};

//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single active connection,
//! dispatching incoming commands and forwarding broadcast frames from the
//! connection's outbox.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::session::{Outcome, Session};
use crate::domain::OutboundFrame;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and applies them in arrival order.
/// - Forwards frames pushed by the broadcaster to the client.
///
/// On exit (client close, transport error, or `disconnect` command) the
/// session is closed, which removes it from every channel.
pub async fn run_connection(
    socket: WebSocket,
    mut session: Session,
    mut outbox: mpsc::Receiver<OutboundFrame>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let connection_id = session.id();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match session.handle_text(text.as_str()).await {
                            Outcome::Reply(json) => {
                                if ws_tx.send(Message::text(json)).await.is_err() {
                                    break;
                                }
                            }
                            Outcome::Continue => {}
                            Outcome::Disconnect => {
                                let _ = ws_tx.send(Message::Close(None)).await;
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(%connection_id, error = %e, "ws transport error");
                        break;
                    }
                    _ => {}
                }
            }
            // Frame from the broadcaster
            frame = outbox.recv() => {
                let Some(frame) = frame else { break };
                if ws_tx.send(Message::text(frame.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }

    session.close().await;
}

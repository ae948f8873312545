//! Individual socket connection handle.

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use quasar_core::types::SocketId;

use crate::message::types::OutboundMessage;

/// A handle to a single socket connection.
///
/// Holds the bounded outbound queue feeding the transport writer and the
/// cancellation token that tears the transport down.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique socket ID
    pub id: SocketId,
    /// Application the socket connected to
    pub app_key: String,
    /// Sender for outbound frames
    sender: mpsc::Sender<String>,
    /// Cancelled when the connection must close
    cancel: CancellationToken,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Last inbound traffic of any kind
    last_seen: RwLock<DateTime<Utc>>,
}

impl ConnectionHandle {
    /// Create a new connection handle with a fresh socket ID
    pub fn new(app_key: impl Into<String>, sender: mpsc::Sender<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SocketId::new(),
            app_key: app_key.into(),
            sender,
            cancel: CancellationToken::new(),
            connected_at: now,
            last_seen: RwLock::new(now),
        }
    }

    /// Queue a message for this socket.
    pub fn send(&self, msg: &OutboundMessage) -> bool {
        match msg.to_frame() {
            Ok(frame) => self.send_frame(frame),
            Err(e) => {
                error!(socket_id = %self.id, error = %e, "Failed to serialize outbound message");
                false
            }
        }
    }

    /// Queue an already serialized frame without waiting.
    ///
    /// A full queue means the client is not keeping up; the connection is
    /// closed rather than letting it hold back anyone else.
    pub fn send_frame(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    socket_id = %self.id,
                    app_key = %self.app_key,
                    "Outbound queue full, disconnecting slow consumer"
                );
                self.close();
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.close();
                false
            }
        }
    }

    /// Request the transport to close.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether the connection has not been asked to close
    pub fn is_alive(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Token cancelled when this connection closes
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Record inbound traffic
    pub async fn touch(&self) {
        let mut seen = self.last_seen.write().await;
        *seen = Utc::now();
    }

    /// Time since the last inbound traffic
    pub async fn idle_for(&self) -> chrono::Duration {
        Utc::now() - *self.last_seen.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::message::types::ProtocolEvent;

    #[test]
    fn test_send_queues_serialized_frame() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new("app", tx);

        assert!(handle.send(&OutboundMessage::protocol(ProtocolEvent::Pong, json!(null))));
        assert_eq!(rx.try_recv().unwrap(), r#"{"event":"quasar:pong"}"#);
    }

    #[test]
    fn test_overflow_closes_connection() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new("app", tx);

        assert!(handle.send_frame("one".into()));
        assert!(!handle.send_frame("two".into()));
        assert!(!handle.is_alive());
        assert!(!handle.send_frame("three".into()));
    }

    #[test]
    fn test_dropped_receiver_closes_connection() {
        let (tx, rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new("app", tx);
        drop(rx);

        assert!(!handle.send_frame("frame".into()));
        assert!(handle.cancellation().is_cancelled());
    }

    #[tokio::test]
    async fn test_touch_resets_idle_time() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new("app", tx);
        handle.touch().await;
        assert!(handle.idle_for().await < chrono::Duration::seconds(1));
    }
}

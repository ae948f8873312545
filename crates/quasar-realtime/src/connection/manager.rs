//! Connection manager: accepts sockets, routes inbound frames to their
//! namespace, and runs disconnect cleanup exactly once.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use quasar_core::config::RealtimeConfig;
use quasar_core::types::SocketId;

use crate::application::AppRegistry;
use crate::error::BrokerError;
use crate::message::builder::{build_connection_established, build_error};
use crate::message::types::{InboundMessage, OutboundMessage, ProtocolEvent};
use crate::message::validator::validate_inbound;
use crate::metrics::RealtimeMetrics;

use super::handle::ConnectionHandle;
use super::heartbeat::HeartbeatConfig;
use super::pool::ConnectionPool;

/// A freshly accepted connection.
#[derive(Debug)]
pub struct Connection {
    /// Handle shared with the namespace.
    pub handle: Arc<ConnectionHandle>,
    /// Frames to write to the transport, in order.
    pub outbound: mpsc::Receiver<String>,
}

/// Manages all active socket connections across applications.
#[derive(Debug)]
pub struct ConnectionManager {
    pool: Arc<ConnectionPool>,
    registry: Arc<AppRegistry>,
    metrics: Arc<RealtimeMetrics>,
    config: RealtimeConfig,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    pub fn new(
        config: RealtimeConfig,
        registry: Arc<AppRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            registry,
            metrics,
            config,
        }
    }

    /// Registers a socket with the namespace of `app_key` and greets it
    /// with its socket ID.
    pub async fn accept(&self, app_key: &str) -> Result<Connection, BrokerError> {
        let namespace = self.registry.require(app_key)?;
        let (tx, rx) = mpsc::channel(self.config.socket_buffer_size);

        let handle = namespace.connect(tx).await;
        self.pool.add(handle.clone());
        self.metrics.connection_opened();

        let greeting = build_connection_established(&handle.id, self.config.ping_interval_seconds);
        if handle.send(&greeting) {
            self.metrics.message_sent();
        }

        info!(socket_id = %handle.id, app_key, "Socket connected");

        Ok(Connection {
            handle,
            outbound: rx,
        })
    }

    /// Processes one inbound text frame.
    ///
    /// Frames from one socket must be fed in arrival order. Malformed frames
    /// are answered with `quasar:error` and leave the socket connected.
    pub async fn handle_inbound(&self, socket_id: &SocketId, raw: &str) {
        let Some(handle) = self.pool.get(socket_id) else {
            warn!(socket_id = %socket_id, "Message from unknown connection");
            return;
        };

        handle.touch().await;
        self.metrics.message_received();

        if let Err(err) = validate_inbound(raw, self.config.max_message_size_bytes) {
            self.reply(&handle, &build_error(&err.to_string()));
            return;
        }

        let msg: InboundMessage = match serde_json::from_str(raw) {
            Ok(msg) => msg,
            Err(e) => {
                debug!(socket_id = %socket_id, error = %e, "Unparseable frame");
                self.reply(&handle, &build_error(&format!("Invalid message: {e}")));
                return;
            }
        };

        let Some(namespace) = self.registry.get(&handle.app_key) else {
            warn!(socket_id = %socket_id, app_key = %handle.app_key, "Namespace missing for socket");
            return;
        };

        match msg {
            InboundMessage::Subscribe(p) => {
                // Rejections are reported to the socket in-band.
                let _ = namespace
                    .subscribe(
                        socket_id,
                        &p.channel,
                        p.auth.as_deref(),
                        p.channel_data.as_deref(),
                    )
                    .await;
            }
            InboundMessage::Unsubscribe(p) => {
                namespace.unsubscribe(socket_id, &p.channel).await;
            }
            InboundMessage::ChannelEvent(p) => {
                namespace
                    .client_event(socket_id, &p.channel, &p.event, p.data)
                    .await;
            }
            InboundMessage::Ping => {
                self.reply(
                    &handle,
                    &OutboundMessage::protocol(ProtocolEvent::Pong, serde_json::Value::Null),
                );
            }
            InboundMessage::Pong => {}
            InboundMessage::Disconnect => {
                handle.close();
                self.disconnect(socket_id).await;
            }
        }
    }

    /// Removes a socket and cleans up its namespace state.
    ///
    /// Safe to call from both the transport and protocol paths; only the
    /// first call does any work.
    pub async fn disconnect(&self, socket_id: &SocketId) -> bool {
        let Some(handle) = self.pool.remove(socket_id) else {
            return false;
        };
        handle.close();

        if let Some(namespace) = self.registry.get(&handle.app_key) {
            namespace.disconnect(socket_id).await;
        }
        self.metrics.connection_closed();

        info!(
            socket_id = %socket_id,
            app_key = %handle.app_key,
            duration_secs = (chrono::Utc::now() - handle.connected_at).num_seconds(),
            "Socket disconnected"
        );
        true
    }

    /// Asks every connection to close. Cleanup runs as each transport exits.
    pub fn close_all(&self) -> usize {
        let all = self.pool.all();
        for handle in &all {
            handle.close();
        }
        info!(count = all.len(), "All connections closed");
        all.len()
    }

    /// Heartbeat timing for new connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// Total connection count.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Connection count for one application.
    pub fn app_connection_count(&self, app_key: &str) -> usize {
        self.pool.app_connection_count(app_key)
    }

    fn reply(&self, handle: &ConnectionHandle, msg: &OutboundMessage) {
        if handle.send(msg) {
            self.metrics.message_sent();
        } else {
            self.metrics.message_dropped();
        }
    }
}

//! Ping/timeout heartbeat for socket keepalive.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use quasar_core::config::RealtimeConfig;

use crate::message::types::{OutboundMessage, ProtocolEvent};

use super::handle::ConnectionHandle;

/// Heartbeat configuration
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Silence after which the connection is considered dead
    pub ping_timeout: Duration,
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Run the heartbeat loop for a connection.
///
/// Sends `quasar:ping` every interval and closes the connection once no
/// inbound traffic has been seen for longer than the timeout. Returns when
/// the connection closes.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let cancel = handle.cancellation();
    let mut interval = time::interval_at(Instant::now() + config.ping_interval, config.ping_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let idle = handle.idle_for().await;
        if let Ok(idle) = idle.to_std() {
            if idle > config.ping_timeout {
                warn!(
                    socket_id = %handle.id,
                    idle_ms = idle.as_millis() as u64,
                    "Heartbeat timeout, closing connection"
                );
                handle.close();
                break;
            }
        }

        if !handle.send(&OutboundMessage::protocol(ProtocolEvent::Ping, Value::Null)) {
            break;
        }
    }

    debug!(socket_id = %handle.id, "Heartbeat loop ended");
}

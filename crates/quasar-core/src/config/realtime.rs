//! Real-time socket engine configuration.

use serde::{Deserialize, Serialize};

/// Socket engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each socket's outbound queue. A socket whose queue
    /// overflows is disconnected.
    #[serde(default = "default_socket_buffer")]
    pub socket_buffer_size: usize,
    /// Seconds between `quasar:ping` heartbeat frames.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Seconds without any inbound traffic before a socket is considered dead.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
    /// Maximum size of one inbound frame in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            socket_buffer_size: default_socket_buffer(),
            ping_interval_seconds: default_ping_interval(),
            ping_timeout_seconds: default_ping_timeout(),
            max_message_size_bytes: default_max_message_size(),
        }
    }
}

fn default_socket_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    25
}

fn default_ping_timeout() -> u64 {
    60
}

fn default_max_message_size() -> usize {
    65_536
}

//! Broker metrics counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Process-wide counters shared by every namespace.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_total: AtomicU64,
    connections_active: AtomicU64,
    messages_received: AtomicU64,
    messages_sent: AtomicU64,
    messages_dropped: AtomicU64,
    subscriptions_total: AtomicU64,
    subscriptions_rejected: AtomicU64,
    triggers_accepted: AtomicU64,
    triggers_rejected: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection
    pub fn connection_opened(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a disconnection
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record an inbound frame
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame queued for a socket
    pub fn message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame that could not be queued
    pub fn message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful subscribe
    pub fn subscription_accepted(&self) {
        self.subscriptions_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected subscribe
    pub fn subscription_rejected(&self) {
        self.subscriptions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a trigger outcome
    pub fn trigger(&self, accepted: bool) {
        let counter = if accepted {
            &self.triggers_accepted
        } else {
            &self.triggers_rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            subscriptions_total: self.subscriptions_total.load(Ordering::Relaxed),
            subscriptions_rejected: self.subscriptions_rejected.load(Ordering::Relaxed),
            triggers_accepted: self.triggers_accepted.load(Ordering::Relaxed),
            triggers_rejected: self.triggers_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever established
    pub connections_total: u64,
    /// Currently open connections
    pub connections_active: u64,
    /// Inbound frames
    pub messages_received: u64,
    /// Frames queued to sockets
    pub messages_sent: u64,
    /// Frames dropped because a socket was closed or full
    pub messages_dropped: u64,
    /// Successful subscribes
    pub subscriptions_total: u64,
    /// Rejected subscribes
    pub subscriptions_rejected: u64,
    /// Accepted trigger requests
    pub triggers_accepted: u64,
    /// Rejected trigger requests
    pub triggers_rejected: u64,
}

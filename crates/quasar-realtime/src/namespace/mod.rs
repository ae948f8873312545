//! Per-application broker partition.
//!
//! A [`Namespace`] owns one application's sockets, rooms, and presence sets
//! behind a single lock held across each compound operation. Namespaces
//! share nothing, so tenants never contend with each other.

pub mod socket;
pub mod state;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, mpsc};

use quasar_core::types::SocketId;

use crate::application::Application;
use crate::channel::ChannelName;
use crate::connection::handle::ConnectionHandle;
use crate::error::BrokerError;
use crate::metrics::RealtimeMetrics;
use crate::presence::MemberView;

pub use state::{ChannelInfo, NamespaceState};

/// One tenant's broker state.
#[derive(Debug)]
pub struct Namespace {
    app: Application,
    state: Mutex<NamespaceState>,
}

impl Namespace {
    /// Creates an empty namespace for `app`.
    pub fn new(app: Application, metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            app,
            state: Mutex::new(NamespaceState::new(metrics)),
        }
    }

    /// The application this namespace serves.
    pub fn app(&self) -> &Application {
        &self.app
    }

    /// The application key.
    pub fn key(&self) -> &str {
        &self.app.key
    }

    /// Allocates a socket identity bound to `sender` and registers it.
    pub async fn connect(&self, sender: mpsc::Sender<String>) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(self.app.key.clone(), sender));
        self.state.lock().await.connect(handle.clone());
        handle
    }

    /// See [`NamespaceState::subscribe`].
    pub async fn subscribe(
        &self,
        socket_id: &SocketId,
        channel: &str,
        auth: Option<&str>,
        channel_data: Option<&str>,
    ) -> Result<(), BrokerError> {
        self.state
            .lock()
            .await
            .subscribe(&self.app, socket_id, channel, auth, channel_data)
    }

    /// Leaves a channel, announcing presence departures.
    pub async fn unsubscribe(&self, socket_id: &SocketId, channel: &str) -> bool {
        self.state.lock().await.unsubscribe(socket_id, channel)
    }

    /// Removes a socket from every channel and from the namespace. Idempotent.
    pub async fn disconnect(&self, socket_id: &SocketId) -> bool {
        self.state.lock().await.disconnect(socket_id)
    }

    /// Relays a client event to the other members of a channel.
    pub async fn client_event(
        &self,
        socket_id: &SocketId,
        channel: &str,
        event: &str,
        data: Value,
    ) -> usize {
        self.state
            .lock()
            .await
            .client_event(socket_id, channel, event, data)
    }

    /// Fans an event out to each listed channel, skipping `exclude`.
    pub async fn broadcast(
        &self,
        channels: &[String],
        event: &str,
        data: &Value,
        exclude: Option<&SocketId>,
    ) -> usize {
        self.state
            .lock()
            .await
            .broadcast(channels, event, data, exclude)
    }

    /// Whether a socket is connected here.
    pub async fn is_connected(&self, socket_id: &SocketId) -> bool {
        self.state.lock().await.is_connected(socket_id)
    }

    /// Number of connected sockets.
    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.connection_count()
    }

    /// Occupancy of one channel.
    pub async fn channel_info(&self, channel: &ChannelName) -> ChannelInfo {
        self.state.lock().await.channel_info(channel)
    }

    /// Occupied channels with their subscriber counts.
    pub async fn occupied_channels(&self) -> Vec<(String, usize)> {
        self.state.lock().await.occupied_channels()
    }

    /// Users present on a presence channel.
    pub async fn presence_members(&self, channel: &str) -> Vec<MemberView> {
        self.state.lock().await.presence_members(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use serde_json::json;

    use crate::auth::SignatureVerifier;

    fn namespace() -> Arc<Namespace> {
        Arc::new(Namespace::new(
            Application {
                key: "key".into(),
                secret: "secret".into(),
                options: HashMap::new(),
            },
            Arc::new(RealtimeMetrics::new()),
        ))
    }

    #[tokio::test]
    async fn test_connect_allocates_distinct_sockets() {
        let ns = namespace();
        let (tx, _rx) = mpsc::channel(4);
        let a = ns.connect(tx.clone()).await;
        let b = ns.connect(tx).await;

        assert_ne!(a.id, b.id);
        assert_eq!(a.app_key, "key");
        assert_eq!(ns.connection_count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_presence_joins_announce_each_user_once() {
        let ns = namespace();
        let (watch_tx, mut watch_rx) = mpsc::channel(256);
        let watcher = ns.connect(watch_tx).await;
        let data = r#"{"user_id":"watcher"}"#;
        let sig = SignatureVerifier::sign("secret", &format!("{}:presence-room:{data}", watcher.id));
        ns.subscribe(&watcher.id, "presence-room", Some(&sig), Some(data))
            .await
            .unwrap();
        watch_rx.recv().await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let ns = ns.clone();
            tasks.push(tokio::spawn(async move {
                let (tx, rx) = mpsc::channel(256);
                let handle = ns.connect(tx).await;
                let data = format!(r#"{{"user_id":"u{}"}}"#, i % 4);
                let sig = SignatureVerifier::sign(
                    "secret",
                    &format!("{}:presence-room:{data}", handle.id),
                );
                ns.subscribe(&handle.id, "presence-room", Some(&sig), Some(&data))
                    .await
                    .unwrap();
                (handle, rx)
            }));
        }
        let mut sockets = Vec::new();
        for task in tasks {
            sockets.push(task.await.unwrap());
        }

        let mut added = 0;
        while let Ok(frame) = watch_rx.try_recv() {
            let frame: Value = serde_json::from_str(&frame).unwrap();
            if frame["event"] == json!("presence-room#quasar:member_added") {
                added += 1;
            }
        }
        assert_eq!(added, 4);
        assert_eq!(ns.presence_members("presence-room").await.len(), 5);

        for (handle, _rx) in &sockets {
            ns.disconnect(&handle.id).await;
        }
        let mut removed = 0;
        while let Ok(frame) = watch_rx.try_recv() {
            let frame: Value = serde_json::from_str(&frame).unwrap();
            if frame["event"] == json!("presence-room#quasar:member_removed") {
                removed += 1;
            }
        }
        assert_eq!(removed, 4);
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let ns = namespace();
        let (tx, _rx) = mpsc::channel(4);
        let a = ns.connect(tx).await;

        assert!(ns.disconnect(&a.id).await);
        assert!(!ns.disconnect(&a.id).await);
        assert!(!ns.is_connected(&a.id).await);
    }
}

//! Connection pool: every live socket across all applications.

use std::sync::Arc;

use dashmap::DashMap;

use quasar_core::types::SocketId;

use super::handle::ConnectionHandle;

/// Thread-safe index of active connections by socket ID.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<SocketId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection. Only the first call for an ID returns it.
    pub fn remove(&self, socket_id: &SocketId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(socket_id).map(|(_, handle)| handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, socket_id: &SocketId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(socket_id).map(|entry| entry.value().clone())
    }

    /// All connections currently in the pool.
    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Returns total number of active connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of connections for one application.
    pub fn app_connection_count(&self, app_key: &str) -> usize {
        self.by_id
            .iter()
            .filter(|entry| entry.value().app_key == app_key)
            .count()
    }
}

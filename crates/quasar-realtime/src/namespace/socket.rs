//! A connected socket as seen by its namespace.

use std::collections::HashSet;
use std::sync::Arc;

use crate::connection::handle::ConnectionHandle;

/// Socket state owned by exactly one namespace.
#[derive(Debug)]
pub struct Socket {
    /// Outbound side of the connection.
    pub handle: Arc<ConnectionHandle>,
    /// Channels the socket has successfully joined.
    pub joined: HashSet<String>,
}

impl Socket {
    /// A freshly connected socket with no channels.
    pub fn new(handle: Arc<ConnectionHandle>) -> Self {
        Self {
            handle,
            joined: HashSet::new(),
        }
    }
}

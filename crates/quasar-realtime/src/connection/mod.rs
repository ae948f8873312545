//! WebSocket connection lifecycle: handles, pool, heartbeat, and routing.

pub mod handle;
pub mod heartbeat;
pub mod manager;
pub mod pool;

pub use handle::ConnectionHandle;
pub use manager::{Connection, ConnectionManager};

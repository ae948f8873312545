//! # quasar-realtime
//!
//! Multi-tenant publish/subscribe engine. Provides:
//!
//! - Per-application namespaces holding sockets, rooms, and presence sets
//! - Public, private, and presence channels with HMAC channel authorization
//! - Presence membership with join/leave edge notifications
//! - Signed HTTP trigger pipeline fanning events out to channel rooms
//! - Bounded per-socket outbound queues and heartbeat liveness checks

pub mod application;
pub mod auth;
pub mod channel;
pub mod connection;
pub mod error;
pub mod message;
pub mod metrics;
pub mod namespace;
pub mod presence;
pub mod server;
pub mod trigger;

pub use application::{AppRegistry, Application};
pub use connection::manager::ConnectionManager;
pub use error::BrokerError;
pub use namespace::Namespace;
pub use presence::set::PresenceSet;
pub use server::RealtimeEngine;
pub use trigger::gateway::TriggerGateway;

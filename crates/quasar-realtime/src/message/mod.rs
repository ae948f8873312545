//! Socket wire messages, framing, and validation.

pub mod builder;
pub mod types;
pub mod validator;

pub use types::{EventName, InboundMessage, OutboundMessage, ProtocolEvent};

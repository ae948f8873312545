//! Channel naming and room membership.

pub mod registry;
pub mod room;
pub mod types;

pub use registry::RoomRegistry;
pub use room::Room;
pub use types::{ChannelName, ChannelType};

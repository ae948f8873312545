//! Presence channel membership.

pub mod member;
pub mod set;

pub use member::{MemberView, PresenceMember};
pub use set::{PresenceEvent, PresenceSet};

//! HMAC signing and channel authorization.

pub mod channel;
pub mod signature;

pub use channel::authorize_channel;
pub use signature::SignatureVerifier;

//! Signed HTTP publish pipeline.

pub mod gateway;
pub mod request;

pub use gateway::{TriggerGateway, TriggerOutcome, bearer_token};
pub use request::{TriggerEvent, TriggerRequest};

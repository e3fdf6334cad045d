//! Connection hub
//!
//! Owns the set of active observer connections and fans envelopes out to them.

mod error;
mod handler;
mod hub;

pub use error::HubError;
pub use handler::MessageHandler;
pub use hub::{Hub, HubCommand, HubHandle};

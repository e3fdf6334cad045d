//! Envelope protocol
//!
//! Defines the broadcast unit shared by the hub and every observer, and the
//! flattening used to project nested records onto it.

mod envelope;
mod flatten;

pub use envelope::{Envelope, EnvelopeKind, Payload};
pub use flatten::{flatten, flatten_value};

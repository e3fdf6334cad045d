//! Message relay
//!
//! MT intake, synthetic delivery receipts and MO forwarding.

mod error;
mod relay;

pub use error::{RelayError, REJECTED_STATUS};
pub use relay::Relay;

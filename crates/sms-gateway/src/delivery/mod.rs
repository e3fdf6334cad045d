//! Callback delivery
//!
//! Posts MO and DLR bodies to the URLs supplied with them.

mod courier;
mod error;
mod http;

pub use courier::{CallbackReply, Courier};
pub use error::DeliveryError;
pub use http::HttpCourier;

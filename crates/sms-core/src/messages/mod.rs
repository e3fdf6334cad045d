//! Gateway message records
//!
//! External-facing MT, MO and DLR records exchanged over HTTP.

pub mod constants;
mod dlr;
mod mo;
mod mt;

pub use dlr::{EffectiveBilling, MtDlr, DLR_CODE_DELIVERED, DLR_REASON_DELIVERED};
pub use mo::{derive_keyword, split_text, AddOns, MoMessage, MoReply, MO_URL_KEY};
pub use mt::{
    Auth, Billing, DlrRequest, MtErrorResponse, MtRequest, MtResponse, Service, ValidationProfile,
};

/// Generate a fresh message identifier
#[must_use]
pub fn generate_msg_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

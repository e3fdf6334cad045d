//! # sms-core
//!
//! Protocol layer: the broadcast envelope, the MT/MO/DLR records, their
//! validation and derivation rules, and the domain error taxonomy.
//! This crate has no dependencies on transport (web framework, sockets, HTTP client).

pub mod envelope;
pub mod error;
pub mod messages;

// Re-export commonly used types at crate root
pub use envelope::{flatten, flatten_value, Envelope, EnvelopeKind, Payload};
pub use error::{DomainError, CODE_MALFORMED, CODE_MISSING_MANDATORY};
pub use messages::{
    derive_keyword, generate_msg_id, split_text, AddOns, Auth, Billing, DlrRequest,
    EffectiveBilling, MoMessage, MoReply, MtDlr, MtErrorResponse, MtRequest, MtResponse, Service,
    ValidationProfile, DLR_CODE_DELIVERED, DLR_REASON_DELIVERED, MO_URL_KEY,
};

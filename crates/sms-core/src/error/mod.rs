//! Error types

mod domain_error;

pub use domain_error::{DomainError, CODE_MALFORMED, CODE_MISSING_MANDATORY};

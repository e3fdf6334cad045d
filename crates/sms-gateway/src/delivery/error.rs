//! Delivery errors
//!
//! Never surfaced to API callers; the relay logs them and moves on.

use std::time::Duration;

/// Failure posting to a callback URL
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("callback answered with status {0}")]
    Status(u16),

    #[error("unusable response body: {0}")]
    Body(String),
}

impl DeliveryError {
    /// Short label for log fields
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::Status(_) => "status",
            Self::Body(_) => "body",
        }
    }
}

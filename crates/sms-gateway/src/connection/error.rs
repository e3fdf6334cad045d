//! Transport errors
//!
//! Any of these tears down the one connection it happened on.

use std::time::Duration;

/// Failure on a single observer socket
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("socket error: {0}")]
    Socket(#[from] axum::Error),

    #[error("write did not complete within {0:?}")]
    WriteTimeout(Duration),

    #[error("no frame received within {0:?}")]
    ReadTimeout(Duration),

    #[error("unsupported frame: {0}")]
    Encoding(&'static str),
}

impl TransportError {
    /// Deadline expiries as opposed to socket failures
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::WriteTimeout(_) | Self::ReadTimeout(_))
    }
}

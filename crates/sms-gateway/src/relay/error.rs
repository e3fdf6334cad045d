//! Relay errors
//!
//! The only errors a submitter ever sees. Rendered as HTTP 420 with the
//! gateway's error body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sms_core::{DomainError, MtErrorResponse};

/// Status used for every rejected MT submission
pub const REJECTED_STATUS: u16 = 420;

/// Rejected MT submission
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl RelayError {
    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(REJECTED_STATUS).unwrap_or(StatusCode::BAD_REQUEST)
    }

    /// Get the gateway error code
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(err) => err.code(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Domain(err) => MtErrorResponse::from(err),
        };
        (status, Json(body)).into_response()
    }
}

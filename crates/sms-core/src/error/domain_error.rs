//! Domain errors - error types for the protocol layer

use thiserror::Error;

/// Error code returned to the MT submitter for an undecodable body
pub const CODE_MALFORMED: &str = "5";

/// Error code returned to the MT submitter when mandatory fields are absent
pub const CODE_MISSING_MANDATORY: &str = "110";

/// Protocol layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Mandatory parameter(s) is missing: {}", .missing.join(", "))]
    Validation { missing: Vec<String> },

    // =========================================================================
    // Decode Errors
    // =========================================================================
    #[error("Format of text/content parameter is wrong: {0}")]
    Decode(String),
}

impl DomainError {
    /// Create a validation error from the names of the missing fields
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Validation {
            missing: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a decode error from any displayable cause
    pub fn decode(cause: impl std::fmt::Display) -> Self {
        Self::Decode(cause.to_string())
    }

    /// Gateway error code for the MT response body
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => CODE_MISSING_MANDATORY,
            Self::Decode(_) => CODE_MALFORMED,
        }
    }

    /// Fixed human readable description sent as `errorDesc`
    pub fn description(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Mandatory parameter(s) is missing",
            Self::Decode(_) => "Format of text/content parameter is wrong",
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a decode error
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err)
    }
}

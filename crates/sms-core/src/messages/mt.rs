//! MT submission records
//!
//! `MtRequest` is the canonical nested schema (service, billing and DLR
//! request sub-records). The flat legacy body (`to`, `short_id`, `dlr_url`)
//! is not accepted: it decodes with every canonical field empty and fails
//! validation.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::constants::{DIRECTION_MT, MSG_TYPE_RESPONSE, STATUS_ERROR, STATUS_SUCCESS};
use crate::envelope::{flatten, Payload};
use crate::error::DomainError;

/// Authentication parameters (when needed)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Auth {
    pub username: String,
    pub password: String,
}

/// Billing parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Billing {
    pub currency: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_code: Option<String>,
}

/// Requested delivery receipt, including pass-through attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DlrRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_mask: Option<i32>,
    pub callback_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<BTreeMap<String, String>>,
}

/// Premium service data (keyword, session, originating MO, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    #[validate(length(min = 1))]
    pub service_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mo_msg_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_service_head: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_tail: Option<String>,
}

/// Which credentials an MT submission must carry besides the common fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationProfile {
    /// A positive `billing.price` is mandatory
    #[default]
    Priced,
    /// `auth.username` and `auth.password` are mandatory
    Authenticated,
}

impl FromStr for ValidationProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "priced" => Ok(Self::Priced),
            "authenticated" => Ok(Self::Authenticated),
            other => Err(format!("unknown validation profile '{other}'")),
        }
    }
}

/// MT request submitted to the gateway
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct MtRequest {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub direction: String,
    #[validate(length(min = 1))]
    pub operator: String,
    #[validate(length(min = 1))]
    pub sender: String,
    #[validate(length(min = 1))]
    pub receiver: String,
    pub dsc: String,
    #[validate(length(min = 1))]
    pub text: String,
    pub auth: Auth,
    pub dlr_request: DlrRequest,
    #[validate(nested)]
    pub service: Service,
    pub billing: Billing,
}

impl MtRequest {
    /// Decode a raw request body
    pub fn from_json(body: &[u8]) -> Result<Self, DomainError> {
        serde_json::from_slice(body).map_err(DomainError::from)
    }

    /// Check every mandatory field for the given profile
    ///
    /// All missing fields are reported at once, using their wire names.
    pub fn check(&self, profile: ValidationProfile) -> Result<(), DomainError> {
        let mut missing = Vec::new();
        if let Err(errors) = self.validate() {
            collect_missing(&errors, "", &mut missing);
        }

        match profile {
            ValidationProfile::Priced => {
                if self.billing.price.is_nan() || self.billing.price <= 0.0 {
                    missing.push("billing.price".to_string());
                }
            }
            ValidationProfile::Authenticated => {
                if self.auth.username.is_empty() {
                    missing.push("auth.username".to_string());
                }
                if self.auth.password.is_empty() {
                    missing.push("auth.password".to_string());
                }
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            missing.sort();
            Err(DomainError::Validation { missing })
        }
    }

    /// DLR callback URL, if one was requested
    pub fn callback_url(&self) -> Option<&str> {
        let url = self.dlr_request.callback_url.trim();
        (!url.is_empty()).then_some(url)
    }

    /// Flattened projection used as the MT envelope payload
    pub fn to_payload(&self) -> Result<Payload, serde_json::Error> {
        flatten(self)
    }
}

fn collect_missing(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let name = if prefix.is_empty() {
            camel_case(field)
        } else {
            format!("{prefix}.{}", camel_case(field))
        };

        match kind {
            ValidationErrorsKind::Field(_) => out.push(name),
            ValidationErrorsKind::Struct(inner) => collect_missing(inner, &name, out),
            ValidationErrorsKind::List(items) => {
                for inner in items.values() {
                    collect_missing(inner, &name, out);
                }
            }
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Successful MT response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MtResponse {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub direction: String,
    pub msg_id: String,
    pub status: String,
}

impl MtResponse {
    /// Response for an accepted submission
    #[must_use]
    pub fn accepted(msg_id: impl Into<String>) -> Self {
        Self {
            msg_type: MSG_TYPE_RESPONSE.to_string(),
            direction: DIRECTION_MT.to_string(),
            msg_id: msg_id.into(),
            status: STATUS_SUCCESS.to_string(),
        }
    }
}

/// Rejected MT response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MtErrorResponse {
    pub status: String,
    pub error_code: String,
    pub error_desc: String,
}

impl From<&DomainError> for MtErrorResponse {
    fn from(err: &DomainError) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            error_code: err.code().to_string(),
            error_desc: err.description().to_string(),
        }
    }
}

//! MO records and their derivation from observer envelopes

use serde::{Deserialize, Serialize};

use super::constants::{DIRECTION_MO, DSC_GSM, MSG_TYPE_TEXT, STATUS_SUCCESS};
use super::mt::Service;
use crate::envelope::Payload;

/// Payload key naming the URL an MO must be forwarded to
pub const MO_URL_KEY: &str = "url";

/// Deprecated flat keys still sent by the operator console, with their canonical names
const LEGACY_ALIASES: [(&str, &str); 3] = [
    ("sender", "from"),
    ("receiver", "short_id"),
    ("operator", "provider"),
];

/// Non-standard or rare message attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOns {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Mobile-originated message forwarded to a service callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub msg_id: String,
    pub direction: String,
    pub operator: String,
    pub sender: String,
    pub receiver: String,
    pub dsc: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_ons: Option<AddOns>,
    pub service: Service,
}

impl MoMessage {
    /// Build an MO from an observer payload
    ///
    /// The receiver is the short code; the keyword is the first word of the
    /// text joined to it with `@`.
    pub fn from_payload(payload: &Payload, msg_id: impl Into<String>) -> Self {
        let text = lookup(payload, "text").unwrap_or_default();
        let receiver = lookup(payload, "receiver").unwrap_or_default();
        let keyword = derive_keyword(text, receiver);
        let (head, tail) = split_text(text);

        let service = Service {
            service_id: lookup(payload, "serviceId").map_or_else(|| keyword.clone(), str::to_string),
            keyword: Some(keyword),
            country: lookup(payload, "country").map(str::to_string),
            text_service_head: Some(head.to_string()),
            text_tail: Some(tail.to_string()),
            ..Service::default()
        };

        Self {
            msg_type: MSG_TYPE_TEXT.to_string(),
            msg_id: msg_id.into(),
            direction: DIRECTION_MO.to_string(),
            operator: lookup(payload, "operator").unwrap_or_default().to_string(),
            sender: lookup(payload, "sender").unwrap_or_default().to_string(),
            receiver: receiver.to_string(),
            dsc: lookup(payload, "dsc").unwrap_or(DSC_GSM).to_string(),
            text: text.to_string(),
            add_ons: lookup(payload, "language").map(|language| AddOns {
                language: Some(language.to_string()),
            }),
            service,
        }
    }

    /// Derived keyword (`WORD@shortcode`)
    pub fn keyword(&self) -> &str {
        self.service.keyword.as_deref().unwrap_or_default()
    }
}

/// Look up a canonical key, falling back to its deprecated flat alias
fn lookup<'a>(payload: &'a Payload, key: &str) -> Option<&'a str> {
    if let Some(value) = payload.get(key) {
        return Some(value.as_str());
    }

    let (_, legacy) = LEGACY_ALIASES.iter().find(|(canonical, _)| *canonical == key)?;
    let value = payload.get(*legacy)?;
    tracing::debug!(key = %key, legacy = %legacy, "MO payload uses deprecated legacy key");
    Some(value.as_str())
}

/// First whitespace-delimited word of `text`, joined to `short_code` with `@`
pub fn derive_keyword(text: &str, short_code: &str) -> String {
    let word = text.split_whitespace().next().unwrap_or_default();
    format!("{word}@{short_code}")
}

/// Split text into service head and tail at the first whitespace boundary
///
/// Leading whitespace is ignored. The head keeps the whitespace run that
/// follows the first word: `"HELLO world"` → `("HELLO ", "world")`.
pub fn split_text(text: &str) -> (&str, &str) {
    let trimmed = text.trim_start();
    let Some(boundary) = trimmed.find(char::is_whitespace) else {
        return (trimmed, "");
    };

    let tail = trimmed[boundary..].trim_start();
    let head_end = trimmed.len() - tail.len();
    (&trimmed[..head_end], tail)
}

/// Reply body expected from an MO callback URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl MoReply {
    /// Read the reply from a flattened callback body
    pub fn from_payload(payload: &Payload) -> Self {
        Self {
            status: payload.get("status").cloned(),
        }
    }

    /// Reported status, or the success marker when the callback sent none
    pub fn status(&self) -> &str {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(STATUS_SUCCESS)
    }
}

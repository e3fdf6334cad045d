//! Envelope - the unit exchanged between the hub and every observer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Flat string-keyed envelope payload
pub type Payload = BTreeMap<String, String>;

/// Envelope kind
///
/// Serialized with the lowercase tags spoken by the operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// Mobile-originated message entered by an observer
    Mo,
    /// Outcome of forwarding an MO to its callback URL
    MoReply,
    /// Mobile-terminated message submitted over HTTP
    Mt,
}

impl EnvelopeKind {
    /// Wire tag of this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mo => "mo",
            Self::MoReply => "mo_reply",
            Self::Mt => "mt",
        }
    }
}

impl std::fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-agnostic message exchanged between the hub and its connections
///
/// The kind is fixed at construction; the payload never carries nested values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    kind: EnvelopeKind,

    #[serde(rename = "data", default)]
    payload: Payload,
}

impl Envelope {
    /// Create an envelope
    #[must_use]
    pub fn new(kind: EnvelopeKind, payload: Payload) -> Self {
        Self { kind, payload }
    }

    /// Create an MT envelope
    #[must_use]
    pub fn mt(payload: Payload) -> Self {
        Self::new(EnvelopeKind::Mt, payload)
    }

    /// Create an MO envelope
    #[must_use]
    pub fn mo(payload: Payload) -> Self {
        Self::new(EnvelopeKind::Mo, payload)
    }

    /// Create an MO reply carrying the forwarding status
    #[must_use]
    pub fn mo_reply(status: impl Into<String>) -> Self {
        let mut payload = Payload::new();
        payload.insert("status".to_string(), status.into());
        Self::new(EnvelopeKind::MoReply, payload)
    }

    /// Envelope kind
    #[must_use]
    pub fn kind(&self) -> EnvelopeKind {
        self.kind
    }

    /// Envelope payload
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Look up a payload value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a JSON text frame
    pub fn from_json(json: &str) -> Result<Self, DomainError> {
        serde_json::from_str(json).map_err(DomainError::from)
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Envelope(type={}, fields={})", self.kind, self.payload.len())
    }
}

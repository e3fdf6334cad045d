//! Outbound callback delivery

use async_trait::async_trait;
use serde_json::Value;
use sms_core::Payload;

use super::DeliveryError;

/// Body returned by a callback URL, flattened to string values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackReply(Payload);

impl CallbackReply {
    /// Wrap an already flattened body
    #[must_use]
    pub fn new(payload: Payload) -> Self {
        Self(payload)
    }

    /// Get a field by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Borrow the flattened body
    pub fn payload(&self) -> &Payload {
        &self.0
    }
}

/// Posts JSON bodies to callback URLs
///
/// Only an HTTP 200 with a JSON object body counts as delivered.
#[async_trait]
pub trait Courier: Send + Sync + 'static {
    async fn post_json(&self, url: &str, body: &Value) -> Result<CallbackReply, DeliveryError>;
}

//! HTTP courier backed by reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use sms_core::flatten_value;

use super::{CallbackReply, Courier, DeliveryError};

/// Courier that POSTs JSON over HTTP with a per-call timeout
#[derive(Debug, Clone)]
pub struct HttpCourier {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpCourier {
    /// Build a courier whose calls give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(DeliveryError::Transport)?;
        Ok(Self::with_client(client, timeout))
    }

    /// Use an existing client
    #[must_use]
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    fn map_error(&self, err: reqwest::Error) -> DeliveryError {
        if err.is_timeout() {
            DeliveryError::Timeout(self.timeout)
        } else {
            DeliveryError::Transport(err)
        }
    }
}

#[async_trait]
impl Courier for HttpCourier {
    async fn post_json(&self, url: &str, body: &Value) -> Result<CallbackReply, DeliveryError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DeliveryError::Status(status.as_u16()));
        }

        let reply: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                DeliveryError::Timeout(self.timeout)
            } else {
                DeliveryError::Body(e.to_string())
            }
        })?;

        if !reply.is_object() {
            return Err(DeliveryError::Body(format!("expected a JSON object, got {reply}")));
        }

        Ok(CallbackReply::new(flatten_value(&reply)))
    }
}

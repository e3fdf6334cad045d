//! MT/MO/DLR relay
//!
//! Accepts MT submissions and fans them out to observers, synthesizes DLRs,
//! and forwards observer-originated MOs to their service callbacks.

use std::sync::Arc;

use serde::Serialize;
use sms_common::RelayConfig;
use sms_core::{
    generate_msg_id, DomainError, Envelope, EnvelopeKind, MoMessage, MoReply, MtDlr, MtRequest,
    MtResponse, MO_URL_KEY,
};

use super::RelayError;
use crate::delivery::Courier;
use crate::hub::{HubHandle, MessageHandler};

/// Routes messages between submitters, observers and callback URLs
#[derive(Clone)]
pub struct Relay {
    hub: HubHandle,
    courier: Arc<dyn Courier>,
    config: RelayConfig,
}

impl Relay {
    /// Create a relay broadcasting through `hub` and posting through `courier`
    pub fn new(hub: HubHandle, courier: Arc<dyn Courier>, config: RelayConfig) -> Self {
        Self {
            hub,
            courier,
            config,
        }
    }

    /// Accept an MT submission
    ///
    /// Nothing is broadcast or scheduled unless every mandatory field is present.
    /// The MT envelope is queued before the response is returned; a DLR is
    /// scheduled only when the request carries a callback URL.
    pub async fn submit_mt(&self, request: MtRequest) -> Result<MtResponse, RelayError> {
        if let Err(err) = request.check(self.config.validation_profile) {
            if let DomainError::Validation { missing } = &err {
                tracing::warn!(
                    missing = ?missing,
                    profile = ?self.config.validation_profile,
                    "MT rejected: mandatory fields missing"
                );
            }
            return Err(err.into());
        }

        match request.to_payload() {
            Ok(payload) => {
                if let Err(e) = self.hub.broadcast(Envelope::mt(payload)).await {
                    tracing::warn!(error = %e, "MT broadcast skipped");
                }
            }
            Err(e) => tracing::error!(error = %e, "Failed to flatten MT request"),
        }

        let msg_id = generate_msg_id();
        tracing::info!(
            msg_id = %msg_id,
            operator = %request.operator,
            receiver = %request.receiver,
            "MT accepted"
        );

        if let Some(url) = request.callback_url() {
            let dlr = MtDlr::delivered(&request, &msg_id, self.config.dlr_kickback);
            self.schedule_dlr(url.to_string(), dlr);
        }

        Ok(MtResponse::accepted(msg_id))
    }

    /// Post a synthetic DLR after the configured delay, once
    fn schedule_dlr(&self, url: String, dlr: MtDlr) {
        let courier = self.courier.clone();
        let delay = self.config.dlr_delay();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let msg_id = dlr.msg_id.clone();
            match deliver(courier.as_ref(), &url, &dlr).await {
                Ok(()) => tracing::info!(msg_id = %msg_id, url = %url, "DLR delivered"),
                Err(e) => tracing::warn!(msg_id = %msg_id, url = %url, error = %e, "DLR not delivered"),
            }
        });
    }

    /// Forward an observer MO to the URL it names and broadcast the reply
    ///
    /// Envelopes without a URL are dropped. Failed deliveries produce no reply.
    pub async fn forward_mo(&self, envelope: Envelope) {
        let url = match envelope.get(MO_URL_KEY).map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                tracing::warn!(kind = %envelope.kind(), "MO dropped: no callback url");
                return;
            }
        };

        let msg_id = generate_msg_id();
        let mo = MoMessage::from_payload(envelope.payload(), &msg_id);
        tracing::debug!(msg_id = %msg_id, url = %url, keyword = %mo.keyword(), "Forwarding MO");

        let body = match serde_json::to_value(&mo) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(msg_id = %msg_id, error = %e, "Failed to encode MO");
                return;
            }
        };

        let reply = match self.courier.post_json(&url, &body).await {
            Ok(reply) => MoReply::from_payload(reply.payload()),
            Err(e) => {
                tracing::warn!(
                    msg_id = %msg_id,
                    url = %url,
                    kind = e.kind(),
                    error = %e,
                    "MO not delivered"
                );
                return;
            }
        };

        tracing::info!(msg_id = %msg_id, status = reply.status(), "MO delivered");
        if let Err(e) = self.hub.broadcast(Envelope::mo_reply(reply.status())).await {
            tracing::warn!(msg_id = %msg_id, error = %e, "MO reply broadcast skipped");
        }
    }
}

async fn deliver<T: Serialize>(
    courier: &dyn Courier,
    url: &str,
    record: &T,
) -> Result<(), crate::delivery::DeliveryError> {
    let body = serde_json::to_value(record)
        .map_err(|e| crate::delivery::DeliveryError::Body(e.to_string()))?;
    courier.post_json(url, &body).await.map(|_| ())
}

impl MessageHandler for Relay {
    fn handle(&self, envelope: Envelope) {
        if envelope.kind() != EnvelopeKind::Mo {
            tracing::trace!(kind = %envelope.kind(), "Ignoring non-MO envelope");
            return;
        }

        let relay = self.clone();
        tokio::spawn(async move { relay.forward_mo(envelope).await });
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("hub", &self.hub)
            .field("config", &self.config)
            .finish()
    }
}

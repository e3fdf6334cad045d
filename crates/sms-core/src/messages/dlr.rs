//! Delivery receipt records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::constants::MSG_TYPE_DLR;
use super::mt::MtRequest;

/// DLR code reported for a delivered message
pub const DLR_CODE_DELIVERED: i32 = 1;

/// DLR reason reported for a delivered message
pub const DLR_REASON_DELIVERED: &str = "DELIVERED";

/// How a message was actually billed for this event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveBilling {
    pub currency: String,
    pub price: f64,
    pub kickback: f64,
}

/// Delivery receipt for an MT message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MtDlr {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub msg_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_msg_parts: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_part: Option<i32>,
    pub operator: String,
    pub sender: String,
    pub receiver: String,
    pub dlr_code: i32,
    pub dlr_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<BTreeMap<String, String>>,
    pub custom_mask: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
    pub effective_billing: EffectiveBilling,
}

impl MtDlr {
    /// Synthesize a "delivered" receipt for an accepted submission
    ///
    /// Billing is mirrored from the request; the pass-through custom data
    /// and events mask come from its DLR request.
    #[must_use]
    pub fn delivered(request: &MtRequest, msg_id: impl Into<String>, kickback: f64) -> Self {
        Self {
            msg_type: MSG_TYPE_DLR.to_string(),
            msg_id: msg_id.into(),
            total_msg_parts: None,
            msg_part: None,
            operator: request.operator.clone(),
            sender: request.sender.clone(),
            receiver: request.receiver.clone(),
            dlr_code: DLR_CODE_DELIVERED,
            dlr_reason: DLR_REASON_DELIVERED.to_string(),
            custom_data: request.dlr_request.custom_data.clone(),
            custom_mask: request.dlr_request.events_mask.unwrap_or_default(),
            custom_url: None,
            effective_billing: EffectiveBilling {
                currency: request.billing.currency.clone(),
                price: request.billing.price,
                kickback,
            },
        }
    }
}

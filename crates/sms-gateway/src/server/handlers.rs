//! HTTP and WebSocket handlers

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State, WebSocketUpgrade},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sms_core::{DomainError, MtRequest, MtResponse};

use crate::connection::serve_socket;
use crate::relay::RelayError;
use crate::server::GatewayState;

/// Largest MT body accepted on POST /mt
pub const MT_BODY_LIMIT: usize = 64 * 1024;

/// Submit an MT message
///
/// POST /mt. An unreadable or oversized body is rejected like malformed JSON.
pub async fn submit_mt(
    State(state): State<GatewayState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<MtResponse>), RelayError> {
    let request = body
        .map_err(|rejection| DomainError::decode(rejection.body_text()))
        .and_then(|body| MtRequest::from_json(&body))
        .map_err(|e: DomainError| {
            tracing::warn!(error = %e, "MT rejected: malformed body");
            e
        })?;

    let response = state.relay().submit_mt(request).await?;
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Observer WebSocket endpoint, open to any origin
///
/// GET /ws
pub async fn observer_socket(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let config = state.config().connection.clone();
    let hub = state.hub().clone();

    ws.max_message_size(config.max_message_size)
        .max_frame_size(config.max_message_size)
        .on_upgrade(move |socket| serve_socket(socket, hub, config))
}

/// Health check response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub connections: usize,
}

/// Liveness check reporting the number of observers
///
/// GET /health
pub async fn health_check(State(state): State<GatewayState>) -> (StatusCode, Json<HealthResponse>) {
    match state.hub().active_count().await {
        Ok(connections) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                connections,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    connections: 0,
                }),
            )
        }
    }
}

//! Gateway Integration Tests
//!
//! Each test runs a full gateway on an ephemeral port. Callback URLs point at
//! wiremock servers, observers are tokio-tungstenite clients.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::time::Duration;

use integration_tests::{
    assert_json, assert_status, console_dir, fixtures::*, test_config, Observer, TestServer,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sms_core::{EnvelopeKind, MtErrorResponse, MtResponse};
use sms_gateway::server::{HealthResponse, MT_BODY_LIMIT};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rejected() -> StatusCode {
    StatusCode::from_u16(420).unwrap()
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    let health: HealthResponse = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.connections, 0);
}

#[tokio::test]
async fn test_health_counts_observers() {
    let server = TestServer::start().await.expect("Failed to start server");

    let first = server.observer().await.unwrap();
    let _second = server.observer().await.unwrap();
    assert_eq!(server.connections().await.unwrap(), 2);

    first.close().await.unwrap();
    server.wait_for_connections(1).await.unwrap();
}

#[tokio::test]
async fn test_request_id_is_returned() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// MT Tests
// ============================================================================

#[tokio::test]
async fn test_mt_accepted_and_broadcast() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut observer = server.observer().await.unwrap();

    let response = server.post("/mt", &mt_body("")).await.unwrap();
    let accepted: MtResponse = assert_json(response, StatusCode::ACCEPTED).await.unwrap();

    assert_eq!(accepted.msg_type, "response");
    assert_eq!(accepted.direction, "MT");
    assert_eq!(accepted.status, "success");
    assert!(!accepted.msg_id.is_empty());

    let envelope = observer.next_envelope().await.unwrap();
    assert_eq!(envelope.kind(), EnvelopeKind::Mt);
    assert_eq!(envelope.get("sender"), Some("7777"));
    assert_eq!(envelope.get("receiver"), Some("+48601222333"));
    assert_eq!(envelope.get("auth.username"), Some("partner"));
    assert_eq!(envelope.get("billing.price"), Some("2.46"));
    assert_eq!(envelope.get("service.serviceId"), Some("vote-2026"));
    assert_eq!(envelope.get("dlrRequest.customData.campaign"), Some("spring"));
}

#[tokio::test]
async fn test_mt_reaches_every_observer() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut observers = vec![
        server.observer().await.unwrap(),
        server.observer().await.unwrap(),
        server.observer().await.unwrap(),
    ];

    let response = server.post("/mt", &mt_body("")).await.unwrap();
    assert_status(response, StatusCode::ACCEPTED).await.unwrap();

    for observer in &mut observers {
        let envelope = observer.next_envelope().await.unwrap();
        assert_eq!(envelope.kind(), EnvelopeKind::Mt);
    }
}

#[tokio::test]
async fn test_mt_ids_are_unique() {
    let server = TestServer::start().await.expect("Failed to start server");

    let a: MtResponse = assert_json(server.post("/mt", &mt_body("")).await.unwrap(), StatusCode::ACCEPTED)
        .await
        .unwrap();
    let b: MtResponse = assert_json(server.post("/mt", &mt_body("")).await.unwrap(), StatusCode::ACCEPTED)
        .await
        .unwrap();

    assert_ne!(a.msg_id, b.msg_id);
}

#[tokio::test]
async fn test_mt_missing_fields_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut observer = server.observer().await.unwrap();

    let mut body = mt_body("");
    body["sender"] = json!("");
    body["service"]["serviceId"] = json!("");

    let response = server.post("/mt", &body).await.unwrap();
    let error: MtErrorResponse = assert_json(response, rejected()).await.unwrap();

    assert_eq!(error.status, "error");
    assert_eq!(error.error_code, "110");
    assert!(!error.error_desc.is_empty());
    observer.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_mt_zero_price_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");

    let mut body = mt_body("");
    body["billing"]["price"] = json!(0);

    let response = server.post("/mt", &body).await.unwrap();
    let error: MtErrorResponse = assert_json(response, rejected()).await.unwrap();
    assert_eq!(error.error_code, "110");
}

#[tokio::test]
async fn test_mt_malformed_body_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut observer = server.observer().await.unwrap();

    let response = server.post_raw("/mt", "{\"sender\": ").await.unwrap();
    let error: MtErrorResponse = assert_json(response, rejected()).await.unwrap();

    assert_eq!(error.error_code, "5");
    observer.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_mt_oversized_body_rejected_as_malformed() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut observer = server.observer().await.unwrap();

    let body = format!("{{\"text\": \"{}\"}}", "x".repeat(MT_BODY_LIMIT));
    let response = server.post_raw("/mt", body).await.unwrap();
    let error: MtErrorResponse = assert_json(response, rejected()).await.unwrap();

    assert_eq!(error.error_code, "5");
    observer.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_mt_legacy_shape_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.post("/mt", &legacy_mt_body()).await.unwrap();
    let error: MtErrorResponse = assert_json(response, rejected()).await.unwrap();
    assert_eq!(error.error_code, "110");
}

// ============================================================================
// DLR Tests
// ============================================================================

#[tokio::test]
async fn test_dlr_delivered_after_delay() {
    let callback = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/dlr"))
        .and(body_partial_json(json!({
            "type": "dlr",
            "operator": "PLUS",
            "sender": "7777",
            "receiver": "+48601222333",
            "dlrCode": 1,
            "dlrReason": "DELIVERED",
            "customMask": 3,
            "customData": {"campaign": "spring"},
            "effectiveBilling": {"currency": "PLN", "price": 2.46, "kickback": 0.0}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&callback)
        .await;

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server
        .post("/mt", &mt_body(&format!("{}/dlr", callback.uri())))
        .await
        .unwrap();
    let accepted: MtResponse = assert_json(response, StatusCode::ACCEPTED).await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;

    let received = callback.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let body: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(body["msgId"], accepted.msg_id);
}

#[tokio::test]
async fn test_no_dlr_without_callback_url() {
    let callback = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&callback)
        .await;

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.post("/mt", &mt_body("")).await.unwrap();
    assert_status(response, StatusCode::ACCEPTED).await.unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;
}

#[tokio::test]
async fn test_failed_dlr_does_not_affect_response() {
    let callback = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&callback)
        .await;

    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.post("/mt", &mt_body(&callback.uri())).await.unwrap();
    assert_status(response, StatusCode::ACCEPTED).await.unwrap();

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(server.connections().await.unwrap(), 0);
}

// ============================================================================
// MO Tests
// ============================================================================

#[tokio::test]
async fn test_mo_forwarded_and_reply_broadcast() {
    let service = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mo"))
        .and(body_partial_json(json!({
            "type": "text",
            "direction": "MO",
            "operator": "PLUS",
            "sender": "+48601222333",
            "receiver": "7777",
            "dsc": "GSM",
            "text": "HELLO world",
            "service": {
                "serviceId": "HELLO@7777",
                "keyword": "HELLO@7777",
                "textServiceHead": "HELLO ",
                "textTail": "world"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "accepted"})))
        .expect(1)
        .mount(&service)
        .await;

    let server = TestServer::start().await.expect("Failed to start server");
    let mut console = server.observer().await.unwrap();
    let mut watcher = server.observer().await.unwrap();

    console
        .send(&mo_envelope(&format!("{}/mo", service.uri()), "HELLO world"))
        .await
        .unwrap();

    for observer in [&mut console, &mut watcher] {
        let reply = observer.next_envelope().await.unwrap();
        assert_eq!(reply.kind(), EnvelopeKind::MoReply);
        assert_eq!(reply.get("status"), Some("accepted"));
    }
}

#[tokio::test]
async fn test_legacy_mo_keys_are_accepted() {
    let service = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operator": "PLUS",
            "sender": "+48601222333",
            "receiver": "7777",
            "service": {"keyword": "STOP@7777"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&service)
        .await;

    let server = TestServer::start().await.expect("Failed to start server");
    let mut console = server.observer().await.unwrap();

    console
        .send(&legacy_mo_envelope(&service.uri(), "STOP"))
        .await
        .unwrap();

    let reply = console.next_envelope().await.unwrap();
    assert_eq!(reply.kind(), EnvelopeKind::MoReply);
    assert_eq!(reply.get("status"), Some("success"));
}

#[tokio::test]
async fn test_failed_mo_has_no_reply() {
    let service = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&service)
        .await;

    let server = TestServer::start().await.expect("Failed to start server");
    let mut console = server.observer().await.unwrap();

    console
        .send(&mo_envelope(&service.uri(), "HELLO"))
        .await
        .unwrap();

    console.expect_silence().await.unwrap();
}

#[tokio::test]
async fn test_garbage_frames_are_ignored() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut console = server.observer().await.unwrap();

    console.send_text("definitely not json").await.unwrap();
    console.send_text(r#"{"type":"mt","data":{}}"#).await.unwrap();

    console.expect_silence().await.unwrap();
    assert_eq!(server.connections().await.unwrap(), 1);
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_hub_shutdown_closes_observers() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut observer = server.observer().await.unwrap();

    server.state.hub().shutdown().await.unwrap();

    assert!(observer.next_envelope_within(Duration::from_secs(3)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_direct_observer_connect() {
    let server = TestServer::start().await.expect("Failed to start server");

    let observer = Observer::connect(&server.ws_url()).await.unwrap();
    server.wait_for_connections(1).await.unwrap();
    observer.close().await.unwrap();
    server.wait_for_connections(0).await.unwrap();
}

// ============================================================================
// Console Tests
// ============================================================================

#[tokio::test]
async fn test_console_served_as_fallback() {
    let dir = console_dir("<h1>SMS console</h1>").unwrap();
    let mut config = test_config();
    config.server.static_dir = dir.to_string_lossy().into_owned();

    let server = TestServer::start_with_config(config)
        .await
        .expect("Failed to start server");

    let response = server.get("/index.html").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("SMS console"));

    let response = server.get("/missing.js").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(dir).ok();
}

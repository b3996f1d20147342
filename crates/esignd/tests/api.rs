//! Daemon surface tests: the router is exercised in-process, no network
//! and no real provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use esign_core::config::ProviderConfig;
use esign_core::types::{Signature, SignatureType};
use esign_engine::store::SignatureStore;
use esignd::router::build_router;
use esignd::state::AppState;

/// Router over a temp store seeded with one two-signer envelope.
fn test_app(dir: &std::path::Path) -> (Router, Signature) {
    let store = SignatureStore::open(dir).unwrap();

    let mut sig = Signature::new("A very simple PDF document", SignatureType::document_based());
    sig.add_signer("john@example.com", "John Accentué", 1);
    sig.add_signer("paul@example.com", "Paul Doe", 2);
    sig.assign_backend_id("env-100");
    store.insert(&sig).unwrap();

    let state = AppState::new(Arc::new(store), ProviderConfig::default());
    (build_router(state), sig)
}

async fn request(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json)
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

async fn get_envelope(app: &Router, envelope_id: &str) -> Value {
    let (status, body) = request(app, "GET", &format!("/signatures/{envelope_id}"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    serde_json::from_str(&body).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    let (status, body) = request(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ok"));
}

#[tokio::test]
async fn notification_updates_signers_and_acks() {
    let dir = tempfile::tempdir().unwrap();
    let (app, sig) = test_app(dir.path());

    let payload = json!({
        "EnvelopeId": "env-100",
        "Subject": "A very simple PDF document",
        "Sent": "2014-10-06T01:10:01.000012",
        "RecipientStatuses": sig.signers.iter().map(|s| json!({
            "Email": s.email,
            "UserName": s.full_name,
            "ClientUserId": s.id.to_string(),
            "Status": "Sent",
            "Sent": "2014-10-06T01:10:01.000012",
        })).collect::<Vec<_>>(),
    });

    let (status, body) = request(&app, "POST", "/notifications", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");

    let envelope = get_envelope(&app, "env-100").await;
    assert_eq!(envelope["status"], "sent");
    assert_eq!(envelope["signers"][0]["status"], "sent");
    assert_eq!(envelope["signers"][1]["status"], "sent");
}

#[tokio::test]
async fn decline_reason_flows_through_to_state() {
    let dir = tempfile::tempdir().unwrap();
    let (app, sig) = test_app(dir.path());

    let payload = json!({
        "EnvelopeId": "env-100",
        "Status": "Declined",
        "Declined": "2014-10-06T01:10:05.000012",
        "RecipientStatuses": [{
            "ClientUserId": sig.signers[1].id.to_string(),
            "Status": "Declined",
            "Declined": "2014-10-06T01:10:05.000012",
            "DeclineReason": "Do not sign a test!",
        }],
    });

    let (status, _) = request(&app, "POST", "/notifications", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);

    let envelope = get_envelope(&app, "env-100").await;
    assert_eq!(envelope["status"], "declined");
    assert_eq!(envelope["signers"][1]["status"], "declined");
    assert_eq!(envelope["signers"][1]["status_details"], "Do not sign a test!");
    assert_eq!(envelope["signers"][0]["status_details"], "");
}

#[tokio::test]
async fn duplicate_notification_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (app, sig) = test_app(dir.path());

    let payload = json!({
        "EnvelopeId": "env-100",
        "RecipientStatuses": [{
            "ClientUserId": sig.signers[0].id.to_string(),
            "Status": "Delivered",
            "Delivered": "2014-10-06T01:10:02.000012",
        }],
    });

    for _ in 0..2 {
        let (status, body) =
            request(&app, "POST", "/notifications", Some(payload.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    let envelope = get_envelope(&app, "env-100").await;
    assert_eq!(envelope["signers"][0]["status"], "delivered");
    // Second draft signer keeps the envelope at the minimum progression.
    assert_eq!(envelope["status"], "draft");
}

#[tokio::test]
async fn unknown_envelope_is_acknowledged() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    let payload = json!({
        "EnvelopeId": "nobody-home",
        "RecipientStatuses": [{"ClientUserId": "rcpt-1", "Status": "Sent"}],
    });
    let (status, body) = request(&app, "POST", "/notifications", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn unparseable_payload_is_the_only_rejection() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    let (status, _) = request(
        &app,
        "POST",
        "/notifications",
        Some("this is not json".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Valid JSON missing the envelope identifier is structurally
    // malformed too.
    let (status, _) = request(&app, "POST", "/notifications", Some("{}".to_string())).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn reading_an_unknown_envelope_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    let (status, body) = request(&app, "GET", "/signatures/ghost", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("NOT_FOUND"));
}

#[tokio::test]
async fn create_without_provider_config_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    let payload = json!({
        "title": "Contract",
        "document_base64": "JVBERi0xLjQ=",
        "signers": [{"email": "john@example.com", "full_name": "John"}],
    });
    let (status, body) = request(&app, "POST", "/signatures", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert!(body.contains("CONFIG_INCOMPLETE"));
}

#[tokio::test]
async fn create_with_unusable_timeout_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    // All auth fields present, so the rejection is specifically the
    // negative timeout and not a missing credential.
    let payload = json!({
        "title": "Contract",
        "document_base64": "JVBERi0xLjQ=",
        "signers": [{"email": "john@example.com", "full_name": "John"}],
        "settings": {
            "root_url": "https://demo.docusign.net/restapi/v2",
            "username": "user@example.com",
            "password": "secret",
            "integrator_key": "key-123",
            "account_id": "acct-1",
            "timeout": -5,
        },
    });
    let (status, body) = request(&app, "POST", "/signatures", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert!(body.contains("CONFIG_INCOMPLETE"));
    assert!(body.contains("timeout"), "{body}");
}

#[tokio::test]
async fn create_validates_its_input() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    // No signers.
    let payload = json!({
        "title": "Contract",
        "document_base64": "JVBERi0xLjQ=",
        "signers": [],
    });
    let (status, _) = request(&app, "POST", "/signatures", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Neither document nor template.
    let payload = json!({
        "title": "Contract",
        "signers": [{"email": "john@example.com", "full_name": "John"}],
    });
    let (status, _) = request(&app, "POST", "/signatures", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Zero signing order.
    let payload = json!({
        "title": "Contract",
        "document_base64": "JVBERi0xLjQ=",
        "signers": [{"email": "john@example.com", "full_name": "John", "signing_order": 0}],
    });
    let (status, _) = request(&app, "POST", "/signatures", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Broken base64 document.
    let payload = json!({
        "title": "Contract",
        "document_base64": "!!!not-base64!!!",
        "signers": [{"email": "john@example.com", "full_name": "John"}],
    });
    let (status, _) = request(&app, "POST", "/signatures", Some(payload.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sign_url_for_unknown_envelope_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    let (status, body) = request(
        &app,
        "GET",
        "/signatures/ghost/signers/rcpt-1/sign-url?return_url=https://example.com/done",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("NOT_FOUND"));
}

#[tokio::test]
async fn sign_url_for_unknown_recipient_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _sig) = test_app(dir.path());

    let (status, body) = request(
        &app,
        "GET",
        "/signatures/env-100/signers/not-a-recipient/sign-url?return_url=https://example.com/done",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("NOT_FOUND"));
}

#[tokio::test]
async fn sign_url_without_provider_config_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let (app, sig) = test_app(dir.path());

    // The recipient resolves; the empty process configuration is what
    // fails, before any call leaves the process.
    let recipient_id = sig.signers[0].id.to_string();
    let (status, body) = request(
        &app,
        "GET",
        &format!("/signatures/env-100/signers/{recipient_id}/sign-url?return_url=https://example.com/done"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
    assert!(body.contains("CONFIG_INCOMPLETE"));
}

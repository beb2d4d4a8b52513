//! Black-box tests over the HTTP surface: verification handshake, health,
//! and webhook delivery acknowledgement.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use dukaan_api::app::{build_app, services::AppServices};
use dukaan_infra::{FixedTranscriber, InMemoryStore, KeywordClassifier, RecordingSender};

fn test_app() -> axum::Router {
    let services = Arc::new(AppServices::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(KeywordClassifier::new()),
        Arc::new(FixedTranscriber::unavailable()),
        Arc::new(RecordingSender::new()),
    ));
    build_app(services, "sesame".to_string())
}

#[tokio::test]
async fn health_is_ok() {
    let response = test_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn verification_echoes_challenge_on_token_match() {
    let response = test_app()
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=sesame&hub.challenge=42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"42");
}

#[tokio::test]
async fn verification_rejects_wrong_token() {
    let response = test_app()
        .oneshot(
            Request::get("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delivery_is_acknowledged_even_for_unknown_sender() {
    let payload = serde_json::json!({
        "entry": [{
            "changes": [{
                "value": {
                    "messages": [{
                        "from": "910000000000",
                        "type": "text",
                        "text": { "body": "hello" }
                    }]
                }
            }]
        }]
    });
    let response = test_app()
        .oneshot(
            Request::post("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Extension, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{error, info};

use crate::app::services::AppServices;
use crate::app::{dto, errors, VerifyToken};

/// Subscription handshake: echo the challenge when the verify token matches.
pub async fn verify(
    Extension(token): Extension<VerifyToken>,
    Query(params): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let mode = params.get("hub.mode").map(String::as_str);
    let sent_token = params.get("hub.verify_token").map(String::as_str);
    let challenge = params.get("hub.challenge");

    match (mode, sent_token, challenge) {
        (Some("subscribe"), Some(sent), Some(challenge)) if sent == token.0.as_ref() => {
            info!("webhook verified");
            (StatusCode::OK, challenge.clone()).into_response()
        }
        _ => errors::json_error(
            StatusCode::FORBIDDEN,
            "verification_failed",
            "verify token mismatch",
        ),
    }
}

/// Inbound message delivery.
///
/// Always answers 200 once the payload parses: the channel provider retries
/// non-2xx responses, and a redelivered event must not re-run the pipeline
/// side effects. Per-message failures are logged and swallowed.
pub async fn receive(
    Extension(services): Extension<Arc<AppServices>>,
    Json(payload): Json<dto::WebhookPayload>,
) -> axum::response::Response {
    for message in payload.into_messages() {
        if let Err(err) = services.process_message(message).await {
            error!(error = %err, "message pipeline failed");
        }
    }
    Json(serde_json::json!({ "status": "received" })).into_response()
}

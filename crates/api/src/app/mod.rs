//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the message pipeline (sender classification, intent
//!   dispatch, negotiation transitions, notification fan-out)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: transport envelope DTOs and mapping into the inbound model
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Webhook verification token shared with the channel provider.
#[derive(Clone)]
pub struct VerifyToken(pub Arc<str>);

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>, verify_token: String) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .route(
            "/webhook",
            get(routes::webhook::verify).post(routes::webhook::receive),
        )
        .layer(Extension(services))
        .layer(Extension(VerifyToken(verify_token.into())))
        .layer(ServiceBuilder::new())
}

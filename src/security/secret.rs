//! Optional shared-secret gate for the chat endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::http::request::request_id;
use crate::http::response::RelayError;

/// Headers that may carry the shared secret.
pub const SECRET_HEADERS: [&str; 2] = ["x-proxy-secret", "x-proxy-token"];

/// Checks inbound requests against the configured secret.
#[derive(Clone)]
pub struct SecretGuard {
    secret: Option<String>,
}

impl SecretGuard {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    pub fn is_enabled(&self) -> bool {
        self.secret.is_some()
    }

    /// True when auth is disabled or either recognized header matches exactly.
    pub fn authorizes(&self, headers: &HeaderMap) -> bool {
        let Some(secret) = &self.secret else {
            return true;
        };

        SECRET_HEADERS.iter().any(|name| {
            headers
                .get(*name)
                .map(|value| constant_time_eq(value.as_bytes(), secret.as_bytes()))
                .unwrap_or(false)
        })
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Middleware rejecting requests that fail [`SecretGuard::authorizes`].
pub async fn require_shared_secret(
    State(guard): State<Arc<SecretGuard>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if guard.authorizes(request.headers()) {
        return next.run(request).await;
    }

    tracing::warn!(
        request_id = %request_id(request.headers()),
        "Rejected request with missing or invalid proxy secret"
    );
    RelayError::InvalidSecret.into_response()
}

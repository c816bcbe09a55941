//! Origin allow-list guard.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::http::response::RelayError;

/// Which browser origins may call the relay.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allow_all: bool,
    origins: HashSet<String>,
}

impl OriginPolicy {
    /// Build from the configured list. Empty or `*` allows everything.
    pub fn new(allowed: &[String]) -> Self {
        let allow_all = allowed.is_empty() || allowed.iter().any(|o| o == "*");
        Self {
            allow_all,
            origins: allowed.iter().cloned().collect(),
        }
    }

    /// Requests without an `Origin` header are non-browser callers and pass.
    /// An empty header counts as absent.
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match origin {
            None | Some("") => true,
            Some(_) if self.allow_all => true,
            Some(origin) => self.origins.contains(origin),
        }
    }
}

/// Reject requests from origins outside the allow-list before any body is read.
pub async fn origin_guard(
    State(policy): State<Arc<OriginPolicy>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let allowed = match request.headers().get(header::ORIGIN) {
        None => true,
        Some(value) if value.is_empty() => true,
        Some(value) => match value.to_str() {
            Ok(origin) => policy.allows(Some(origin)),
            Err(_) => policy.allow_all,
        },
    };

    if allowed {
        return next.run(request).await;
    }

    tracing::warn!(
        origin = ?request.headers().get(header::ORIGIN),
        path = %request.uri().path(),
        "Origin not allowed"
    );
    RelayError::OriginNotAllowed.into_response()
}

/// CORS response headers for origins that passed [`origin_guard`].
///
/// The guard has already filtered the origin, so it is mirrored back.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers(AllowHeaders::mirror_request())
}

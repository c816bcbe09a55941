//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Map relay failures to HTTP status codes
//! - Render every locally-generated error as `{"error": "..."}`
//! - Keep internal failure details out of client responses
//!
//! # Design Decisions
//! - Upstream error replies are not errors here; they are relayed verbatim
//! - Internal failures share one fixed message; the cause is only logged

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message returned for every internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Proxy internal error";

/// JSON body of locally-generated error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// Errors produced while handling a request.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Malformed or incomplete client input.
    #[error("{0}")]
    BadRequest(String),

    /// Browser origin not in the allow-list.
    #[error("Origin not allowed")]
    OriginNotAllowed,

    /// Shared secret missing or wrong.
    #[error("Forbidden: invalid proxy secret")]
    InvalidSecret,

    /// Client exceeded its request budget for the current window.
    #[error("Too many requests, please try again later.")]
    RateLimited,

    #[error("Not found")]
    NotFound,

    /// Request body could not be read, typically because it exceeded the size cap.
    #[error("{}", .0.body_text())]
    UnreadableBody(#[from] BytesRejection),

    /// Upstream could not be reached or timed out.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with something that is not JSON.
    #[error("upstream returned a non-JSON body: {0}")]
    InvalidUpstreamBody(#[source] serde_json::Error),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::OriginNotAllowed | RelayError::InvalidSecret => StatusCode::FORBIDDEN,
            RelayError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            RelayError::NotFound => StatusCode::NOT_FOUND,
            RelayError::UnreadableBody(rejection) => rejection.status(),
            RelayError::Transport(_) | RelayError::InvalidUpstreamBody(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether the cause must stay server-side.
    pub fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let message = if self.is_internal() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        };
        (self.status(), Json(ErrorBody::new(message))).into_response()
    }
}

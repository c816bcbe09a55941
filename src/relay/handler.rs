//! `POST /api/chat`.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::http::request::request_id;
use crate::http::response::RelayError;
use crate::http::server::AppState;
use crate::relay::normalize::{build_upstream_request, parse_body};
use crate::relay::types::UpstreamReply;

/// Normalize the client request, forward it upstream and relay the reply.
pub async fn chat_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id(&headers);
    let start_time = Instant::now();

    let result = match body {
        Ok(body) => relay_chat(&state, &body).await,
        Err(rejection) => Err(RelayError::from(rejection)),
    };

    match result {
        Ok(reply) => {
            tracing::info!(
                request_id = %request_id,
                status = %reply.status,
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Relayed chat completion"
            );
            reply.into_response()
        }
        Err(err) if err.is_internal() => {
            tracing::error!(request_id = %request_id, error = %err, "Proxy error");
            err.into_response()
        }
        Err(err) => {
            tracing::debug!(request_id = %request_id, error = %err, "Rejected chat request");
            err.into_response()
        }
    }
}

async fn relay_chat(state: &AppState, body: &[u8]) -> Result<UpstreamReply, RelayError> {
    let inbound = parse_body(body)?;
    let request = build_upstream_request(inbound, &state.config.upstream)?;

    tracing::debug!(
        model = %request.model,
        messages = request.messages.len(),
        max_tokens = %request.max_tokens,
        "Forwarding to upstream"
    );

    state.upstream.send(&request).await
}

//! Request and reply shapes for the chat relay.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Body accepted on `POST /api/chat`.
///
/// `messages`, `prompt` and `model` stay untyped until normalization so a
/// value of the wrong shape falls through instead of failing parse.
/// `max_tokens` is kept as the client's number, integer or not.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InboundChatRequest {
    pub messages: Option<Value>,
    pub prompt: Option<Value>,
    pub model: Option<Value>,
    pub max_tokens: Option<Number>,
    pub temperature: Option<f64>,
}

/// One conversational turn.
///
/// Fields besides `role` and `content` (e.g. `name`) are carried through
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Value::String(content.into()),
            extra: Map::new(),
        }
    }
}

/// Body sent to the upstream chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Number,
    pub temperature: f64,
}

/// Upstream status and decoded JSON body, relayed to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        let status = if self.status.is_success() {
            StatusCode::OK
        } else {
            self.status
        };
        (status, Json(self.body)).into_response()
    }
}

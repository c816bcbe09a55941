//! Turning a client request into the upstream request.

use serde_json::{Number, Value};

use crate::config::UpstreamConfig;
use crate::http::response::RelayError;
use crate::relay::types::{ChatMessage, InboundChatRequest, UpstreamChatRequest};

pub const DEFAULT_MAX_TOKENS: i64 = 600;
pub const DEFAULT_TEMPERATURE: f64 = 0.6;

pub const MISSING_CONTENT: &str = "Request must include messages[] or prompt string";

/// Decode the raw body. An empty body reads as `{}`.
pub fn parse_body(body: &[u8]) -> Result<InboundChatRequest, RelayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InboundChatRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| RelayError::BadRequest(format!("Invalid JSON body: {e}")))
}

/// Pick the conversation to forward.
///
/// A non-empty `messages` array wins and is kept in order; otherwise a string
/// `prompt` becomes a single user message.
pub fn normalize_messages(request: &InboundChatRequest) -> Result<Vec<ChatMessage>, RelayError> {
    if let Some(Value::Array(items)) = &request.messages {
        if !items.is_empty() {
            return items
                .iter()
                .cloned()
                .map(serde_json::from_value::<ChatMessage>)
                .collect::<Result<Vec<ChatMessage>, _>>()
                .map_err(|e| {
                    RelayError::BadRequest(format!(
                        "Each message must be an object with role and content: {e}"
                    ))
                });
        }
    }

    match &request.prompt {
        Some(Value::String(prompt)) => Ok(vec![ChatMessage::user(prompt.clone())]),
        _ => Err(RelayError::BadRequest(MISSING_CONTENT.to_string())),
    }
}

/// Assemble the upstream body from a client request.
pub fn build_upstream_request(
    request: InboundChatRequest,
    config: &UpstreamConfig,
) -> Result<UpstreamChatRequest, RelayError> {
    let messages = normalize_messages(&request)?;

    let model = match request.model {
        Some(Value::String(model)) if config.allow_client_model && !model.trim().is_empty() => {
            model
        }
        _ => config.model.clone(),
    };

    Ok(UpstreamChatRequest {
        model,
        messages,
        max_tokens: request
            .max_tokens
            .unwrap_or_else(|| Number::from(DEFAULT_MAX_TOKENS)),
        temperature: request.temperature.unwrap_or(DEFAULT_TEMPERATURE),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn inbound(value: Value) -> InboundChatRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn messages_are_kept_in_order() {
        let request = inbound(json!({
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hello"},
                {"role": "assistant", "content": "hi"},
            ],
            "prompt": "ignored"
        }));

        let messages = normalize_messages(&request).unwrap();
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(messages[1].content, json!("hello"));
    }

    #[test]
    fn prompt_becomes_single_user_message() {
        let messages = normalize_messages(&inbound(json!({"prompt": "What is Rust?"}))).unwrap();
        assert_eq!(messages, vec![ChatMessage::user("What is Rust?")]);
    }

    #[test]
    fn empty_messages_fall_back_to_prompt() {
        let messages =
            normalize_messages(&inbound(json!({"messages": [], "prompt": "fallback"}))).unwrap();
        assert_eq!(messages, vec![ChatMessage::user("fallback")]);

        let messages =
            normalize_messages(&inbound(json!({"messages": "nope", "prompt": ""}))).unwrap();
        assert_eq!(messages, vec![ChatMessage::user("")]);
    }

    #[test]
    fn missing_content_is_a_client_error() {
        for body in [json!({}), json!({"messages": []}), json!({"prompt": 42})] {
            let err = normalize_messages(&inbound(body)).unwrap_err();
            assert!(matches!(err, RelayError::BadRequest(ref m) if m == MISSING_CONTENT));
        }
    }

    #[test]
    fn malformed_message_is_rejected() {
        let err = normalize_messages(&inbound(json!({"messages": [{"content": "no role"}]})))
            .unwrap_err();
        assert!(matches!(err, RelayError::BadRequest(_)));
    }

    #[test]
    fn defaults_and_model_override() {
        let config = UpstreamConfig::default();
        let upstream = build_upstream_request(
            inbound(json!({"prompt": "hi", "model": "gpt-4o"})),
            &config,
        )
        .unwrap();

        assert_eq!(upstream.model, config.model);
        assert_eq!(upstream.max_tokens, Number::from(DEFAULT_MAX_TOKENS));
        assert_eq!(upstream.temperature, DEFAULT_TEMPERATURE);
    }

    #[test]
    fn client_model_honored_when_enabled() {
        let config = UpstreamConfig {
            allow_client_model: true,
            ..UpstreamConfig::default()
        };
        let upstream = build_upstream_request(
            inbound(json!({"prompt": "hi", "model": "gpt-4o", "max_tokens": 5000, "temperature": 1.7})),
            &config,
        )
        .unwrap();

        assert_eq!(upstream.model, "gpt-4o");
        assert_eq!(upstream.max_tokens, Number::from(5000));
        assert_eq!(upstream.temperature, 1.7);
    }

    #[test]
    fn non_string_model_is_ignored() {
        for allow_client_model in [false, true] {
            let config = UpstreamConfig {
                allow_client_model,
                ..UpstreamConfig::default()
            };
            let upstream = build_upstream_request(
                parse_body(br#"{"prompt":"hi","model":5,"max_tokens":256.0}"#).unwrap(),
                &config,
            )
            .unwrap();

            assert_eq!(upstream.model, config.model);
            assert_eq!(
                serde_json::to_value(&upstream).unwrap()["max_tokens"],
                json!(256.0)
            );
        }
    }

    #[test]
    fn body_parsing() {
        assert!(parse_body(b"").unwrap().prompt.is_none());
        assert!(parse_body(b"  \n").is_ok());
        assert!(matches!(parse_body(b"{not json"), Err(RelayError::BadRequest(_))));
        assert!(matches!(
            parse_body(br#"{"max_tokens": "lots"}"#),
            Err(RelayError::BadRequest(_))
        ));
    }
}

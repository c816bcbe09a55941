//! Client for the upstream chat-completion endpoint.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::http::response::RelayError;
use crate::relay::types::{UpstreamChatRequest, UpstreamReply};

/// Failure to build the upstream client at startup.
#[derive(Debug, Error)]
pub enum UpstreamSetupError {
    #[error("upstream API key is not a valid header value")]
    InvalidApiKey(#[from] InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Holds the server-side credential; nothing else in the relay sees it.
pub struct UpstreamClient {
    http: reqwest::Client,
    url: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamSetupError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one request and decode the reply as JSON, whatever its status.
    pub async fn send(&self, request: &UpstreamChatRequest) -> Result<UpstreamReply, RelayError> {
        let response = self.http.post(&self.url).json(request).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes).map_err(RelayError::InvalidUpstreamBody)?;

        if !status.is_success() {
            tracing::warn!(status = %status, "Upstream returned an error status");
        }

        Ok(UpstreamReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unusable_key_is_an_error() {
        let config = UpstreamConfig {
            api_key: "sk-abc\x7fdef".into(),
            ..UpstreamConfig::default()
        };
        assert!(matches!(
            UpstreamClient::new(&config),
            Err(UpstreamSetupError::InvalidApiKey(_))
        ));
    }

    #[test]
    fn valid_key_builds() {
        let config = UpstreamConfig {
            api_key: "sk-test".into(),
            ..UpstreamConfig::default()
        };
        assert!(UpstreamClient::new(&config).is_ok());
    }
}

//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that deserialize fine
//! but cannot work at runtime. All errors are collected, not just the first.

use reqwest::header::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing upstream API key (set OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("upstream API key contains characters not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("invalid upstream URL {url:?}: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    #[error("upstream timeout must be greater than zero")]
    ZeroTimeout,

    #[error("rate limit window must be greater than zero")]
    ZeroRateWindow,

    #[error("rate limit must allow at least one request per window")]
    ZeroRateLimit,

    #[error("maximum body size must be greater than zero")]
    ZeroBodyLimit,

    #[error("invalid value {value:?} for {key}: expected {expected}")]
    InvalidEnv {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Validate a fully-assembled configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    } else if HeaderValue::from_str(&format!("Bearer {}", config.upstream.api_key)).is_err() {
        errors.push(ValidationError::InvalidApiKey);
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    match Url::parse(&config.upstream.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidUpstreamUrl {
            url: config.upstream.url.clone(),
            reason: format!("unsupported scheme {}", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidUpstreamUrl {
            url: config.upstream.url.clone(),
            reason: e.to_string(),
        }),
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::ZeroRateWindow);
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::ZeroRateLimit);
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

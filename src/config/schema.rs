//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits so an optional TOML file can provide them;
//! environment variables are layered on top by the loader.

use serde::{Deserialize, Serialize};

/// Default upstream chat-completion endpoint (OpenAI-compatible).
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model sent upstream regardless of what the client asks for.
pub const DEFAULT_UPSTREAM_MODEL: &str = "llama-3.1-70b-versatile";

/// Root configuration for the relay.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Upstream provider settings.
    pub upstream: UpstreamConfig,

    /// Origin allow-list.
    pub cors: CorsConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Inbound authentication and body limits.
    pub security: SecurityConfig,
}

impl std::fmt::Debug for RelayConfig {
    // Hand-written so credentials never end up in logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("listener", &self.listener)
            .field("upstream", &self.upstream)
            .field("cors", &self.cors)
            .field("rate_limit", &self.rate_limit)
            .field("security", &self.security)
            .finish()
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// Bind address in `host:port` form.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
        }
    }
}

/// Upstream chat-completion provider.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full URL of the chat-completion endpoint.
    pub url: String,

    /// Bearer credential injected into every upstream call.
    pub api_key: String,

    /// Model identifier sent upstream.
    pub model: String,

    /// Honor the client-supplied `model` field instead of `model`.
    pub allow_client_model: bool,

    /// Total time allowed for one upstream round trip, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_UPSTREAM_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_UPSTREAM_MODEL.to_string(),
            allow_client_model: false,
            timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("api_key", &redacted(!self.api_key.is_empty()))
            .field("model", &self.model)
            .field("allow_client_model", &self.allow_client_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Browser origins allowed to call the relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. Empty or containing `*` allows every origin.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per client within one window.
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 60,
            max_requests: 60,
        }
    }
}

/// Security hardening configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared secret required on `/api/chat`. `None` disables the check.
    pub shared_secret: Option<String>,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            shared_secret: None,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("shared_secret", &redacted(self.shared_secret.is_some()))
            .field("max_body_size", &self.max_body_size)
            .finish()
    }
}

fn redacted(present: bool) -> &'static str {
    if present {
        "<redacted>"
    } else {
        "<unset>"
    }
}

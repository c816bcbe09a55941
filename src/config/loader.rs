//! Configuration loading from file and environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Names an optional TOML file providing base settings.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration for the running process.
///
/// Reads `.env` if present (existing variables win), then the optional TOML
/// file named by `RELAY_CONFIG`, then the environment variables.
pub fn load_config() -> Result<RelayConfig, ConfigError> {
    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!(path = ?path, "Loaded .env file");
    }
    load_from(|key| std::env::var(key).ok())
}

/// Load configuration using `env` as the variable source.
pub fn load_from<F>(env: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match env(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
        Some(path) => load_config_file(Path::new(&path))?,
        None => RelayConfig::default(),
    };

    let mut errors = apply_env(&mut config, &env);
    if let Err(more) = validate_config(&config) {
        errors.extend(more);
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(ConfigError::Validation(errors))
    }
}

/// Parse a TOML configuration file without validating it.
pub fn load_config_file(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment variables onto `config`.
///
/// Returns the variables whose values could not be parsed.
fn apply_env<F>(config: &mut RelayConfig, env: &F) -> Vec<ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut errors = Vec::new();

    if let Some(key) = env("OPENAI_API_KEY") {
        config.upstream.api_key = key.trim().to_string();
    }
    if let Some(host) = env("HOST").filter(|h| !h.trim().is_empty()) {
        config.listener.host = host.trim().to_string();
    }
    if let Some(origins) = env("ALLOWED_ORIGINS") {
        config.cors.allowed_origins = parse_origins(&origins);
    }
    if let Some(secret) = env("PROXY_SECRET") {
        config.security.shared_secret = Some(secret).filter(|s| !s.is_empty());
    }
    if let Some(url) = env("UPSTREAM_URL").filter(|u| !u.trim().is_empty()) {
        config.upstream.url = url.trim().to_string();
    }
    if let Some(model) = env("UPSTREAM_MODEL").filter(|m| !m.trim().is_empty()) {
        config.upstream.model = model.trim().to_string();
    }

    parse_into(env, "PORT", "a port number", &mut config.listener.port, &mut errors);
    parse_into(
        env,
        "UPSTREAM_TIMEOUT_SECS",
        "a number of seconds",
        &mut config.upstream.timeout_secs,
        &mut errors,
    );
    parse_into(
        env,
        "RATE_LIMIT_WINDOW_SECS",
        "a number of seconds",
        &mut config.rate_limit.window_secs,
        &mut errors,
    );
    parse_into(
        env,
        "RATE_LIMIT_MAX_REQUESTS",
        "a request count",
        &mut config.rate_limit.max_requests,
        &mut errors,
    );

    if let Some(raw) = env("ALLOW_CLIENT_MODEL") {
        match parse_bool(&raw) {
            Some(flag) => config.upstream.allow_client_model = flag,
            None => errors.push(ValidationError::InvalidEnv {
                key: "ALLOW_CLIENT_MODEL".into(),
                value: raw,
                expected: "true or false",
            }),
        }
    }

    errors
}

fn parse_into<F, T>(
    env: &F,
    key: &str,
    expected: &'static str,
    slot: &mut T,
    errors: &mut Vec<ValidationError>,
) where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = env(key).filter(|v| !v.trim().is_empty()) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => *slot = value,
        Err(_) => errors.push(ValidationError::InvalidEnv {
            key: key.to_string(),
            value: raw,
            expected,
        }),
    }
}

/// Split a comma-separated origin list, dropping blanks.
///
/// An empty result means every origin is allowed.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Chat completion relay library.
//!
//! Forwards chat requests to an OpenAI-compatible provider with a
//! server-held credential, behind origin, rate-limit and shared-secret guards.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod security;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

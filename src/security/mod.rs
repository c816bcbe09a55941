//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → origin.rs (allow-list check, CORS headers)
//!     → body size limit (tower-http)
//!     → rate_limit.rs (per-IP fixed window)
//!     → secret.rs (shared secret, /api/chat only)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Each guard is a pure check plus a thin axum middleware
//! - Fail closed: reject on any failed check
//! - Guards hold only their own configuration, except the limiter's counters

pub mod origin;
pub mod rate_limit;
pub mod secret;

pub use origin::{cors_layer, origin_guard, OriginPolicy};
pub use rate_limit::{rate_limit_middleware, RateLimitDecision, RateLimiter};
pub use secret::{require_shared_secret, SecretGuard};

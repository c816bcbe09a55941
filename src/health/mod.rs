//! Liveness check.
//!
//! Reports only that the process is serving requests; neither the upstream
//! nor the credential is checked.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use serde::{Deserialize, Serialize};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    /// Unix time in milliseconds.
    pub ts: u64,
}

pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        ok: true,
        ts: unix_millis(),
    })
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

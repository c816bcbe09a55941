//! Chat completion relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                    CHAT RELAY                    │
//!                  │                                                  │
//!  Browser/App     │  ┌────────┐   ┌────────┐   ┌────────┐            │
//!  ────────────────┼─▶│ origin │──▶│ body   │──▶│ rate   │──┐         │
//!                  │  │ guard  │   │ limit  │   │ limit  │  │         │
//!                  │  └────────┘   └────────┘   └────────┘  ▼         │
//!                  │                              ┌──────────────┐    │
//!                  │                              │ shared secret│    │
//!                  │                              └──────┬───────┘    │
//!                  │                                     ▼            │
//!  ◀───────────────┼───────────────────────────── ┌──────────────┐    │      Upstream
//!   status + JSON  │                              │ relay handler│────┼────▶ provider
//!                  │                              └──────────────┘    │   (Bearer key)
//!                  └──────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use tokio::net::TcpListener;

use chat_relay::config::load_config;
use chat_relay::observability::init_logging;
use chat_relay::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    tracing::info!("chat-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(config = ?config, "Configuration loaded");

    let listener = match TcpListener::bind(config.listener.bind_address()).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                address = %config.listener.bind_address(),
                error = %e,
                "Failed to bind listener"
            );
            return ExitCode::FAILURE;
        }
    };

    let server = match HttpServer::new(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build upstream client");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}

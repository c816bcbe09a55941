//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chat_relay::config::RelayConfig;
use chat_relay::{HttpServer, Shutdown};
use serde_json::Value;
use tokio::net::TcpListener;

pub const TEST_API_KEY: &str = "sk-test-key";
const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// One request received by the mock upstream.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub authorization: Option<String>,
    pub body: Value,
}

/// A fake chat-completion provider recording what it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<CapturedCall>>>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, COMPLETIONS_PATH)
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Start a mock upstream answering every call with `status` and `reply`.
pub async fn start_mock_upstream(status: u16, reply: Value) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();
    let status = StatusCode::from_u16(status).unwrap();

    let app = Router::new().route(
        COMPLETIONS_PATH,
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let recorded = recorded.clone();
            let reply = reply.clone();
            async move {
                recorded.lock().unwrap().push(CapturedCall {
                    authorization: headers
                        .get(header::AUTHORIZATION)
                        .and_then(|v| v.to_str().ok())
                        .map(String::from),
                    body,
                });
                (status, Json(reply))
            }
        }),
    );

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream { addr, calls }
}

/// Start an upstream that answers with a non-JSON body.
pub async fn start_html_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        COMPLETIONS_PATH,
        post(|| async { (StatusCode::BAD_GATEWAY, "<html>upstream down</html>") }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// URL of a port nothing listens on.
pub fn unreachable_upstream_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, COMPLETIONS_PATH)
}

/// Relay configuration pointing at `upstream_url`.
pub fn test_config(upstream_url: String) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.upstream.url = upstream_url;
    config.upstream.api_key = TEST_API_KEY.into();
    config.upstream.timeout_secs = 5;
    config
}

/// A relay running on an ephemeral port.
pub struct RunningRelay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl RunningRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for RunningRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_relay(config: RelayConfig) -> RunningRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningRelay { addr, shutdown }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the relay and health handlers
//! - Wire up middleware in order: request id, trace, origin, body limit,
//!   CORS, rate limit, shared secret
//! - Bind server to listener and shut down gracefully

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::health::health_handler;
use crate::http::request::MakeRequestUuidV4;
use crate::http::response::RelayError;
use crate::relay::{chat_handler, UpstreamClient, UpstreamSetupError};
use crate::security::{
    cors_layer, origin_guard, rate_limit::spawn_sweeper, rate_limit_middleware,
    require_shared_secret, OriginPolicy, RateLimiter, SecretGuard,
};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub upstream: Arc<UpstreamClient>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: Arc<RelayConfig>,
    limiter: Option<Arc<RateLimiter>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, UpstreamSetupError> {
        let config = Arc::new(config);
        let upstream = Arc::new(UpstreamClient::new(&config.upstream)?);

        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::from_config(&config.rate_limit)));

        let state = AppState {
            config: config.clone(),
            upstream,
        };

        let router = Self::build_router(&config, state, limiter.clone());
        Ok(Self {
            router,
            config,
            limiter,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &RelayConfig,
        state: AppState,
        limiter: Option<Arc<RateLimiter>>,
    ) -> Router {
        let secret_guard = Arc::new(SecretGuard::new(config.security.shared_secret.clone()));
        let origin_policy = Arc::new(OriginPolicy::new(&config.cors.allowed_origins));

        let chat = Router::new()
            .route("/api/chat", post(chat_handler))
            .route_layer(middleware::from_fn_with_state(
                secret_guard,
                require_shared_secret,
            ));

        let mut router = Router::new()
            .route("/health", get(health_handler))
            .merge(chat)
            .fallback(not_found)
            .with_state(state);

        if let Some(limiter) = limiter {
            router = router.layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn_with_state(origin_policy, origin_guard))
                .layer(DefaultBodyLimit::max(config.security.max_body_size))
                .layer(cors_layer()),
        )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.url,
            model = %self.config.upstream.model,
            secret_auth = self.config.security.shared_secret.is_some(),
            "Proxy listening"
        );

        if let Some(limiter) = &self.limiter {
            spawn_sweeper(limiter.clone(), shutdown.resubscribe());
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

async fn not_found() -> RelayError {
    RelayError::NotFound
}

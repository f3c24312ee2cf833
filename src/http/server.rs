//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Build the request translator and upstream client from config
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::{ProxyConfig, ValidationError};
use crate::http::client::UpstreamClient;
use crate::http::handlers;
use crate::http::request::{RequestIdExt, UuidRequestId};
use crate::proxy::{ProxyError, RequestTranslator};
use crate::security::CredentialPolicy;

/// Application state injected into handlers. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<RequestTranslator>,
    pub upstream: UpstreamClient,
    pub public_base_url: Option<Arc<str>>,
}

/// Errors building the server from configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream base URL: {0}")]
    UpstreamUrl(#[from] url::ParseError),

    #[error("invalid credential configuration: {0}")]
    Credentials(#[from] ValidationError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let base_url = Url::parse(&config.upstream.base_url)?;
        let policy = CredentialPolicy::from_config(&config.credentials)?;
        let upstream = UpstreamClient::new(&config.upstream)?;

        tracing::info!(
            upstream = %base_url,
            credential_mode = ?policy.mode(),
            "Relay pipeline initialized"
        );

        let state = AppState {
            translator: Arc::new(RequestTranslator::new(base_url, policy)),
            upstream,
            public_base_url: config.pagination.public_base_url.as_deref().map(Arc::from),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let deadline_secs = config.timeouts.request_secs;
        Router::new()
            .route("/health", get(handlers::health))
            .route(
                "/api/v10/channels/{channel_id}/messages",
                get(handlers::channel_messages),
            )
            .route(
                "/api/v10/channels/{channel_id}/messages/{message_id}/reactions/{emoji}",
                get(handlers::message_reactions),
            )
            .route("/messages", get(handlers::messages_by_query))
            .route("/reactions", get(handlers::reactions_by_query))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                        tracing::info_span!(
                            "relay",
                            method = %req.method(),
                            path = %req.uri().path(),
                            request_id = %req.headers().request_id(),
                        )
                    }))
                    .layer(middleware::map_response(move |response: Response| async move {
                        deadline_as_json(response, deadline_secs)
                    }))
                    .layer(TimeoutLayer::new(Duration::from_secs(deadline_secs))),
            )
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// `TimeoutLayer` answers with a bare 408; pipeline errors always carry a
/// JSON content type, so only the layer's own response is rewritten.
fn deadline_as_json(response: Response, deadline_secs: u64) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(CONTENT_TYPE)
    {
        return ProxyError::DeadlineExceeded(deadline_secs).into_response();
    }
    response
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Inbound deadline outlasts the upstream deadline
//! - Reject mixed credential modes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{CredentialMode, ProxyConfig};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("upstream.base_url '{0}' is not an absolute http(s) URL")]
    InvalidUpstreamUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.request_secs ({inbound}) must exceed upstream.request_timeout_secs ({upstream})")]
    InboundDeadlineTooShort { inbound: u64, upstream: u64 },

    #[error("credentials.mode = server_held requires a bot token (set DISCORD_BOT_TOKEN)")]
    MissingBotToken,

    #[error("credentials.mode = caller_supplied cannot be combined with a server-held bot token")]
    MixedCredentialModes,

    #[error("credentials.header must name an inbound header")]
    InvalidCredentialHeader,

    #[error("pagination.public_base_url '{0}' is not an absolute http(s) URL")]
    InvalidPublicBaseUrl(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if !is_http_url(&config.upstream.base_url) {
        errors.push(ValidationError::InvalidUpstreamUrl(
            config.upstream.base_url.clone(),
        ));
    }

    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.connect_timeout_secs"));
    }
    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.request_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    // Upstream deadline fires before the inbound one.
    if config.timeouts.request_secs != 0
        && config.timeouts.request_secs <= config.upstream.request_timeout_secs
    {
        errors.push(ValidationError::InboundDeadlineTooShort {
            inbound: config.timeouts.request_secs,
            upstream: config.upstream.request_timeout_secs,
        });
    }

    let has_token = config
        .credentials
        .bot_token
        .as_deref()
        .is_some_and(|t| !t.trim().is_empty());

    match config.credentials.mode {
        CredentialMode::ServerHeld if !has_token => {
            errors.push(ValidationError::MissingBotToken);
        }
        CredentialMode::CallerSupplied => {
            if has_token {
                errors.push(ValidationError::MixedCredentialModes);
            }
            if axum::http::HeaderName::try_from(config.credentials.header.as_str()).is_err() {
                errors.push(ValidationError::InvalidCredentialHeader);
            }
        }
        CredentialMode::ServerHeld => {}
    }

    if let Some(base) = &config.pagination.public_base_url {
        if !is_http_url(base) {
            errors.push(ValidationError::InvalidPublicBaseUrl(base.clone()));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

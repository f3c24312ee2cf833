//! Error taxonomy for the request pipeline.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that end a single relayed request.
///
/// None of these are retried and none escape the request that produced them.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required path or query identifier was absent or empty.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Path or query string could not be read (bad percent-encoding,
    /// conflicting aliases).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Caller-supplied mode and the request carried no credential.
    #[error("Missing bot token in header: {0}")]
    MissingCredential(String),

    /// Upstream answered with a non-success status; `body` is its raw text.
    #[error("{body}")]
    Upstream { status: StatusCode, body: String },

    /// Upstream answered 2xx but the body was not the JSON we expected.
    #[error("upstream did not return JSON")]
    ContractViolation { details: String },

    /// Upstream did not answer within the configured deadline.
    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection, DNS or body-read failure talking to upstream.
    #[error("{0}")]
    Transport(#[source] reqwest::Error),

    /// The inbound deadline fired before the pipeline finished.
    #[error("request exceeded the {0}s relay deadline")]
    DeadlineExceeded(u64),

    /// The upstream URL could not be assembled.
    #[error("invalid upstream URL: {0}")]
    InvalidUpstreamUrl(#[from] url::ParseError),
}

impl ProxyError {
    /// Downstream status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::MissingCredential(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream { status, .. } => *status,
            Self::ContractViolation { .. }
            | Self::Timeout(_)
            | Self::Transport(_)
            | Self::DeadlineExceeded(_)
            | Self::InvalidUpstreamUrl(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "missing_parameter",
            Self::InvalidRequest(_) => "invalid_request",
            Self::MissingCredential(_) => "missing_credential",
            Self::Upstream { .. } => "upstream_status",
            Self::ContractViolation { .. } => "contract_violation",
            Self::Timeout(_) => "timeout",
            Self::Transport(_) => "transport",
            Self::DeadlineExceeded(_) => "deadline",
            Self::InvalidUpstreamUrl(_) => "invalid_url",
        }
    }

    /// Raw upstream body attached to contract violations.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::ContractViolation { details } => Some(details),
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Transport(err)
        }
    }
}

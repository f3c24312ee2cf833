//! Outbound HTTP client for the upstream chat API.
//!
//! # Design Decisions
//! - One attempt per inbound request, no retry loop
//! - Connect and total deadlines come from `[upstream]` config
//! - Bodies are always read as text; the normalizer decides whether to parse

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::proxy::{ProxyError, UpstreamRequest, UpstreamResult};

/// Thin wrapper over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { http })
    }

    /// Perform the single outbound call for `request`.
    pub async fn fetch(&self, request: &UpstreamRequest) -> Result<UpstreamResult, ProxyError> {
        tracing::debug!(kind = request.kind.as_str(), url = %request.url, "Calling upstream");

        let response = self
            .http
            .get(request.url.clone())
            .header(AUTHORIZATION, &request.authorization)
            .send()
            .await
            .map_err(|e| transport_error(request, e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.map_err(|e| transport_error(request, e))?;

        tracing::debug!(
            kind = request.kind.as_str(),
            status = %status,
            content_type = content_type.as_deref().unwrap_or("-"),
            bytes = body.len(),
            "Upstream responded"
        );

        Ok(UpstreamResult {
            status,
            content_type,
            body,
        })
    }
}

fn transport_error(request: &UpstreamRequest, err: reqwest::Error) -> ProxyError {
    let err = ProxyError::from_reqwest(err);
    tracing::error!(kind = request.kind.as_str(), error = %err, "Upstream request failed");
    metrics::record_upstream_failure(err.kind());
    err
}

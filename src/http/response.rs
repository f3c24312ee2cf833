//! Downstream response rendering.
//!
//! # Responsibilities
//! - Render `ProxyError` as `{ "error": .., "details"?: .. }` JSON
//! - Render message history as the upstream JSON, untouched
//! - Render reaction listings as `{ "data": .., "next_page": .. }`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::proxy::ProxyError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "Relay request failed");
        } else {
            tracing::debug!(kind = self.kind(), status = %status, "Relay request rejected");
        }

        let body = ErrorBody {
            error: self.to_string(),
            details: self.details().map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}

/// Reaction listing wrapper.
#[derive(Debug, Serialize)]
pub struct ReactionPage {
    pub data: Value,
    pub next_page: Option<String>,
}

impl IntoResponse for ReactionPage {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_contract_violation_body() {
        let response = ProxyError::ContractViolation {
            details: "<html/>".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "error": "upstream did not return JSON", "details": "<html/>" })
        );
    }

    #[tokio::test]
    async fn test_missing_parameter_body_has_no_details() {
        let response = ProxyError::MissingParameter("channelId").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing required parameter: channelId");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_reaction_page_null_next() {
        let response = ReactionPage {
            data: serde_json::json!([]),
            next_page: None,
        }
        .into_response();
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "data": [], "next_page": null })
        );
    }
}

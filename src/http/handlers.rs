//! Route handlers.
//!
//! Path-style routes mirror the upstream API layout; query-style routes take
//! every identifier from the query string. Both funnel into the same pipeline.

use std::time::Instant;

use axum::{
    extract::{OriginalUri, State},
    http::{header::HOST, HeaderMap, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::extract::{RelayPath, RelayQuery};
use crate::http::request::RequestIdExt;
use crate::http::response::ReactionPage;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::{
    next_page_url, normalize, MessageHistoryParams, ProxyError, ReactionListParams, ResourceKind,
};

/// Path parameters of the upstream-shaped reaction route.
#[derive(Debug, Deserialize)]
pub struct ReactionPath {
    pub channel_id: String,
    pub message_id: String,
    pub emoji: String,
}

/// `GET /api/v10/channels/{channel_id}/messages`
pub async fn channel_messages(
    State(state): State<AppState>,
    RelayPath(channel_id): RelayPath<String>,
    RelayQuery(mut params): RelayQuery<MessageHistoryParams>,
    headers: HeaderMap,
) -> Response {
    params.channel_id = Some(channel_id);
    relay_messages(&state, params, &headers).await
}

/// `GET /messages?channel_id=..`
pub async fn messages_by_query(
    State(state): State<AppState>,
    RelayQuery(params): RelayQuery<MessageHistoryParams>,
    headers: HeaderMap,
) -> Response {
    relay_messages(&state, params, &headers).await
}

/// `GET /api/v10/channels/{channel_id}/messages/{message_id}/reactions/{emoji}`
pub async fn message_reactions(
    State(state): State<AppState>,
    RelayPath(path): RelayPath<ReactionPath>,
    RelayQuery(mut params): RelayQuery<ReactionListParams>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    params.channel_id = Some(path.channel_id);
    params.message_id = Some(path.message_id);
    params.emoji = Some(path.emoji);
    relay_reactions(&state, params, &uri, &headers).await
}

/// `GET /reactions?channel_id=..&message_id=..&emoji=..`
pub async fn reactions_by_query(
    State(state): State<AppState>,
    RelayQuery(params): RelayQuery<ReactionListParams>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    relay_reactions(&state, params, &uri, &headers).await
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn relay_messages(state: &AppState, params: MessageHistoryParams, headers: &HeaderMap) -> Response {
    let start = Instant::now();
    let result = async {
        let request = state.translator.message_history(params, headers)?;
        let upstream = state.translator.upstream_request(&request)?;
        let normalized = normalize(ResourceKind::MessageHistory, state.upstream.fetch(&upstream).await?)?;
        Ok::<_, ProxyError>(Json(normalized.payload).into_response())
    }
    .await;

    finish(ResourceKind::MessageHistory, result, headers, start)
}

async fn relay_reactions(
    state: &AppState,
    params: ReactionListParams,
    uri: &Uri,
    headers: &HeaderMap,
) -> Response {
    let start = Instant::now();
    let result = async {
        let request = state.translator.reaction_list(params, headers)?;
        let upstream = state.translator.upstream_request(&request)?;
        let normalized = normalize(ResourceKind::ReactionList, state.upstream.fetch(&upstream).await?)?;

        let origin = public_origin(state, headers);
        let next_page = normalized
            .next_page_cursor
            .as_deref()
            .map(|cursor| next_page_url(origin.as_deref(), uri.path(), uri.query(), cursor));

        Ok::<_, ProxyError>(
            ReactionPage {
                data: normalized.payload,
                next_page,
            }
            .into_response(),
        )
    }
    .await;

    finish(ResourceKind::ReactionList, result, headers, start)
}

fn finish(
    kind: ResourceKind,
    result: Result<Response, ProxyError>,
    headers: &HeaderMap,
    start: Instant,
) -> Response {
    let response = result.unwrap_or_else(IntoResponse::into_response);
    let status = response.status();

    tracing::info!(
        request_id = %headers.request_id(),
        route = kind.as_str(),
        status = status.as_u16(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Relayed request"
    );
    metrics::record_request(kind.as_str(), status.as_u16(), start);

    response
}

/// Origin for `next_page` links: configured base URL, else the inbound
/// Host header with `X-Forwarded-Proto` (default http).
fn public_origin(state: &AppState, headers: &HeaderMap) -> Option<String> {
    if let Some(base) = &state.public_base_url {
        return Some(base.to_string());
    }
    let host = headers.get(HOST).and_then(|v| v.to_str().ok())?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    Some(format!("{scheme}://{host}"))
}

//! Transient request/response descriptors. Nothing here outlives a request.

use axum::http::StatusCode;
use serde_json::Value;
use url::Url;

use crate::security::Credential;

/// Default `limit` for message history.
pub const DEFAULT_LIMIT: u32 = 50;
/// Largest `limit` the upstream accepts.
pub const MAX_LIMIT: u32 = 100;
/// Smallest `limit` forwarded.
pub const MIN_LIMIT: u32 = 1;
/// Fixed page size for reaction listing, independent of any caller limit.
pub const REACTION_PAGE_SIZE: usize = 50;

/// Which upstream read endpoint a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    MessageHistory,
    ReactionList,
}

impl ResourceKind {
    /// Route label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageHistory => "messages",
            Self::ReactionList => "reactions",
        }
    }
}

/// Validated upstream resource. Identifiers are non-empty by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    MessageHistory {
        channel_id: String,
    },
    ReactionList {
        channel_id: String,
        message_id: String,
        /// Raw emoji as the caller sent it (decoded); escaped on the way out.
        emoji: String,
    },
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::MessageHistory { .. } => ResourceKind::MessageHistory,
            Self::ReactionList { .. } => ResourceKind::ReactionList,
        }
    }
}

/// Normalized pagination. `limit` is always within `MIN_LIMIT..=MAX_LIMIT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationParams {
    pub limit: u32,
    pub before: Option<String>,
    pub after: Option<String>,
    pub around: Option<String>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            before: None,
            after: None,
            around: None,
        }
    }
}

impl PaginationParams {
    /// Reaction listing: fixed page size, only `after` is honored.
    pub fn reaction_page(after: Option<String>) -> Self {
        Self {
            limit: REACTION_PAGE_SIZE as u32,
            after: non_empty(after),
            ..Self::default()
        }
    }

    /// Message history: clamp the limit and keep non-empty cursors.
    pub fn message_page(
        limit: Option<&str>,
        before: Option<String>,
        after: Option<String>,
        around: Option<String>,
    ) -> Self {
        Self {
            limit: parse_limit(limit),
            before: non_empty(before),
            after: non_empty(after),
            around: non_empty(around),
        }
    }
}

/// Parse a caller-supplied `limit`.
///
/// Absent, non-numeric and zero values fall back to `DEFAULT_LIMIT`;
/// everything else is clamped into `MIN_LIMIT..=MAX_LIMIT`.
pub fn parse_limit(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_LIMIT;
    };
    let value = raw.parse::<i64>().ok().or_else(|| saturate_integer(raw));
    match value {
        None | Some(0) => DEFAULT_LIMIT,
        Some(n) => n.clamp(i64::from(MIN_LIMIT), i64::from(MAX_LIMIT)) as u32,
    }
}

// Integers too wide for i64 still say which end of the range they meant.
fn saturate_integer(raw: &str) -> Option<i64> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(if negative { i64::MIN } else { i64::MAX })
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// One validated inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    pub resource: Resource,
    pub pagination: PaginationParams,
    pub credential: Credential,
}

impl ProxyRequest {
    pub fn kind(&self) -> ResourceKind {
        self.resource.kind()
    }
}

/// Fully formed outbound call: one URL, one `Authorization` value.
#[derive(Clone)]
pub struct UpstreamRequest {
    pub kind: ResourceKind,
    pub url: Url,
    pub authorization: String,
}

impl std::fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamRequest")
            .field("kind", &self.kind)
            .field("url", &self.url.as_str())
            .field("authorization", &"<redacted>")
            .finish()
    }
}

/// What came back from upstream, body already read as text.
#[derive(Debug, Clone)]
pub struct UpstreamResult {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl UpstreamResult {
    /// True when the content type names JSON.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// Downstream result before it is rendered to HTTP.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub kind: ResourceKind,
    pub payload: Value,
    /// Last element's id when a full reaction page came back.
    pub next_page_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit_bounds() {
        assert_eq!(parse_limit(None), 50);
        assert_eq!(parse_limit(Some("")), 50);
        assert_eq!(parse_limit(Some("abc")), 50);
        assert_eq!(parse_limit(Some("0")), 50);
        assert_eq!(parse_limit(Some("-7")), 1);
        assert_eq!(parse_limit(Some("1")), 1);
        assert_eq!(parse_limit(Some("25")), 25);
        assert_eq!(parse_limit(Some(" 100 ")), 100);
        assert_eq!(parse_limit(Some("101")), 100);
        assert_eq!(parse_limit(Some("99999999999999999999")), 100);
        assert_eq!(parse_limit(Some("-99999999999999999999")), 1);
    }

    #[test]
    fn test_limit_always_in_range() {
        for raw in ["-1000", "-1", "0", "1", "50", "100", "150", "1e3", "NaN", "12.5"] {
            let limit = parse_limit(Some(raw));
            assert!((MIN_LIMIT..=MAX_LIMIT).contains(&limit), "{raw} -> {limit}");
        }
    }

    #[test]
    fn test_empty_cursors_dropped() {
        let page = PaginationParams::message_page(
            Some("10"),
            Some(String::new()),
            Some("123".into()),
            None,
        );
        assert_eq!(page.limit, 10);
        assert_eq!(page.before, None);
        assert_eq!(page.after.as_deref(), Some("123"));
    }

    #[test]
    fn test_is_json() {
        let mut result = UpstreamResult {
            status: StatusCode::OK,
            content_type: Some("application/json; charset=utf-8".into()),
            body: "[]".into(),
        };
        assert!(result.is_json());
        result.content_type = Some("text/html".into());
        assert!(!result.is_json());
        result.content_type = None;
        assert!(!result.is_json());
    }
}

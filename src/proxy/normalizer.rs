//! Response normalization.
//!
//! # Responsibilities
//! - Surface non-2xx upstream bodies verbatim, keeping the upstream status
//! - Check content type before parsing message history
//! - Synthesize the reaction `next_page` cursor and link
//!
//! # Design Decisions
//! - Error bodies are treated as text; upstream edges answer with HTML
//! - A reaction page of exactly `REACTION_PAGE_SIZE` items is assumed to have
//!   a successor. Upstream gives no such guarantee, so when the last page is
//!   exactly full the synthesized link leads to an empty page

use serde_json::Value;
use url::form_urlencoded;

use crate::proxy::error::ProxyError;
use crate::proxy::types::{NormalizedResponse, ResourceKind, UpstreamResult, REACTION_PAGE_SIZE};

/// Map one upstream result onto the downstream contract.
pub fn normalize(kind: ResourceKind, upstream: UpstreamResult) -> Result<NormalizedResponse, ProxyError> {
    if !upstream.status.is_success() {
        return Err(ProxyError::Upstream {
            status: upstream.status,
            body: upstream.body,
        });
    }

    match kind {
        ResourceKind::MessageHistory => {
            if !upstream.is_json() {
                return Err(ProxyError::ContractViolation {
                    details: upstream.body,
                });
            }
            let payload = parse_body(upstream.body)?;
            Ok(NormalizedResponse {
                kind,
                payload,
                next_page_cursor: None,
            })
        }
        ResourceKind::ReactionList => {
            let payload = parse_body(upstream.body)?;
            let next_page_cursor = next_page_cursor(&payload, REACTION_PAGE_SIZE);
            Ok(NormalizedResponse {
                kind,
                payload,
                next_page_cursor,
            })
        }
    }
}

fn parse_body(body: String) -> Result<Value, ProxyError> {
    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(_) => Err(ProxyError::ContractViolation { details: body }),
    }
}

/// Cursor for the following page: the last element's `id`, but only when
/// the page is full.
pub fn next_page_cursor(payload: &Value, page_size: usize) -> Option<String> {
    let items = payload.as_array()?;
    if items.len() != page_size {
        return None;
    }
    match items.last()?.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Build the absolute `next_page` link for a reaction listing.
///
/// All original query pairs are kept in order; the first `after` pair is
/// replaced by `cursor` and any later ones dropped, or `after` is appended
/// when absent.
pub fn next_page_url(origin: Option<&str>, path: &str, query: Option<&str>, cursor: &str) -> String {
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
        if key == "after" {
            if !replaced {
                pairs.push(("after".to_string(), cursor.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push(("after".to_string(), cursor.to_string()));
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    let origin = origin.unwrap_or_default().trim_end_matches('/');
    format!("{origin}{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn upstream(status: StatusCode, content_type: Option<&str>, body: &str) -> UpstreamResult {
        UpstreamResult {
            status,
            content_type: content_type.map(str::to_string),
            body: body.to_string(),
        }
    }

    fn reactors(count: usize) -> Value {
        Value::Array(
            (0..count)
                .map(|i| json!({ "id": (900 + i).to_string(), "username": format!("u{i}") }))
                .collect(),
        )
    }

    #[test]
    fn test_messages_pass_through() {
        let body = r#"[{"id":"1","content":"hi","embeds":[]},{"id":"2","content":"yo"}]"#;
        let normalized = normalize(
            ResourceKind::MessageHistory,
            upstream(StatusCode::OK, Some("application/json"), body),
        )
        .unwrap();
        assert_eq!(normalized.payload, serde_json::from_str::<Value>(body).unwrap());
        assert_eq!(normalized.next_page_cursor, None);
    }

    #[test]
    fn test_messages_html_is_contract_violation() {
        let html = "<html><body>Cloudflare</body></html>";
        let err = normalize(
            ResourceKind::MessageHistory,
            upstream(StatusCode::OK, Some("text/html; charset=UTF-8"), html),
        )
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.details(), Some(html));
    }

    #[test]
    fn test_error_status_kept_with_raw_text() {
        for kind in [ResourceKind::MessageHistory, ResourceKind::ReactionList] {
            let err = normalize(kind, upstream(StatusCode::NOT_FOUND, Some("text/html"), "<h1>404</h1>"))
                .unwrap_err();
            match err {
                ProxyError::Upstream { status, body } => {
                    assert_eq!(status, StatusCode::NOT_FOUND);
                    assert_eq!(body, "<h1>404</h1>");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_full_reaction_page_has_cursor() {
        let mut page = reactors(50);
        page.as_array_mut().unwrap()[49]["id"] = json!("999");
        let normalized = normalize(
            ResourceKind::ReactionList,
            upstream(StatusCode::OK, Some("application/json"), &page.to_string()),
        )
        .unwrap();
        assert_eq!(normalized.next_page_cursor.as_deref(), Some("999"));
        assert_eq!(normalized.payload, page);
    }

    #[test]
    fn test_short_reaction_page_has_no_cursor() {
        assert_eq!(next_page_cursor(&reactors(49), 50), None);
        assert_eq!(next_page_cursor(&reactors(0), 50), None);
        assert_eq!(next_page_cursor(&json!({"message": "odd"}), 50), None);
    }

    #[test]
    fn test_cursor_needs_usable_id() {
        let mut page = reactors(50);
        page.as_array_mut().unwrap()[49] = json!({ "username": "ghost" });
        assert_eq!(next_page_cursor(&page, 50), None);

        page.as_array_mut().unwrap()[49] = json!({ "id": 4242 });
        assert_eq!(next_page_cursor(&page, 50).as_deref(), Some("4242"));
    }

    #[test]
    fn test_reaction_body_not_json() {
        let err = normalize(
            ResourceKind::ReactionList,
            upstream(StatusCode::OK, Some("text/html"), "<html/>"),
        )
        .unwrap_err();
        assert_eq!(err.details(), Some("<html/>"));
    }

    #[test]
    fn test_next_page_url_overwrites_after() {
        let url = next_page_url(
            Some("http://relay.local:3000"),
            "/api/v10/channels/1/messages/2/reactions/%F0%9F%91%8D",
            Some("after=100&foo=bar&after=200"),
            "999",
        );
        assert_eq!(
            url,
            "http://relay.local:3000/api/v10/channels/1/messages/2/reactions/%F0%9F%91%8D?after=999&foo=bar"
        );
    }

    #[test]
    fn test_next_page_url_appends_after() {
        let url = next_page_url(
            Some("https://relay.example.com/"),
            "/reactions",
            Some("channel_id=1&message_id=2&emoji=%F0%9F%91%8D"),
            "999",
        );
        assert_eq!(
            url,
            "https://relay.example.com/reactions?channel_id=1&message_id=2&emoji=%F0%9F%91%8D&after=999"
        );

        assert_eq!(next_page_url(None, "/reactions", None, "5"), "/reactions?after=5");
    }
}

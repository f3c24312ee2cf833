//! Request translation.
//!
//! # Responsibilities
//! - Validate identifiers from path or query (non-empty)
//! - Resolve the credential under the deployment's policy
//! - Normalize pagination (clamp `limit`, drop empty cursors)
//! - Assemble the upstream URL and `Authorization` value
//!
//! # Design Decisions
//! - Identifiers are checked before the credential, so a request with no
//!   channel id is a 400 whatever the credential state
//! - Every path segment is percent-encoded exactly once here; axum has
//!   already decoded the inbound path
//! - Cursor order on the wire is stable: before, after, around

use axum::http::HeaderMap;
use serde::Deserialize;
use url::Url;

use crate::proxy::error::ProxyError;
use crate::proxy::types::{
    non_empty, PaginationParams, ProxyRequest, Resource, ResourceKind, UpstreamRequest,
};
use crate::security::{Credential, CredentialPolicy};

/// Raw message-history parameters, merged from path and query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageHistoryParams {
    #[serde(default, alias = "channelId")]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub around: Option<String>,
}

/// Raw reaction-list parameters, merged from path and query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReactionListParams {
    #[serde(default, alias = "channelId")]
    pub channel_id: Option<String>,
    #[serde(default, alias = "messageId")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

/// Builds exactly one upstream request from one inbound request.
#[derive(Debug, Clone)]
pub struct RequestTranslator {
    base_url: Url,
    policy: CredentialPolicy,
}

impl RequestTranslator {
    pub fn new(base_url: Url, policy: CredentialPolicy) -> Self {
        Self { base_url, policy }
    }

    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    /// Validate a message-history request.
    pub fn message_history(
        &self,
        params: MessageHistoryParams,
        headers: &HeaderMap,
    ) -> Result<ProxyRequest, ProxyError> {
        let channel_id = required(params.channel_id, "channelId")?;
        let credential = self.credential(headers)?;

        Ok(ProxyRequest {
            resource: Resource::MessageHistory { channel_id },
            pagination: PaginationParams::message_page(
                params.limit.as_deref(),
                params.before,
                params.after,
                params.around,
            ),
            credential,
        })
    }

    /// Validate a reaction-list request.
    pub fn reaction_list(
        &self,
        params: ReactionListParams,
        headers: &HeaderMap,
    ) -> Result<ProxyRequest, ProxyError> {
        let channel_id = required(params.channel_id, "channelId")?;
        let message_id = required(params.message_id, "messageId")?;
        let emoji = required(params.emoji, "emoji")?;
        let credential = self.credential(headers)?;

        Ok(ProxyRequest {
            resource: Resource::ReactionList {
                channel_id,
                message_id,
                emoji,
            },
            pagination: PaginationParams::reaction_page(params.after),
            credential,
        })
    }

    /// Build the outbound URL and `Authorization` value.
    pub fn upstream_request(&self, request: &ProxyRequest) -> Result<UpstreamRequest, ProxyError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = match &request.resource {
            Resource::MessageHistory { channel_id } => {
                format!("/channels/{}/messages", urlencoding::encode(channel_id))
            }
            Resource::ReactionList {
                channel_id,
                message_id,
                emoji,
            } => format!(
                "/channels/{}/messages/{}/reactions/{}",
                urlencoding::encode(channel_id),
                urlencoding::encode(message_id),
                urlencoding::encode(emoji),
            ),
        };

        let mut url = Url::parse(&format!("{base}{path}"))?;
        {
            let page = &request.pagination;
            let mut query = url.query_pairs_mut();
            query.append_pair("limit", &page.limit.to_string());
            match request.kind() {
                ResourceKind::MessageHistory => {
                    for (key, value) in [
                        ("before", &page.before),
                        ("after", &page.after),
                        ("around", &page.around),
                    ] {
                        if let Some(value) = value {
                            query.append_pair(key, value);
                        }
                    }
                }
                ResourceKind::ReactionList => {
                    if let Some(after) = &page.after {
                        query.append_pair("after", after);
                    }
                }
            }
        }

        Ok(UpstreamRequest {
            kind: request.kind(),
            url,
            authorization: request.credential.authorization(),
        })
    }

    fn credential(&self, headers: &HeaderMap) -> Result<Credential, ProxyError> {
        self.policy
            .resolve(headers)
            .ok_or_else(|| ProxyError::MissingCredential(self.policy.header_name().to_string()))
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ProxyError> {
    non_empty(value).ok_or(ProxyError::MissingParameter(name))
}

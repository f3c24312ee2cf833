//! Bot credential policy.
//!
//! A deployment runs in exactly one mode. Server-held mode carries the bot
//! token from startup for the life of the process; caller-supplied mode reads
//! the complete `Authorization` value from an inbound header on each request.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName};

use crate::config::{CredentialConfig, CredentialMode};
use crate::config::ValidationError;

/// Where the upstream `Authorization` value comes from.
#[derive(Clone)]
pub enum CredentialPolicy {
    CallerSupplied { header: HeaderName },
    ServerHeld { token: Arc<str> },
}

/// The credential resolved for one request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Complete header value from the caller, scheme included.
    Caller(String),
    /// Process-wide bot token.
    Bot(Arc<str>),
}

impl Credential {
    /// Value for the upstream `Authorization` header.
    pub fn authorization(&self) -> String {
        match self {
            Self::Caller(raw) => raw.clone(),
            Self::Bot(token) => format!("Bot {token}"),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Caller(_) => f.write_str("Credential::Caller(<redacted>)"),
            Self::Bot(_) => f.write_str("Credential::Bot(<redacted>)"),
        }
    }
}

impl CredentialPolicy {
    /// Build the policy from validated configuration.
    pub fn from_config(config: &CredentialConfig) -> Result<Self, ValidationError> {
        match config.mode {
            CredentialMode::CallerSupplied => {
                if config.bot_token.is_some() {
                    return Err(ValidationError::MixedCredentialModes);
                }
                let header = HeaderName::try_from(config.header.as_str())
                    .map_err(|_| ValidationError::InvalidCredentialHeader)?;
                Ok(Self::CallerSupplied { header })
            }
            CredentialMode::ServerHeld => {
                let token = config
                    .bot_token
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .ok_or(ValidationError::MissingBotToken)?;
                Ok(Self::ServerHeld {
                    token: Arc::from(token),
                })
            }
        }
    }

    /// Resolve the credential for one inbound request.
    ///
    /// `None` only happens in caller-supplied mode when the header is absent,
    /// empty or not valid visible ASCII.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<Credential> {
        match self {
            Self::CallerSupplied { header } => headers
                .get(header)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Credential::Caller(v.to_string())),
            Self::ServerHeld { token } => Some(Credential::Bot(token.clone())),
        }
    }

    /// Inbound header name reported in `MissingCredential` errors.
    pub fn header_name(&self) -> &str {
        match self {
            Self::CallerSupplied { header } => header.as_str(),
            Self::ServerHeld { .. } => "authorization",
        }
    }

    pub fn mode(&self) -> CredentialMode {
        match self {
            Self::CallerSupplied { .. } => CredentialMode::CallerSupplied,
            Self::ServerHeld { .. } => CredentialMode::ServerHeld,
        }
    }
}

impl std::fmt::Debug for CredentialPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CallerSupplied { header } => f
                .debug_struct("CallerSupplied")
                .field("header", header)
                .finish(),
            Self::ServerHeld { .. } => f
                .debug_struct("ServerHeld")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn caller_policy(header: &str) -> CredentialPolicy {
        CredentialPolicy::from_config(&CredentialConfig {
            mode: CredentialMode::CallerSupplied,
            header: header.into(),
            bot_token: None,
        })
        .unwrap()
    }

    #[test]
    fn test_server_held_always_prefixes_bot() {
        let policy = CredentialPolicy::from_config(&CredentialConfig {
            mode: CredentialMode::ServerHeld,
            header: "authorization".into(),
            bot_token: Some("s3cret".into()),
        })
        .unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bot caller"));

        let credential = policy.resolve(&headers).unwrap();
        assert_eq!(credential.authorization(), "Bot s3cret");
        assert_eq!(policy.resolve(&HeaderMap::new()), Some(credential));
    }

    #[test]
    fn test_caller_supplied_forwarded_as_is() {
        let policy = caller_policy("x-bot-token");
        let mut headers = HeaderMap::new();
        headers.insert("x-bot-token", HeaderValue::from_static("Bot abc.def"));

        let credential = policy.resolve(&headers).unwrap();
        assert_eq!(credential.authorization(), "Bot abc.def");
    }

    #[test]
    fn test_caller_supplied_missing_or_blank() {
        let policy = caller_policy("authorization");
        assert_eq!(policy.resolve(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("  "));
        assert_eq!(policy.resolve(&headers), None);
        assert_eq!(policy.header_name(), "authorization");
    }

    #[test]
    fn test_mixed_modes_rejected() {
        let err = CredentialPolicy::from_config(&CredentialConfig {
            mode: CredentialMode::CallerSupplied,
            header: "authorization".into(),
            bot_token: Some("s3cret".into()),
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::MixedCredentialModes);
    }

    #[test]
    fn test_debug_redacts_token() {
        let credential = Credential::Bot(Arc::from("s3cret"));
        assert!(!format!("{credential:?}").contains("s3cret"));
    }
}

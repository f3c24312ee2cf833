//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream chat API settings.
    pub upstream: UpstreamConfig,

    /// How the bot credential reaches the upstream.
    pub credentials: CredentialConfig,

    /// Inbound timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Next-page link construction.
    pub pagination: PaginationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream REST API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every upstream path is appended to.
    pub base_url: String,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Total deadline for one upstream call in seconds.
    pub request_timeout_secs: u64,

    /// User-Agent sent upstream.
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://discord.com/api/v10".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 10,
            user_agent: format!(
                "DiscordBot (https://github.com/discord-relay, {})",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

/// Credential mode for a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CredentialMode {
    /// Callers send the full `Authorization` value; it is forwarded unchanged.
    CallerSupplied,
    /// The relay holds one bot token and sends `Bot <token>` on every call.
    #[default]
    ServerHeld,
}

/// Credential configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Which credential policy this deployment uses.
    pub mode: CredentialMode,

    /// Inbound header carrying the caller's credential (caller-supplied mode).
    pub header: String,

    /// Server-held bot token. Usually injected from `DISCORD_BOT_TOKEN`.
    pub bot_token: Option<String>,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            mode: CredentialMode::ServerHeld,
            header: "authorization".to_string(),
            bot_token: None,
        }
    }
}

// Keeps the token out of `Configuration loaded` logs.
impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("mode", &self.mode)
            .field("header", &self.header)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Pagination link configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PaginationConfig {
    /// Absolute origin for `next_page` links, e.g. "https://relay.example.com".
    /// Derived from the inbound Host header when unset.
    pub public_base_url: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the server-held bot token.
pub const BOT_TOKEN_ENV: &str = "DISCORD_BOT_TOKEN";
/// Overrides `listener.bind_address`.
pub const BIND_ADDRESS_ENV: &str = "RELAY_BIND_ADDRESS";
/// Overrides `upstream.base_url`.
pub const UPSTREAM_URL_ENV: &str = "RELAY_UPSTREAM_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides from the process environment, then validate.
///
/// A missing path means "all defaults".
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document into a configuration without validating it.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Overlay environment values onto a parsed configuration.
///
/// Empty values are ignored so an unset-but-exported variable does not
/// clobber the file.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = get(BOT_TOKEN_ENV) {
        config.credentials.bot_token = Some(token);
    }
    if let Some(addr) = get(BIND_ADDRESS_ENV) {
        config.listener.bind_address = addr;
    }
    if let Some(url) = get(UPSTREAM_URL_ENV) {
        config.upstream.base_url = url;
    }
}

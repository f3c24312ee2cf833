//! Discord REST relay library.
//!
//! Re-exposes channel message history and reaction listing from the Discord
//! REST API, injecting the bot credential and normalizing pagination.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

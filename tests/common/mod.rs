//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use discord_relay::config::{CredentialMode, ProxyConfig};
use discord_relay::{HttpServer, Shutdown};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::MockServer;

pub const BOT_TOKEN: &str = "s3cret";

/// A relay running on an ephemeral port. Shuts down when dropped.
pub struct Relay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl Relay {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

impl Drop for Relay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the relay with `config`. The listener is bound before returning,
/// so requests can be sent immediately.
pub async fn spawn_relay(config: ProxyConfig) -> Relay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    Relay { addr, shutdown }
}

/// Server-held credential mode pointed at `upstream`.
pub fn server_held_config(upstream: &MockServer) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.upstream.base_url = format!("{}/api/v10", upstream.uri());
    config.credentials.bot_token = Some(BOT_TOKEN.to_string());
    config.observability.metrics_enabled = false;
    config
}

/// Caller-supplied credential mode reading `header`, pointed at `upstream`.
pub fn caller_supplied_config(upstream: &MockServer, header: &str) -> ProxyConfig {
    let mut config = server_held_config(upstream);
    config.credentials.mode = CredentialMode::CallerSupplied;
    config.credentials.header = header.to_string();
    config.credentials.bot_token = None;
    config
}

/// `count` reactor objects with ids "1000", "1001", ...
pub fn reactors(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| json!({ "id": (1000 + i).to_string(), "username": format!("user{i}") }))
            .collect(),
    )
}

/// Value of `key` in the query string of the `index`th upstream request.
pub async fn upstream_query_param(upstream: &MockServer, index: usize, key: &str) -> Option<String> {
    let requests = upstream.received_requests().await.unwrap();
    requests[index]
        .url
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub async fn upstream_request_count(upstream: &MockServer) -> usize {
    upstream.received_requests().await.unwrap().len()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

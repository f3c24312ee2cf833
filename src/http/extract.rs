//! Parameter extractors.
//!
//! Wrap axum's `Path` and query parsing so every rejection becomes a
//! `ProxyError` and renders as a JSON body.
//!
//! A repeated query key resolves to its first value, matching how
//! `next_page` links treat a repeated `after`.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::proxy::ProxyError;

/// Path parameters; malformed segments are a 400 `ProxyError`.
#[derive(Debug, Clone)]
pub struct RelayPath<T>(pub T);

impl<S, T> FromRequestParts<S> for RelayPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ProxyError::InvalidRequest(e.body_text()))?;

        Ok(RelayPath(inner))
    }
}

/// Query parameters, first value wins for repeated keys.
#[derive(Debug, Clone)]
pub struct RelayQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for RelayQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_query(parts.uri.query().unwrap_or_default()).map(RelayQuery)
    }
}

fn parse_query<T: DeserializeOwned>(query: &str) -> Result<T, ProxyError> {
    let mut fields = Map::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        fields
            .entry(key.into_owned())
            .or_insert_with(|| Value::String(value.into_owned()));
    }
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ProxyError::InvalidRequest(e.to_string()))
}

//! Relay pipeline.
//!
//! # Data Flow
//! ```text
//! Inbound request (path + query + headers)
//!     → translator.rs (validate ids, resolve credential, clamp pagination)
//!     → UpstreamRequest (URL + Authorization)
//!     → [http client: single call, no retries]
//!     → UpstreamResult (status, content type, body text)
//!     → normalizer.rs (error passthrough, JSON check, next-page cursor)
//!     → NormalizedResponse
//! ```
//!
//! # Design Decisions
//! - Pure functions on both sides of the outbound call; no shared state
//! - Every failure is a `ProxyError` that renders to a JSON body

pub mod error;
pub mod normalizer;
pub mod translator;
pub mod types;

pub use error::ProxyError;
pub use normalizer::{next_page_cursor, next_page_url, normalize};
pub use translator::{MessageHistoryParams, ReactionListParams, RequestTranslator};
pub use types::{
    NormalizedResponse, PaginationParams, ProxyRequest, Resource, ResourceKind, UpstreamRequest,
    UpstreamResult, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT, REACTION_PAGE_SIZE,
};

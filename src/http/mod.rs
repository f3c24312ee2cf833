//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → extract.rs (path/query parameters, JSON rejections)
//!     → handlers.rs (path or query route → relay pipeline)
//!     → client.rs (single upstream call)
//!     → response.rs (JSON bodies, error rendering)
//!     → Send to client
//! ```

pub mod client;
pub mod extract;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use client::UpstreamClient;
pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};

//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → credentials.rs (resolve caller header or server-held token)
//!     → Request translator (Authorization header for upstream)
//! ```
//!
//! # Design Decisions
//! - One credential mode per deployment, fixed at startup
//! - Presence check only; callers are not otherwise authenticated
//! - Tokens never appear in Debug output or logs

pub mod credentials;

pub use credentials::{Credential, CredentialPolicy};

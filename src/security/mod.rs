//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Routing endpoint:
//!     → auth.rs (X-API-Key → ClientIdentity, or 401/403)
//!
//! Every response:
//!     → headers.rs (hardening headers, strip server banners)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a missing or unknown key never reaches an upstream
//! - No trust in client input; credentials are never echoed or logged

pub mod auth;
pub mod headers;

pub use auth::{AuthError, Authenticator, ClientIdentity, CredentialStore};

//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher (resolved UpstreamTarget)
//!     → client.rs (POST {base}/api, shared pool, timeout)
//!     → UpstreamResponse { status, body: Json | Text }
//!        or UpstreamError { Timeout | Unreachable | Internal }
//!
//! Health endpoints
//!     → client.rs probe (GET {base}/health)
//!     → UpstreamHealth { healthy | unhealthy | unreachable }
//! ```

pub mod client;

pub use client::{UpstreamBody, UpstreamClient, UpstreamError, UpstreamHealth, UpstreamResponse};

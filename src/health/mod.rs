//! Health and readiness subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health:
//!     → probe.rs (GET {base}/health on every upstream, concurrently)
//!     → { nginx-N: healthy | unhealthy | unreachable }
//!
//! GET /ready:
//!     → readiness.rs (auth configured? then any upstream healthy?)
//!     → Ok | NotReady
//! ```
//!
//! # Design Decisions
//! - Probes run per request; no background state is kept
//! - A probe never fails the endpoint; failures become a status value

pub mod probe;
pub mod readiness;

pub use probe::check_upstreams;
pub use readiness::{check_readiness, NotReady};

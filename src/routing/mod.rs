//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/route { cellID }
//!     → dispatcher.rs (validate → authenticate → resolve → forward)
//!     → registry.rs (cell ID → UpstreamTarget or NotFound)
//!     → upstream client
//!     → RouteResult or DispatchError, plus the RequestContext
//! ```
//!
//! # Design Decisions
//! - Upstreams fixed at startup, immutable at runtime
//! - Exact cell ID lookup only; no patterns, no fallbacks
//! - Deterministic: same cell always goes to the same upstream

pub mod cell;
pub mod dispatcher;
pub mod registry;

pub use cell::{CellId, CellTag};
pub use dispatcher::{DispatchError, Dispatched, Dispatcher, RequestContext};
pub use registry::{UpstreamRegistry, UpstreamTarget};

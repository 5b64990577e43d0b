//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, request ID on every routing log)
//!     → metrics.rs (counters and a latency histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → GET /metrics (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

pub use metrics::RouterMetrics;

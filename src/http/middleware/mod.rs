//! HTTP middleware.

pub mod track;

pub use track::{track_requests, METRICS_PATH};

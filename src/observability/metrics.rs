//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define router metrics (requests, latency, upstream errors, auth failures)
//! - Expose Prometheus text for the `/metrics` endpoint
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by cell_id, status, method, client
//! - `router_request_duration_seconds` (histogram): latency by cell_id, method
//! - `router_upstream_errors_total` (counter): failed forwards by cell_id, upstream
//! - `router_auth_failures_total` (counter): rejected credentials by reason
//!
//! # Design Decisions
//! - Each `RouterMetrics` owns its recorder; nothing is installed globally,
//!   so independent routers (and tests) never share counters
//! - Updates are atomic inside the exporter; no lock on the hot path
//! - `cell_id` only ever carries a configured cell, `none` or `invalid`

use std::time::Duration;

use axum::http::Method;
use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

use crate::routing::cell::CellTag;
use crate::routing::registry::UpstreamTarget;

pub const REQUESTS_TOTAL: &str = "router_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "router_request_duration_seconds";
pub const UPSTREAM_ERRORS_TOTAL: &str = "router_upstream_errors_total";
pub const AUTH_FAILURES_TOTAL: &str = "router_auth_failures_total";

/// Histogram buckets tuned for web latencies (seconds).
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Client label used before (or without) authentication.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// `method` label value. Extension methods share `other` so arbitrary
/// verbs cannot mint new series.
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        "CONNECT" => "CONNECT",
        "TRACE" => "TRACE",
        _ => "other",
    }
}

/// Reason label of `router_auth_failures_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureReason {
    MissingKey,
    InvalidKey,
}

impl AuthFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthFailureReason::MissingKey => "missing_key",
            AuthFailureReason::InvalidKey => "invalid_key",
        }
    }
}

/// Router metrics backed by a private Prometheus recorder.
pub struct RouterMetrics {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
}

impl std::fmt::Debug for RouterMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterMetrics").finish_non_exhaustive()
    }
}

impl RouterMetrics {
    /// Build a recorder with the router's histogram buckets and descriptions.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(REQUEST_DURATION_SECONDS.to_string()),
                DURATION_BUCKETS,
            )?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(REQUESTS_TOTAL, "Total number of requests by cell_id and status");
            describe_histogram!(REQUEST_DURATION_SECONDS, Unit::Seconds, "Request duration in seconds");
            describe_counter!(UPSTREAM_ERRORS_TOTAL, "Total number of upstream errors by cell_id");
            describe_counter!(AUTH_FAILURES_TOTAL, "Total number of authentication failures");
        });

        Ok(Self { recorder, handle })
    }

    /// Record one completed request.
    pub fn record_request(
        &self,
        cell: &CellTag,
        method: &str,
        status: u16,
        client: &str,
        elapsed: Duration,
    ) {
        let cell_id = cell.label();
        metrics::with_local_recorder(&self.recorder, || {
            counter!(
                REQUESTS_TOTAL,
                "cell_id" => cell_id.clone(),
                "status" => status.to_string(),
                "method" => method.to_string(),
                "client" => client.to_string()
            )
            .increment(1);
            histogram!(
                REQUEST_DURATION_SECONDS,
                "cell_id" => cell_id,
                "method" => method.to_string()
            )
            .record(elapsed.as_secs_f64());
        });
    }

    /// Record a failed forward to `target`.
    pub fn record_upstream_error(&self, target: &UpstreamTarget) {
        metrics::with_local_recorder(&self.recorder, || {
            counter!(
                UPSTREAM_ERRORS_TOTAL,
                "cell_id" => target.cell_id.to_string(),
                "upstream" => target.name().to_string()
            )
            .increment(1);
        });
    }

    /// Record a rejected credential.
    pub fn record_auth_failure(&self, reason: AuthFailureReason) {
        metrics::with_local_recorder(&self.recorder, || {
            counter!(AUTH_FAILURES_TOTAL, "reason" => reason.as_str()).increment(1);
        });
    }

    /// Render the Prometheus text exposition.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

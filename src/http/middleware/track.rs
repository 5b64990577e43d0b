//! Request tracking middleware.
//! Times every request, records one metric sample and hardens the response.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics::{method_label, RouterMetrics, UNKNOWN_CLIENT};
use crate::routing::dispatcher::RequestContext;
use crate::security::headers::apply_security_headers;

/// Path of the metrics exposition, which is never tracked.
pub const METRICS_PATH: &str = "/metrics";

pub async fn track_requests(
    State(metrics): State<Arc<RouterMetrics>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == METRICS_PATH {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = method_label(request.method());

    let mut response = next.run(request).await;

    // Handlers that resolved a cell or client hand it back on the response;
    // everything else falls back to the default (no cell, unknown client).
    let context = response
        .extensions_mut()
        .remove::<RequestContext>()
        .unwrap_or_default();
    let client = context
        .client
        .as_ref()
        .map(|c| c.as_str())
        .unwrap_or(UNKNOWN_CLIENT);

    metrics.record_request(
        &context.cell,
        method,
        response.status().as_u16(),
        client,
        start.elapsed(),
    );

    apply_security_headers(response.headers_mut());
    response
}

//! Endpoint handlers.
//!
//! # Endpoints
//! - `POST /api/route`: dispatch to the cell's upstream
//! - `GET /health`: liveness plus a probe of every upstream
//! - `GET /ready`: 200 when the router can serve traffic, 503 otherwise
//! - `GET /metrics`: Prometheus text exposition
//! - `GET /`: service metadata

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::health::{check_readiness, check_upstreams};
use crate::http::request::{api_key, original_url, request_id};
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::routing::dispatcher::{Dispatched, Inbound};
use crate::upstream::client::UpstreamHealth;

pub const ROUTE_PATH: &str = "/api/route";
pub const HEALTH_PATH: &str = "/health";
pub const READY_PATH: &str = "/ready";

/// Content type of the Prometheus text format.
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: String,
    pub upstreams: BTreeMap<String, UpstreamHealth>,
    pub auth_enabled: bool,
    pub auth_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadyReport {
    pub status: &'static str,
    pub auth_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub description: String,
    pub auth_enabled: bool,
    pub auth_configured: bool,
    pub endpoints: BTreeMap<&'static str, String>,
}

/// `POST /api/route`
pub async fn route(State(state): State<AppState>, request: Request<Body>) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, body) = request.into_parts();

    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > state.max_body_size) {
        return body_too_large();
    }

    // Chunked bodies carry no length; the read itself is bounded.
    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read request body");
            return body_too_large();
        }
    };

    let original_uri = original_url(&parts.headers, &parts.uri);
    let credential = api_key(&parts.headers);
    let inbound = Inbound {
        body: &body,
        credential: credential.as_deref(),
        peer,
        original_uri: &original_uri,
        request_id: request_id(&parts.headers),
    };

    let dispatched: Dispatched = state.components.dispatcher.dispatch(inbound).await;
    dispatched.into_response()
}

fn body_too_large() -> Response {
    ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let upstreams = check_upstreams(&state.components.client, &state.components.registry).await;
    let auth = &state.components.authenticator;
    Json(HealthReport {
        status: "healthy",
        version: state.service.version.clone(),
        upstreams,
        auth_enabled: auth.enabled(),
        auth_configured: auth.configured(),
    })
}

/// `GET /ready`
pub async fn ready(State(state): State<AppState>) -> Response {
    let components = &state.components;
    match check_readiness(&components.authenticator, &components.client, &components.registry).await {
        Ok(()) => Json(ReadyReport {
            status: "ready",
            auth_enabled: components.authenticator.enabled(),
        })
        .into_response(),
        Err(reason) => ApiError::new(StatusCode::SERVICE_UNAVAILABLE, reason.to_string()).into_response(),
    }
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        state.components.metrics.render(),
    )
        .into_response()
}

/// `GET /`
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    let auth = &state.components.authenticator;
    let route = if auth.enabled() {
        format!("{ROUTE_PATH} (requires auth)")
    } else {
        ROUTE_PATH.to_string()
    };
    let endpoints = BTreeMap::from([
        ("route", route),
        ("health", HEALTH_PATH.to_string()),
        ("ready", READY_PATH.to_string()),
        ("metrics", crate::http::middleware::METRICS_PATH.to_string()),
    ]);

    Json(ServiceInfo {
        service: state.service.name.clone(),
        version: state.service.version.clone(),
        description: state.service.description.clone(),
        auth_enabled: auth.enabled(),
        auth_configured: auth.configured(),
        endpoints,
    })
}

/// Any unmatched path.
pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Not Found")
}

/// A known path called with the wrong method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

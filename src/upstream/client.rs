//! Outbound HTTP client for upstream cells.
//!
//! # Responsibilities
//! - Own the single pooled client shared by every request
//! - POST routed requests to `{base}/api` with routing headers
//! - Classify failures as timeout, unreachable or internal
//! - Probe `{base}/health` for health and readiness reports
//!
//! # Design Decisions
//! - One `reqwest::Client` for the process; clones share the pool
//! - The configured timeout covers the whole exchange, body included
//! - No retries: a failure is reported once and surfaced immediately
//! - Dropping the returned future abandons the outbound call

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;

use crate::routing::registry::UpstreamTarget;

pub const X_CELL_ID: &str = "x-cell-id";
pub const X_CLIENT_ID: &str = "x-client-id";
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_ORIGINAL_URI: &str = "x-original-uri";

/// Body of an upstream response: parsed JSON or raw text, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpstreamBody {
    Json(Value),
    Text(String),
}

/// What the upstream answered.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: UpstreamBody,
}

/// Per-request data forwarded to the upstream.
#[derive(Debug, Clone)]
pub struct ForwardRequest<'a> {
    pub client_id: &'a str,
    /// Caller address, `None` when the transport did not report one.
    pub forwarded_for: Option<String>,
    pub original_uri: &'a str,
}

/// Failure classes of an upstream call.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream timed out")]
    Timeout(#[source] reqwest::Error),

    #[error("upstream unreachable")]
    Unreachable(#[source] reqwest::Error),

    #[error("unexpected upstream failure: {0}")]
    Internal(String),
}

impl UpstreamError {
    fn classify(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(err)
        } else if err.is_connect() || err.is_request() || err.is_body() {
            UpstreamError::Unreachable(err)
        } else {
            UpstreamError::Internal(err.to_string())
        }
    }
}

/// Result of a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamHealth {
    Healthy,
    Unhealthy,
    Unreachable,
}

#[derive(Serialize)]
struct ForwardPayload<'a> {
    #[serde(rename = "cellID")]
    cell_id: &'a str,
    timestamp: f64,
}

/// Shared, pooled client for all upstreams.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    inner: reqwest::Client,
    probe_timeout: Duration,
}

impl UpstreamClient {
    /// Build the client with a per-call timeout.
    pub fn new(request_timeout: Duration, probe_timeout: Duration) -> Result<Self, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(request_timeout)
            .no_proxy()
            .build()?;
        Ok(Self {
            inner,
            probe_timeout,
        })
    }

    /// Forward a routed request to `target`.
    pub async fn forward(
        &self,
        target: &UpstreamTarget,
        request: ForwardRequest<'_>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let payload = ForwardPayload {
            cell_id: target.cell_id.as_str(),
            timestamp: unix_timestamp(),
        };

        let response = self
            .inner
            .post(target.api_url())
            .json(&payload)
            .header(X_CELL_ID, target.cell_id.as_str())
            .header(X_CLIENT_ID, request.client_id)
            .header(
                X_FORWARDED_FOR,
                request.forwarded_for.as_deref().unwrap_or("unknown"),
            )
            .header(X_ORIGINAL_URI, request.original_uri)
            .send()
            .await
            .map_err(UpstreamError::classify)?;

        let status = response.status().as_u16();
        let structured = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_content_type);

        let text = response.text().await.map_err(UpstreamError::classify)?;
        let body = if structured {
            let value = serde_json::from_str(&text).map_err(|e| {
                UpstreamError::Internal(format!("upstream declared JSON but sent invalid body: {e}"))
            })?;
            UpstreamBody::Json(value)
        } else {
            UpstreamBody::Text(text)
        };

        Ok(UpstreamResponse { status, body })
    }

    /// Probe `{base}/health`.
    pub async fn probe(&self, target: &UpstreamTarget) -> UpstreamHealth {
        let result = self
            .inner
            .get(target.health_url())
            .timeout(self.probe_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().as_u16() == 200 => UpstreamHealth::Healthy,
            Ok(response) => {
                tracing::warn!(upstream = %target.name(), status = %response.status(), "Health check failed: non-success status");
                UpstreamHealth::Unhealthy
            }
            Err(e) => {
                tracing::warn!(upstream = %target.name(), error = %e, "Health check failed: unreachable");
                UpstreamHealth::Unreachable
            }
        }
    }
}

/// True for `application/json` and `application/*+json` media types.
pub fn is_json_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

fn unix_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

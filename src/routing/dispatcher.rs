//! Request dispatch: the routing endpoint's state machine.
//!
//! # States
//! ```text
//! Received → Validated → Authenticated → Resolved → Forwarded
//!     → Succeeded | TimedOut | UpstreamUnreachable | InternalError
//! ```
//!
//! # Design Decisions
//! - Validation runs before authentication and before any network I/O
//! - Every forwarding failure bumps the upstream error counter exactly once
//! - The request context is returned with the outcome on every path

use std::net::SocketAddr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::observability::metrics::RouterMetrics;
use crate::routing::cell::{CellId, CellTag, MAX_CELL_ID_LEN};
use crate::routing::registry::{UpstreamRegistry, UpstreamTarget};
use crate::security::auth::{AuthError, Authenticator, ClientIdentity};
use crate::upstream::client::{ForwardRequest, UpstreamBody, UpstreamClient, UpstreamError};

/// Inbound payload of the routing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    #[serde(rename = "cellID")]
    pub cell_id: Option<String>,
}

/// Successful dispatch, serialized as the endpoint's response body.
#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    #[serde(rename = "cellID")]
    pub cell_id: CellId,
    pub upstream: String,
    pub status: u16,
    pub response: UpstreamBody,
}

/// Dispatch failures, each mapped to one fixed HTTP status at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Timeout connecting to {upstream}")]
    UpstreamTimeout { upstream: String },

    #[error("Error connecting to {upstream}")]
    UpstreamUnreachable { upstream: String },

    #[error("Internal server error")]
    Internal,
}

/// Per-request values read back by the tracking middleware.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub cell: CellTag,
    pub client: Option<ClientIdentity>,
}

/// Everything the caller needs from one dispatch.
#[derive(Debug)]
pub struct Dispatched {
    pub context: RequestContext,
    pub outcome: Result<RouteResult, DispatchError>,
}

/// Transport-level facts about the inbound request.
#[derive(Debug, Clone)]
pub struct Inbound<'a> {
    pub body: &'a [u8],
    pub credential: Option<&'a str>,
    pub peer: Option<SocketAddr>,
    pub original_uri: &'a str,
    pub request_id: &'a str,
}

/// Routes requests to the upstream of their cell.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<UpstreamRegistry>,
    authenticator: Arc<Authenticator>,
    client: UpstreamClient,
    metrics: Arc<RouterMetrics>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<UpstreamRegistry>,
        authenticator: Arc<Authenticator>,
        client: UpstreamClient,
        metrics: Arc<RouterMetrics>,
    ) -> Self {
        Self {
            registry,
            authenticator,
            client,
            metrics,
        }
    }

    /// Run one request through the state machine.
    pub async fn dispatch(&self, inbound: Inbound<'_>) -> Dispatched {
        let mut context = RequestContext::default();
        let outcome = self.run(&inbound, &mut context).await;
        Dispatched { context, outcome }
    }

    async fn run(
        &self,
        inbound: &Inbound<'_>,
        context: &mut RequestContext,
    ) -> Result<RouteResult, DispatchError> {
        // Validated and resolved: a valid cell is by definition a registry key.
        let target = self.validate(inbound.body, context)?;

        // Authenticated
        let client = self.authenticator.authenticate(inbound.credential)?;
        context.client = Some(client.clone());

        tracing::info!(
            request_id = %inbound.request_id,
            client = %client,
            cell_id = %target.cell_id,
            target = %target.api_url(),
            "Routing request"
        );

        // Forwarded
        let forward = ForwardRequest {
            client_id: client.as_str(),
            forwarded_for: inbound.peer.map(|p| p.ip().to_string()),
            original_uri: inbound.original_uri,
        };

        match self.client.forward(target, forward).await {
            Ok(response) => Ok(RouteResult {
                cell_id: target.cell_id.clone(),
                upstream: target.name().to_string(),
                status: response.status,
                response: response.body,
            }),
            Err(e) => Err(self.upstream_failure(target, inbound.request_id, e)),
        }
    }

    /// Parse the body and resolve the cell against the registry.
    fn validate(
        &self,
        body: &[u8],
        context: &mut RequestContext,
    ) -> Result<&UpstreamTarget, DispatchError> {
        let request: RouteRequest = serde_json::from_slice(body)
            .map_err(|e| DispatchError::Validation(format!("Invalid request body: {e}")))?;

        let cell = match request.cell_id {
            Some(cell) if !cell.is_empty() => cell,
            Some(_) => {
                return Err(DispatchError::Validation(
                    "cellID must be at least 1 character".to_string(),
                ))
            }
            None => return Err(DispatchError::Validation("cellID is required".to_string())),
        };

        // Anything non-empty from here on is either a configured cell or `invalid`.
        if cell.chars().count() > MAX_CELL_ID_LEN {
            context.cell = CellTag::Invalid;
            return Err(DispatchError::Validation(format!(
                "cellID must be at most {MAX_CELL_ID_LEN} characters"
            )));
        }

        match self.registry.resolve(&cell) {
            Ok(target) => {
                context.cell = CellTag::Cell(target.cell_id.clone());
                Ok(target)
            }
            Err(_) => {
                context.cell = CellTag::Invalid;
                Err(DispatchError::Validation(format!(
                    "cellID must be one of: {}",
                    self.valid_cells()
                )))
            }
        }
    }

    fn upstream_failure(
        &self,
        target: &UpstreamTarget,
        request_id: &str,
        err: UpstreamError,
    ) -> DispatchError {
        self.metrics.record_upstream_error(target);
        let upstream = target.name().to_string();
        match err {
            UpstreamError::Timeout(e) => {
                tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Timeout connecting to upstream");
                DispatchError::UpstreamTimeout { upstream }
            }
            UpstreamError::Unreachable(e) => {
                tracing::error!(request_id = %request_id, upstream = %upstream, error = %e, "Error connecting to upstream");
                DispatchError::UpstreamUnreachable { upstream }
            }
            UpstreamError::Internal(reason) => {
                tracing::error!(request_id = %request_id, upstream = %upstream, error = %reason, "Unexpected error routing to upstream");
                DispatchError::Internal
            }
        }
    }

    fn valid_cells(&self) -> String {
        self.registry
            .cell_ids()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

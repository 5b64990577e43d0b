//! Readiness evaluation.
//!
//! A router is ready when it can authenticate callers (or does not need to)
//! and at least one upstream is healthy. Auth is checked first so that a
//! misconfigured key set is reported without touching the network.

use crate::health::probe::{any_healthy, check_upstreams};
use crate::routing::registry::UpstreamRegistry;
use crate::security::auth::Authenticator;
use crate::upstream::client::UpstreamClient;

/// Why the router is not ready. The message is the 503 body's `detail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotReady {
    #[error("Authentication enabled but no API keys configured")]
    AuthUnconfigured,

    #[error("No healthy upstreams available")]
    NoHealthyUpstreams,
}

pub async fn check_readiness(
    authenticator: &Authenticator,
    client: &UpstreamClient,
    registry: &UpstreamRegistry,
) -> Result<(), NotReady> {
    if !authenticator.configured() {
        tracing::warn!("Not ready: authentication enabled but no API keys configured");
        return Err(NotReady::AuthUnconfigured);
    }

    let report = check_upstreams(client, registry).await;
    if !any_healthy(&report) {
        tracing::warn!(?report, "Not ready: no healthy upstreams");
        return Err(NotReady::NoHealthyUpstreams);
    }

    Ok(())
}

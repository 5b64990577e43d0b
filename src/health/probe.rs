//! Upstream health probing.
//!
//! # Responsibilities
//! - Probe every configured upstream on demand
//! - Report a per-upstream status keyed by upstream name

use std::collections::BTreeMap;

use futures_util::future::join_all;

use crate::routing::registry::UpstreamRegistry;
use crate::upstream::client::{UpstreamClient, UpstreamHealth};

/// Probe all upstreams concurrently. Keys are upstream names (`nginx-{cell}`),
/// sorted by cell ID.
pub async fn check_upstreams(
    client: &UpstreamClient,
    registry: &UpstreamRegistry,
) -> BTreeMap<String, UpstreamHealth> {
    let probes = registry.targets().map(|target| async move {
        let health = client.probe(target).await;
        tracing::debug!(upstream = %target.name(), ?health, "Probed upstream");
        (target.name().to_string(), health)
    });

    join_all(probes).await.into_iter().collect()
}

/// True when at least one upstream answered healthy.
pub fn any_healthy(report: &BTreeMap<String, UpstreamHealth>) -> bool {
    report.values().any(|h| *h == UpstreamHealth::Healthy)
}

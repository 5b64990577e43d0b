//! Upstream registry: cell ID → upstream target.
//!
//! # Responsibilities
//! - Store one upstream per configured cell
//! - Resolve a cell ID to its target or an explicit not-found
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - BTreeMap keeps iteration sorted by cell ID for stable health reports
//! - The synthetic upstream name (`nginx-{cell}`) is computed once here

use std::collections::BTreeMap;
use url::Url;

use crate::routing::cell::{CellId, CellIdError};

/// Prefix of the synthetic upstream name used in responses and metrics.
pub const UPSTREAM_NAME_PREFIX: &str = "nginx-";

/// Errors raised while building the registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid cell id {cell:?}: {source}")]
    CellId {
        cell: String,
        #[source]
        source: CellIdError,
    },

    #[error("invalid upstream url for cell {cell}: {url}")]
    Url { cell: String, url: String },
}

/// One configured upstream.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub cell_id: CellId,
    pub base_url: Url,
    name: String,
    api_url: String,
}

impl UpstreamTarget {
    pub fn new(cell_id: CellId, base_url: Url) -> Self {
        let name = format!("{}{}", UPSTREAM_NAME_PREFIX, cell_id);
        let base = base_url.as_str().trim_end_matches('/');
        let api_url = format!("{}/api", base);
        Self {
            cell_id,
            base_url,
            name,
            api_url,
        }
    }

    /// Synthetic upstream name, e.g. `nginx-1`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Forwarding endpoint: `{base}/api`.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Probe endpoint: `{base}/health`.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url.as_str().trim_end_matches('/'))
    }
}

/// Cell ID was not one of the configured cells.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cell {0:?} is not configured")]
pub struct NotFound(pub String);

/// Static mapping of cells to upstreams.
#[derive(Debug, Default)]
pub struct UpstreamRegistry {
    targets: BTreeMap<CellId, UpstreamTarget>,
}

impl UpstreamRegistry {
    /// Build the registry from `cell id → base url` pairs.
    pub fn from_config<'a, I>(upstreams: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut targets = BTreeMap::new();
        for (cell, url) in upstreams {
            let cell_id = CellId::parse(cell.as_str()).map_err(|source| RegistryError::CellId {
                cell: cell.clone(),
                source,
            })?;
            let base_url = Url::parse(url)
                .ok()
                .filter(|u| matches!(u.scheme(), "http" | "https"))
                .ok_or_else(|| RegistryError::Url {
                    cell: cell.clone(),
                    url: url.clone(),
                })?;
            targets.insert(cell_id.clone(), UpstreamTarget::new(cell_id, base_url));
        }
        Ok(Self { targets })
    }

    /// Look up the target for a raw cell ID.
    pub fn resolve(&self, cell: &str) -> Result<&UpstreamTarget, NotFound> {
        // CellId ordering is the inner string ordering, so a parsed lookup key works.
        CellId::parse(cell)
            .ok()
            .and_then(|id| self.targets.get(&id))
            .ok_or_else(|| NotFound(cell.to_string()))
    }

    /// Configured cell IDs in sorted order.
    pub fn cell_ids(&self) -> impl Iterator<Item = &CellId> {
        self.targets.keys()
    }

    pub fn targets(&self) -> impl Iterator<Item = &UpstreamTarget> {
        self.targets.values()
    }
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Build every shared component from a validated `RouterConfig`
//! - Report what the router will serve (upstreams, auth mode)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Components are built in dependency order: metrics, registry,
//!   authenticator, client, dispatcher

use std::sync::Arc;

use metrics_exporter_prometheus::BuildError;

use crate::config::schema::RouterConfig;
use crate::observability::metrics::RouterMetrics;
use crate::routing::dispatcher::Dispatcher;
use crate::routing::registry::{RegistryError, UpstreamRegistry};
use crate::security::auth::{Authenticator, CredentialStore};
use crate::upstream::client::UpstreamClient;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to build metrics recorder: {0}")]
    Metrics(#[from] BuildError),

    #[error("invalid upstream configuration: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Shared components of a running router.
#[derive(Debug, Clone)]
pub struct Components {
    pub metrics: Arc<RouterMetrics>,
    pub registry: Arc<UpstreamRegistry>,
    pub authenticator: Arc<Authenticator>,
    pub client: UpstreamClient,
    pub dispatcher: Dispatcher,
}

impl Components {
    pub fn build(config: &RouterConfig) -> Result<Self, StartupError> {
        let metrics = Arc::new(RouterMetrics::new()?);
        let registry = Arc::new(UpstreamRegistry::from_config(&config.upstreams)?);
        let authenticator = Arc::new(Authenticator::new(
            config.auth.enabled,
            CredentialStore::new(config.auth.api_keys.clone()),
            metrics.clone(),
        ));
        let client = UpstreamClient::new(config.timeouts.request(), config.timeouts.health_probe())?;
        let dispatcher = Dispatcher::new(
            registry.clone(),
            authenticator.clone(),
            client.clone(),
            metrics.clone(),
        );

        for target in registry.targets() {
            tracing::info!(cell_id = %target.cell_id, upstream = %target.name(), url = %target.base_url, "Configured upstream");
        }
        tracing::info!(
            auth_enabled = authenticator.enabled(),
            api_keys = config.auth.api_keys.len(),
            request_timeout_secs = config.timeouts.request_secs,
            "Router components initialized"
        );

        Ok(Self {
            metrics,
            registry,
            authenticator,
            client,
            dispatcher,
        })
    }
}

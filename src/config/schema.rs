//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the cell router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Service metadata reported by `/` and `/health`.
    pub service: ServiceConfig,

    /// API key authentication.
    pub auth: AuthConfig,

    /// Upstream base URL per cell ID.
    pub upstreams: BTreeMap<String, String>,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            service: ServiceConfig::default(),
            auth: AuthConfig::default(),
            upstreams: default_upstreams(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Service metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "Cell Router API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Routes requests to appropriate NGINX instances based on cell ID".to_string(),
        }
    }
}

/// API key authentication configuration.
#[derive(Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Require an API key on the routing endpoint.
    pub enabled: bool,

    /// API key → client name.
    pub api_keys: BTreeMap<String, String>,
}

impl std::fmt::Debug for AuthConfig {
    // Keys are secrets; only their count is printable.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("enabled", &self.enabled)
            .field("api_keys", &self.api_keys.len())
            .finish()
    }
}

/// Timeout configuration, in (fractional) seconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Bound on each forwarded upstream call.
    pub request_secs: f64,

    /// Bound on each upstream health probe.
    pub health_probe_secs: f64,
}

impl TimeoutConfig {
    // Validation rejects non-positive values; these fall back to the defaults.
    pub fn request(&self) -> Duration {
        Duration::try_from_secs_f64(self.request_secs).unwrap_or(Duration::from_secs(30))
    }

    pub fn health_probe(&self) -> Duration {
        Duration::try_from_secs_f64(self.health_probe_secs).unwrap_or(Duration::from_secs(5))
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30.0,
            health_probe_secs: 5.0,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Apply a permissive CORS policy.
    pub cors_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
            cors_enabled: true,
        }
    }
}

fn default_upstreams() -> BTreeMap<String, String> {
    (1..=3)
        .map(|n| {
            (
                n.to_string(),
                format!("http://nginx-{n}-nginx-cell.nginx.svc.cluster.local"),
            )
        })
        .collect()
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check cell IDs and upstream URLs
//! - Validate value ranges (timeouts > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Auth enabled with no keys is NOT an error here; readiness reports it

use std::net::SocketAddr;
use url::Url;

use crate::config::schema::RouterConfig;
use crate::routing::cell::CellId;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("no upstreams configured")]
    NoUpstreams,

    #[error("invalid cell id {0:?}: must be 1-10 characters")]
    InvalidCellId(String),

    #[error("upstream url for cell {cell} is not an http(s) url: {url}")]
    InvalidUpstreamUrl { cell: String, url: String },

    #[error("timeouts.{field} must be a positive number of seconds (got {value})")]
    InvalidTimeout { field: &'static str, value: f64 },

    #[error("invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("unknown log level: {0}")]
    InvalidLogLevel(String),

    #[error("security.max_body_size must be greater than zero")]
    InvalidBodyLimit,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstreams.is_empty() {
        errors.push(ValidationError::NoUpstreams);
    }

    for (cell, url) in &config.upstreams {
        if CellId::parse(cell.as_str()).is_err() {
            errors.push(ValidationError::InvalidCellId(cell.clone()));
        }
        let ok = Url::parse(url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !ok {
            errors.push(ValidationError::InvalidUpstreamUrl {
                cell: cell.clone(),
                url: url.clone(),
            });
        }
    }

    for (field, value) in [
        ("request_secs", config.timeouts.request_secs),
        ("health_probe_secs", config.timeouts.health_probe_secs),
    ] {
        if !(value.is_finite() && value > 0.0) {
            errors.push(ValidationError::InvalidTimeout { field, value });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::InvalidBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

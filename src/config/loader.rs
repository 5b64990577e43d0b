//! Configuration loading from disk and environment.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: TOML file (optional), then environment overrides,
/// then validation.
pub fn load_config(path: Option<&Path>) -> Result<RouterConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RouterConfig::default(),
    };

    apply_env_overrides(&mut config, std::env::vars());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides to `config`.
///
/// Recognized variables:
/// - `API_KEY_ENABLED`: `true` (any case) enables authentication
/// - `API_KEYS_JSON`: JSON object of API key → client name
/// - `NGINX_{CELL}_URL`: upstream base URL of a configured cell
/// - `REQUEST_TIMEOUT`: upstream timeout in seconds
/// - `LOG_LEVEL`, `BIND_ADDRESS`
pub fn apply_env_overrides<I>(config: &mut RouterConfig, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    let vars: BTreeMap<String, String> = vars.into_iter().collect();

    if let Some(v) = vars.get("API_KEY_ENABLED") {
        config.auth.enabled = v.eq_ignore_ascii_case("true");
    }

    if let Some(v) = vars.get("API_KEYS_JSON").filter(|v| !v.is_empty()) {
        match serde_json::from_str::<BTreeMap<String, String>>(v) {
            Ok(keys) => {
                tracing::info!(count = keys.len(), "Loaded API keys from API_KEYS_JSON");
                config.auth.api_keys = keys;
            }
            Err(_) => {
                // Never echo the value: it holds secrets.
                tracing::error!("Failed to parse API_KEYS_JSON - ensure it's a valid JSON object");
            }
        }
    }

    for (cell, url) in config.upstreams.iter_mut() {
        let key = format!("NGINX_{}_URL", cell.to_ascii_uppercase());
        if let Some(v) = vars.get(&key) {
            *url = v.clone();
        }
    }

    if let Some(v) = vars.get("REQUEST_TIMEOUT") {
        match v.parse::<f64>() {
            Ok(secs) => config.timeouts.request_secs = secs,
            Err(_) => tracing::warn!(value = %v, "Ignoring unparseable REQUEST_TIMEOUT"),
        }
    }

    if let Some(v) = vars.get("LOG_LEVEL") {
        config.observability.log_level = v.to_ascii_lowercase();
    }

    if let Some(v) = vars.get("BIND_ADDRESS") {
        config.listener.bind_address = v.clone();
    }
}

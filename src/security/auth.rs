//! API key authentication.
//!
//! # Responsibilities
//! - Hold the static credential → client identity mapping
//! - Validate the `X-API-Key` value of a request
//! - Count every rejected attempt exactly once
//!
//! # Design Decisions
//! - Auth disabled means every caller is `anonymous`, credential ignored
//! - Empty header value is treated as no credential
//! - Rejected keys are logged by SHA-256 fingerprint only

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::observability::metrics::{AuthFailureReason, RouterMetrics};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Identity returned when authentication is disabled.
pub const ANONYMOUS: &str = "anonymous";

/// Name of an authenticated (or anonymous) caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authentication failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("API key required")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidCredential,
}

impl AuthError {
    fn reason(&self) -> AuthFailureReason {
        match self {
            AuthError::MissingCredential => AuthFailureReason::MissingKey,
            AuthError::InvalidCredential => AuthFailureReason::InvalidKey,
        }
    }
}

/// Static credential store, loaded once at startup.
#[derive(Clone, Default)]
pub struct CredentialStore {
    keys: HashMap<String, ClientIdentity>,
}

impl fmt::Debug for CredentialStore {
    // Never print the keys themselves.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl CredentialStore {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            keys: entries
                .into_iter()
                .map(|(k, v)| (k.into(), ClientIdentity::new(v)))
                .collect(),
        }
    }

    pub fn lookup(&self, credential: &str) -> Option<&ClientIdentity> {
        self.keys.get(credential)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Validates credentials against a `CredentialStore`.
#[derive(Debug)]
pub struct Authenticator {
    enabled: bool,
    store: CredentialStore,
    metrics: Arc<RouterMetrics>,
}

impl Authenticator {
    pub fn new(enabled: bool, store: CredentialStore, metrics: Arc<RouterMetrics>) -> Self {
        if enabled && store.is_empty() {
            tracing::warn!("API authentication is enabled but no API keys are configured");
        } else if enabled {
            tracing::info!(keys = store.len(), "API key authentication enabled");
        }
        Self {
            enabled,
            store,
            metrics,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// True when authenticated traffic can be served.
    pub fn configured(&self) -> bool {
        !self.enabled || !self.store.is_empty()
    }

    /// Resolve the caller's identity.
    pub fn authenticate(&self, credential: Option<&str>) -> Result<ClientIdentity, AuthError> {
        if !self.enabled {
            return Ok(ClientIdentity::anonymous());
        }

        let result = match credential.filter(|c| !c.is_empty()) {
            None => Err(AuthError::MissingCredential),
            Some(key) => match self.store.lookup(key) {
                Some(identity) => Ok(identity.clone()),
                None => {
                    tracing::warn!(key_fingerprint = %fingerprint(key), "Invalid API key attempt");
                    Err(AuthError::InvalidCredential)
                }
            },
        };

        if let Err(e) = &result {
            self.metrics.record_auth_failure(e.reason());
        }
        result
    }
}

/// Short, non-reversible identifier for a credential, safe to log.
pub fn fingerprint(credential: &str) -> String {
    let digest = Sha256::digest(credential.as_bytes());
    digest.iter().take(4).map(|b| format!("{b:02x}")).collect()
}

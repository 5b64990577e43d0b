//! Security response headers.
//!
//! # Responsibilities
//! - Add the fixed set of hardening headers to every response
//! - Strip headers that identify the server software
//!
//! # Design Decisions
//! - Values are static; existing values are overwritten, never merged
//! - Applied by the tracking middleware so error paths get them too

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Headers set on every response (lowercase names).
pub const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
];

/// Headers removed from every response.
pub const STRIPPED_HEADERS: &[&str] = &["server", "x-powered-by"];

/// Apply the security header policy in place.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    for &(name, value) in SECURITY_HEADERS {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    for name in STRIPPED_HEADERS {
        headers.remove(*name);
    }
}

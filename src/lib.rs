//! Cell Router Library
//!
//! Routes `POST /api/route` requests to the upstream that serves the
//! requested cell, with optional API key authentication, Prometheus metrics
//! and security headers on every response.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

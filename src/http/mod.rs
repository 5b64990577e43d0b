//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, API key, original URL)
//!     → middleware/track.rs (timing, metrics, security headers)
//!     → handlers.rs (route / health / ready / metrics / root)
//!     → response.rs (status mapping, JSON error bodies)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};

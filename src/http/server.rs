//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, metrics, limits, panics)
//! - Bind the server to a listener and shut down gracefully
//!
//! # Layers (outer → inner)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → track_requests → CORS
//!     → CatchPanic → handler
//! ```
//!
//! The routing handler enforces `security.max_body_size` itself so that
//! oversized bodies get the same JSON error shape as every other failure.

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use axum::http::StatusCode;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::schema::{RouterConfig, ServiceConfig};
use crate::http::handlers;
use crate::http::middleware::{track_requests, METRICS_PATH};
use crate::http::request::MakeRequestUuidV4;
use crate::http::response::ApiError;
use crate::lifecycle::startup::{Components, StartupError};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub components: Components,
    pub service: Arc<ServiceConfig>,
    /// Upper bound on a routing request body, in bytes.
    pub max_body_size: usize,
}

/// HTTP server for the cell router.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Build all components and the router from a validated configuration.
    pub fn new(config: RouterConfig) -> Result<Self, StartupError> {
        let components = Components::build(&config)?;
        let state = AppState {
            components,
            service: Arc::new(config.service.clone()),
            max_body_size: config.security.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        let metrics = state.components.metrics.clone();

        let router = Router::new()
            .route("/", get(handlers::root))
            .route(handlers::ROUTE_PATH, post(handlers::route))
            .route(handlers::HEALTH_PATH, get(handlers::health))
            .route(handlers::READY_PATH, get(handlers::ready))
            .route(METRICS_PATH, get(handlers::metrics))
            .fallback(handlers::not_found)
            .method_not_allowed_fallback(handlers::method_not_allowed)
            .with_state(state)
            .layer(CatchPanicLayer::custom(handle_panic));

        // CORS sits inside the tracking middleware so preflights are
        // counted and hardened like any other response.
        let router = if config.security.cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        };

        router
            .layer(middleware::from_fn_with_state(metrics, track_requests))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %message, "Handler panicked");
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

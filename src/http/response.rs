//! Response shaping.
//!
//! # Responsibilities
//! - Map dispatch errors to their fixed HTTP status codes
//! - Render every error as JSON `{"detail": ...}`
//! - Hand the request context back to the middleware via extensions
//!
//! # Design Decisions
//! - One mapping table, applied once at the boundary
//! - Upstream timeouts result in 504, transport errors in 502
//! - Credentials are never part of an error body

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::routing::dispatcher::{DispatchError, Dispatched};
use crate::security::auth::AuthError;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// An error response with a `detail` message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DispatchError::Auth(AuthError::MissingCredential) => StatusCode::UNAUTHORIZED,
            DispatchError::Auth(AuthError::InvalidCredential) => StatusCode::FORBIDDEN,
            DispatchError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            DispatchError::UpstreamUnreachable { .. } => StatusCode::BAD_GATEWAY,
            DispatchError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let challenge = matches!(self, DispatchError::Auth(AuthError::MissingCredential));
        let mut response = ApiError::new(self.status(), self.to_string()).into_response();
        if challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("ApiKey"));
        }
        response
    }
}

impl IntoResponse for Dispatched {
    fn into_response(self) -> Response {
        let mut response = match self.outcome {
            Ok(result) => Json(result).into_response(),
            Err(e) => e.into_response(),
        };
        response.extensions_mut().insert(self.context);
        response
    }
}

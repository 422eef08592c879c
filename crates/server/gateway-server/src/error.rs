//! The single place where failures become HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway_downstream::DownstreamError;
use gateway_identity_session::AuthFailure;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// HTTP-facing error. `message` is what the client sees; `internal` is only logged.
#[derive(Debug, Error)]
#[error("HTTP {status}: {message}")]
pub struct GatewayError {
    pub status: StatusCode,
    pub message: &'static str,
    pub internal: Option<String>,
}

impl GatewayError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self {
            status,
            message,
            internal: None,
        }
    }

    pub fn with_internal(
        status: StatusCode,
        message: &'static str,
        internal: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message,
            internal: Some(internal.into()),
        }
    }

    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::with_internal(StatusCode::UNAUTHORIZED, "Unauthorized", reason)
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::with_internal(StatusCode::BAD_REQUEST, "Bad Request", reason)
    }

    pub fn bad_gateway(reason: impl Into<String>) -> Self {
        Self::with_internal(StatusCode::BAD_GATEWAY, "Bad Gateway", reason)
    }

    pub fn internal(reason: impl Into<String>) -> Self {
        Self::with_internal(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            reason,
        )
    }
}

impl From<AuthFailure> for GatewayError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::Unauthorized(reason) => GatewayError::unauthorized(reason),
            AuthFailure::DownstreamFault(reason) => GatewayError::bad_gateway(reason),
            AuthFailure::Configuration(reason) => GatewayError::internal(reason),
        }
    }
}

impl From<DownstreamError> for GatewayError {
    fn from(error: DownstreamError) -> Self {
        if error.is_timeout() {
            GatewayError::bad_gateway(format!("downstream timed out: {}", error))
        } else {
            GatewayError::bad_gateway(error.to_string())
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let internal = self.internal.as_deref().unwrap_or("-");
        if self.status.is_server_error() {
            error!(status = self.status.as_u16(), "{}", internal);
        } else {
            warn!(status = self.status.as_u16(), "{}", internal);
        }

        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

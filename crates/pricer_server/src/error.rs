//! API error type and its JSON rendering.
//!
//! Every failure on the JSON API is answered with a body of the form
//! `{"error": <kind>, "message": <text>}`. `kind` is a stable snake_case
//! code; `message` is meant for humans.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use pricer_core::types::PricingError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the pricing handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be decoded.
    #[error("{0}")]
    InvalidRequest(String),

    /// A request count is larger than the server allows.
    #[error("{field} must not exceed {limit}, got {value}")]
    LimitExceeded {
        /// Offending field (`steps` or `paths`)
        field: &'static str,
        /// Configured maximum
        limit: usize,
        /// Requested value
        value: usize,
    },

    /// Input validation, payoff compilation or evaluation failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The blocking pricing task panicked or was cancelled.
    #[error("Pricing task failed: {0}")]
    Worker(String),
}

impl ApiError {
    /// Stable error code reported in the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::LimitExceeded { .. } => "limit_exceeded",
            ApiError::Pricing(err) => err.kind(),
            ApiError::Worker(_) => "internal_error",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

/// JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code, see [`ApiError::kind`]
    pub error: String,
    /// Human-readable description
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "pricing request failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "pricing request rejected");
        }

        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

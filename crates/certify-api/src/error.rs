//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps certify-core and certify-chain errors to HTTP status codes with a
//! JSON body carrying a machine-readable code and a message.
//!
//! Internal errors are logged and replaced with a generic message. Chain
//! errors are returned as-is: they carry revert reasons the operator can
//! act on ("Certificate already exists", "Not authorized to issue").

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use certify_chain::ChainError;
use certify_core::{CanonicalizationError, ValidationError};

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CHAIN_UNAVAILABLE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("{0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("{0}")]
    Validation(String),

    /// Request body could not be parsed or is incomplete (400).
    #[error("{0}")]
    BadRequest(String),

    /// Missing or invalid bearer token (401).
    #[error("{0}")]
    Unauthorized(String),

    /// The registry rejected the call or the node failed (500).
    #[error("{0}")]
    Chain(String),

    /// No bound registry contract yet (503).
    #[error("{0}")]
    ChainUnavailable(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Chain(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CHAIN_ERROR"),
            Self::ChainUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "CHAIN_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// 503 with the given message.
    pub fn chain_unavailable(message: impl Into<String>) -> Self {
        Self::ChainUnavailable(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Chain(_) => tracing::error!(error = %self, "registry call failed"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Missing record fields are a 400; a malformed hash is a 422.
impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingFields(_) => Self::BadRequest(err.to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}

/// A fractional number in submitted data is the client's to fix (422).
impl From<CanonicalizationError> for AppError {
    fn from(err: CanonicalizationError) -> Self {
        match err {
            CanonicalizationError::FloatRejected(_) => Self::Validation(err.to_string()),
            CanonicalizationError::SerializationFailed(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ChainError> for AppError {
    fn from(err: ChainError) -> Self {
        Self::Chain(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

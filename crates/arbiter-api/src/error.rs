//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps validation and engine failures to HTTP status codes with JSON
//! error bodies. Never exposes internal error details in responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use arbiter_core::{DecisionEvent, ValidationError};

/// Structured JSON error response body.
///
/// All error responses use this format. The `details` field carries
/// additional context for client errors; engine failures keep their
/// upstream messages out of the body to prevent information leakage.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "VALIDATION_ERROR").
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
    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (422). Normalized with
    /// `Validation`: the client sent syntactically valid HTTP but
    /// semantically invalid content.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The inference engine failed mid-arbitration (502). Decisions
    /// emitted before the failure are carried in the response details.
    #[error("engine failure: {message}")]
    Engine {
        message: String,
        partial: Vec<DecisionEvent>,
    },
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::Engine { .. } => (StatusCode::BAD_GATEWAY, "ENGINE_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Server-side failure messages stay in the logs.
        let message = match &self {
            Self::Engine { .. } => {
                tracing::error!(error = %self, "engine failure");
                "The arbitration engine failed".to_string()
            }
            other => other.to_string(),
        };

        let details = match &self {
            Self::Engine { partial, .. } if !partial.is_empty() => {
                serde_json::to_value(partial)
                    .ok()
                    .map(|decisions| serde_json::json!({ "decisions": decisions }))
            }
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convert `Json` extractor rejections so malformed bodies get the same
/// structured `ErrorBody` as every other client error.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

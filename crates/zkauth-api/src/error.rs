//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Plugin errors keep their machine-readable code; the HTTP status tells the
//! caller which class of failure occurred:
//!
//! | Error                               | Status |
//! |-------------------------------------|--------|
//! | unparsable request body             | 400    |
//! | plugin proof invalid                | 401    |
//! | unknown plugin                      | 404    |
//! | malformed public input / output     | 422    |
//! | internal                            | 500    |
//!
//! Internal details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use zkauth_plugin::PluginError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "PLUGIN_NOT_FOUND", "PROOF_INVALID").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The named plugin cannot exist: the name is not well formed (404).
    #[error("plugin not found: {0}")]
    UnknownPlugin(String),

    /// A plugin rejected the request.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::UnknownPlugin(_) => (StatusCode::NOT_FOUND, "PLUGIN_NOT_FOUND"),
            Self::Plugin(e) => {
                let status = match e {
                    PluginError::NotFound(_) => StatusCode::NOT_FOUND,
                    PluginError::MalformedInput(_) | PluginError::MalformedOutput(_) => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    PluginError::ProofInvalid(_) => StatusCode::UNAUTHORIZED,
                    PluginError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.code())
            }
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_) | Self::Plugin(PluginError::Internal(_)))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

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

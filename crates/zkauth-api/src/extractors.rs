//! # Request Extraction
//!
//! Handlers take their body as `Result<Json<T>, JsonRejection>` so that a
//! rejected body becomes an [`AppError`] with the usual JSON error shape
//! instead of axum's plain-text rejection.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Rules a request DTO checks after it has deserialized.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body; a rejection is a 400 carrying axum's explanation.
pub fn extract_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(status = %rejection.status(), "request body rejected");
            Err(AppError::BadRequest(rejection.body_text()))
        }
    }
}

/// [`extract_json`], then [`Validate::validate`]; a rule violation is a 422.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(body)?;
    if let Err(reason) = value.validate() {
        return Err(AppError::Validation(reason));
    }
    Ok(value)
}

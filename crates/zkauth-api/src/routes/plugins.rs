//! # Plugin Endpoints
//!
//! Direct access to single plugins: what is registered, verify one proof,
//! re-check one output. Verification runs on the blocking pool since proof
//! checking is CPU-bound.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use zkauth_core::{PluginName, ValidationError, Validity, VerificationKey};
use zkauth_plugin::VerifyInput;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// One registered plugin.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PluginSummary {
    #[schema(value_type = String)]
    pub name: PluginName,
    /// Key the plugin's proofs are checked against.
    #[schema(value_type = Object)]
    pub verification_key: VerificationKey,
}

/// Registered plugins, sorted by name.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PluginListResponse {
    pub plugins: Vec<PluginSummary>,
}

/// Verify one proof with one plugin.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyRequest {
    /// Registered plugin name. Names that could never be registered are
    /// reported as not found.
    pub plugin: String,
    /// Plugin-defined public input arguments.
    #[schema(value_type = Object)]
    pub public_input_args: Value,
    /// Plugin-defined proof.
    #[schema(value_type = Object)]
    pub proof: Value,
}

/// Output of a successful verification.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    #[schema(value_type = Object)]
    pub output: Value,
}

/// Re-check a previously issued output.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateOutputRequest {
    pub plugin: String,
    #[schema(value_type = Object)]
    pub output: Value,
}

/// Whether the output still holds.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidateOutputResponse {
    pub is_valid: bool,
    /// Present when `is_valid` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Validity> for ValidateOutputResponse {
    fn from(validity: Validity) -> Self {
        match validity {
            Validity::Valid => Self {
                is_valid: true,
                reason: None,
            },
            Validity::Invalid { reason } => Self {
                is_valid: false,
                reason: Some(reason),
            },
        }
    }
}

/// Parse a requested plugin name; a malformed one names no plugin.
fn plugin_name(raw: String) -> Result<PluginName, AppError> {
    PluginName::new(raw).map_err(|e| match e {
        ValidationError::InvalidPluginName(name) => AppError::UnknownPlugin(name),
        other => AppError::Validation(other.to_string()),
    })
}

/// Build the plugin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/plugins", get(list_plugins))
        .route("/v1/verify", post(verify))
        .route("/v1/validate-output", post(validate_output))
}

/// GET /v1/plugins — List registered plugins and their verification keys.
#[utoipa::path(
    get,
    path = "/v1/plugins",
    responses(
        (status = 200, description = "Registered plugins", body = PluginListResponse),
    ),
    tag = "plugins"
)]
async fn list_plugins(State(state): State<AppState>) -> Result<Json<PluginListResponse>, AppError> {
    let host = state.host();
    let plugins = host
        .active_plugin_names()
        .into_iter()
        .map(|name| {
            let verification_key = host.verification_key(&name)?;
            Ok(PluginSummary {
                name,
                verification_key,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(Json(PluginListResponse { plugins }))
}

/// POST /v1/verify — Verify one proof.
#[utoipa::path(
    post,
    path = "/v1/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Proof verified", body = VerifyResponse),
        (status = 400, description = "Unparsable request", body = crate::error::ErrorBody),
        (status = 401, description = "Proof invalid", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown plugin", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed public input", body = crate::error::ErrorBody),
    ),
    tag = "plugins"
)]
async fn verify(
    State(state): State<AppState>,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, AppError> {
    let req = extract_json(body)?;
    let host = state.host().clone();
    let plugin = plugin_name(req.plugin)?;
    let input = VerifyInput {
        public_input_args: req.public_input_args,
        proof: req.proof,
    };

    let result = tokio::task::spawn_blocking({
        let plugin = plugin.clone();
        move || host.verify(&plugin, input)
    })
    .await
    .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?;

    match result {
        Ok(output) => {
            tracing::info!(plugin = %plugin, "proof verified");
            Ok(Json(VerifyResponse { output }))
        }
        Err(e) => {
            tracing::info!(plugin = %plugin, code = e.code(), "proof rejected");
            Err(e.into())
        }
    }
}

/// POST /v1/validate-output — Re-check one output against current state.
#[utoipa::path(
    post,
    path = "/v1/validate-output",
    request_body = ValidateOutputRequest,
    responses(
        (status = 200, description = "Validity of the output", body = ValidateOutputResponse),
        (status = 404, description = "Unknown plugin", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed output", body = crate::error::ErrorBody),
    ),
    tag = "plugins"
)]
async fn validate_output(
    State(state): State<AppState>,
    body: Result<Json<ValidateOutputRequest>, JsonRejection>,
) -> Result<Json<ValidateOutputResponse>, AppError> {
    let req = extract_json(body)?;
    let plugin = plugin_name(req.plugin)?;
    let host = state.host().clone();
    let output = req.output;
    let validity =
        tokio::task::spawn_blocking(move || host.check_output_validity(&plugin, output))
            .await
            .map_err(|e| AppError::Internal(format!("validity task failed: {e}")))??;
    Ok(Json(validity.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_maps_to_response() {
        let ok: ValidateOutputResponse = Validity::Valid.into();
        assert!(ok.is_valid);
        assert!(ok.reason.is_none());
        assert_eq!(serde_json::to_value(&ok).unwrap(), serde_json::json!({"is_valid": true}));

        let stale: ValidateOutputResponse = Validity::invalid("root mismatch").into();
        assert!(!stale.is_valid);
        assert_eq!(stale.reason.as_deref(), Some("root mismatch"));
    }

    #[test]
    fn malformed_names_are_unknown_plugins() {
        assert_eq!(plugin_name("members".into()).unwrap().as_str(), "members");
        assert!(matches!(
            plugin_name("Members".into()),
            Err(AppError::UnknownPlugin(n)) if n == "Members"
        ));
        assert!(matches!(plugin_name(String::new()), Err(AppError::UnknownPlugin(_))));
    }
}

//! # Authentication Endpoints
//!
//! Batch authentication over several plugins and re-validation of a
//! previously issued bundle. Both answer with an `AuthenticationResult`
//! tagged by `status` (`none`, `partial`, `full`); per-plugin failures are
//! reported inside the body, so these endpoints return 200 whenever the
//! request itself is well formed.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use zkauth_auth::{AuthenticatedOutput, AuthenticationResult};
use zkauth_core::PluginName;
use zkauth_plugin::VerifyInput;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Largest number of plugins one request may name.
pub const MAX_BATCH_SIZE: usize = 64;

/// Proofs to verify, keyed by plugin name.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuthenticateRequest {
    /// `{plugin: {public_input_args, proof}}`.
    #[schema(value_type = Object)]
    pub plugins: BTreeMap<PluginName, VerifyInput>,
}

impl Validate for AuthenticateRequest {
    fn validate(&self) -> Result<(), String> {
        check_batch_size(self.plugins.len())
    }
}

/// A previously issued bundle, keyed by plugin name.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RevalidateRequest {
    /// `{plugin: {output, roles}}`. Submitted roles are ignored.
    #[schema(value_type = Object)]
    pub outputs: BTreeMap<PluginName, AuthenticatedOutput>,
}

impl Validate for RevalidateRequest {
    fn validate(&self) -> Result<(), String> {
        check_batch_size(self.outputs.len())
    }
}

fn check_batch_size(len: usize) -> Result<(), String> {
    if len > MAX_BATCH_SIZE {
        return Err(format!(
            "at most {MAX_BATCH_SIZE} plugins per request, got {len}"
        ));
    }
    Ok(())
}

/// Build the authentication router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/authenticate", post(authenticate))
        .route("/v1/revalidate", post(revalidate))
}

/// POST /v1/authenticate — Verify a batch and derive roles.
#[utoipa::path(
    post,
    path = "/v1/authenticate",
    request_body = AuthenticateRequest,
    responses(
        (status = 200, description = "Authentication result tagged by status"),
        (status = 400, description = "Unparsable request", body = crate::error::ErrorBody),
        (status = 422, description = "Too many plugins", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn authenticate(
    State(state): State<AppState>,
    body: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Result<Json<AuthenticationResult>, AppError> {
    let req = extract_validated_json(body)?;
    Ok(Json(state.auth.authenticate(req.plugins).await))
}

/// POST /v1/revalidate — Re-check an issued bundle against current state.
#[utoipa::path(
    post,
    path = "/v1/revalidate",
    request_body = RevalidateRequest,
    responses(
        (status = 200, description = "Re-validated result tagged by status"),
        (status = 400, description = "Unparsable request", body = crate::error::ErrorBody),
        (status = 422, description = "Too many plugins", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn revalidate(
    State(state): State<AppState>,
    body: Result<Json<RevalidateRequest>, JsonRejection>,
) -> Result<Json<AuthenticationResult>, AppError> {
    let req = extract_validated_json(body)?;
    Ok(Json(state.auth.revalidate(req.outputs).await))
}

//! # OpenAPI Document
//!
//! Assembles the utoipa-annotated handlers into one OpenAPI spec served at
//! `/openapi.json`. Plugin auxiliary routes are plugin-defined and are not
//! part of the document.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// OpenAPI spec for the core API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "zkauth API",
        version = "0.1.0",
        description = "Zero-knowledge authentication: plugin-based proof verification, output re-validation, and role mapping."
    ),
    paths(
        crate::routes::plugins::list_plugins,
        crate::routes::plugins::verify,
        crate::routes::plugins::validate_output,
        crate::routes::auth::authenticate,
        crate::routes::auth::revalidate,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::plugins::PluginSummary,
        crate::routes::plugins::PluginListResponse,
        crate::routes::plugins::VerifyRequest,
        crate::routes::plugins::VerifyResponse,
        crate::routes::plugins::ValidateOutputRequest,
        crate::routes::plugins::ValidateOutputResponse,
        crate::routes::auth::AuthenticateRequest,
        crate::routes::auth::RevalidateRequest,
    )),
    tags(
        (name = "plugins", description = "Plugin listing, verification, and output re-validation"),
        (name = "auth", description = "Batch authentication and bundle re-validation"),
    )
)]
pub struct ApiDoc;

/// Serves the spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_core_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/v1/plugins",
            "/v1/verify",
            "/v1/validate-output",
            "/v1/authenticate",
            "/v1/revalidate",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

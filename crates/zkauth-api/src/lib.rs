//! # zkauth-api — HTTP Surface for zkauth
//!
//! ## API Surface
//!
//! | Route                          | Module                | Purpose                          |
//! |--------------------------------|-----------------------|----------------------------------|
//! | `GET /v1/plugins`              | [`routes::plugins`]   | registered plugins and keys      |
//! | `POST /v1/verify`              | [`routes::plugins`]   | verify one proof                 |
//! | `POST /v1/validate-output`     | [`routes::plugins`]   | re-check one output              |
//! | `POST /v1/authenticate`        | [`routes::auth`]      | batch verify, derive roles       |
//! | `POST /v1/revalidate`          | [`routes::auth`]      | re-check an issued bundle        |
//! | `/v1/plugins/{name}/*`         | plugin-defined        | auxiliary routes (e.g. witnesses)|
//! | `GET /openapi.json`            | [`openapi`]           | generated OpenAPI document       |
//! | `GET /health/*`                | here                  | liveness / readiness probes      |
//!
//! ## Errors
//!
//! Handlers return [`error::AppError`]; plugin error classes map to HTTP
//! status codes there.

pub mod bootstrap;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Mount point for plugin auxiliary routes.
pub const PLUGIN_ROUTES_BASE: &str = "/v1/plugins";

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let plugin_routes = state
        .host()
        .routes(PLUGIN_ROUTES_BASE)
        .layer(middleware::tracing_layer::layer());

    let api = Router::new()
        .merge(routes::plugins::router())
        .merge(routes::auth::router())
        .merge(openapi::router())
        .layer(middleware::tracing_layer::layer())
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api).merge(plugin_routes)
}

/// Liveness probe: 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: the registry is built before the listener binds.
async fn readiness() -> &'static str {
    "ready"
}

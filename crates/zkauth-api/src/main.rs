//! # zkauth-api — Binary Entry Point
//!
//! Environment:
//!
//! - `PORT`: listen port (default 8080).
//! - `ZKAUTH_CONFIG`: plugin host configuration file.
//! - `RUST_LOG`: tracing filter (default `info`).
//! - `ZKAUTH_LOG_FORMAT=json`: emit JSON log lines.

use tracing_subscriber::EnvFilter;
use zkauth_api::state::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("ZKAUTH_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = AppConfig::from_env();
    let port = config.port;

    let state = zkauth_api::bootstrap::bootstrap(config).map_err(|e| {
        tracing::error!("Bootstrap failed: {e}");
        e
    })?;

    let app = zkauth_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("zkauth API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

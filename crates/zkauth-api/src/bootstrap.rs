//! # Startup
//!
//! Builds the [`AppState`] from [`AppConfig`]:
//!
//! 1. Read the host configuration file named by `ZKAUTH_CONFIG` (YAML, or
//!    JSON when the extension is `.json`).
//! 2. Instantiate every configured plugin through the implementation table.
//! 3. Log the active plugin set, and warn that proofs come from the mock
//!    backend.
//!
//! Any failure aborts startup. Without a configuration file the server runs
//! with no plugins, so every verify call answers `PLUGIN_NOT_FOUND`.

use zkauth_plugin::{ConfigError, HostConfig, PluginHost, PluginRegistry, RegistryError};

use crate::state::{AppConfig, AppState};

/// Errors during startup.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The configuration file could not be read or parsed.
    #[error("plugin configuration: {0}")]
    Config(#[from] ConfigError),

    /// A configured plugin could not be instantiated.
    #[error("plugin registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Build the application state.
pub fn bootstrap(config: AppConfig) -> Result<AppState, BootstrapError> {
    let registry = match &config.plugin_config {
        Some(path) => {
            let host_config = HostConfig::from_path(path)?;
            PluginRegistry::from_config(&host_config)?
        }
        None => {
            tracing::warn!("ZKAUTH_CONFIG not set; starting with no plugins");
            PluginRegistry::builder().build()
        }
    };

    let host = PluginHost::new(registry);
    let names: Vec<String> = host
        .active_plugin_names()
        .iter()
        .map(ToString::to_string)
        .collect();
    tracing::info!(plugins = ?names, "plugin host ready");
    if let Some(warning) = backend_warning(names.len()) {
        tracing::warn!(backend = "mock", "{warning}");
    }

    Ok(AppState::with_host(config, host))
}

/// Every built-in program proves through `MockProofSystem`, whose proofs
/// anyone can recompute from the public program id.
fn backend_warning(active_plugins: usize) -> Option<&'static str> {
    (active_plugins > 0).then_some(
        "mock proving backend active: proofs can be recomputed from public data and give no soundness",
    )
}

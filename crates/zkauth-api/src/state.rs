//! # Application State
//!
//! Shared state handed to every handler. The plugin registry is immutable
//! once built, so the state is cheap to clone and needs no locking; mutable
//! plugin data (membership trees) lives behind the plugins' own stores.

use std::path::PathBuf;

use zkauth_auth::Authenticator;
use zkauth_plugin::{PluginHost, PluginRegistry};

/// Server configuration read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Plugin host configuration file. `None` starts with no plugins.
    pub plugin_config: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            plugin_config: None,
        }
    }
}

impl AppConfig {
    /// Read `PORT` and `ZKAUTH_CONFIG`.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let plugin_config = std::env::var_os("ZKAUTH_CONFIG").map(PathBuf::from);
        Self {
            port,
            plugin_config,
        }
    }
}

/// State shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub auth: Authenticator,
}

impl AppState {
    /// State with default configuration and no plugins.
    pub fn new() -> Self {
        Self::with_host(
            AppConfig::default(),
            PluginHost::new(PluginRegistry::builder().build()),
        )
    }

    /// State around an already-built host.
    pub fn with_host(config: AppConfig, host: PluginHost) -> Self {
        Self::with_authenticator(config, Authenticator::new(host))
    }

    /// State around a custom authenticator (e.g. one with custom role functions).
    pub fn with_authenticator(config: AppConfig, auth: Authenticator) -> Self {
        Self { config, auth }
    }

    /// The plugin host.
    pub fn host(&self) -> &PluginHost {
        self.auth.host()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

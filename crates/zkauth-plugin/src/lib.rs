//! # zkauth-plugin — Authentication Plugins and Host
//!
//! ## Layers
//!
//! - **Plugin traits** (`plugin.rs`): the two authoring conventions
//!   ([`ProofPlugin`], [`FalliblePlugin`] via [`FallibleAdapter`]) and the
//!   object-safe [`DynPlugin`] the host dispatches through.
//! - **Configuration** (`config.rs`): [`HostConfig`], read once at startup.
//! - **Registry** (`registry.rs`): name -> plugin, built from configuration
//!   through a compile-time implementation table. Immutable once built.
//! - **Host** (`host.rs`): single and batched verify / validity-check calls,
//!   with concurrent fan-out and per-entry results.
//! - **Plugins** (`plugins/`): `merkle-memberships` and `simple-password`.
//!
//! ## Error Classes
//!
//! Every per-entry failure is a [`PluginError`] whose variant tells callers
//! whether the input was malformed, the plugin unknown, the claim false, or
//! the server at fault. Staleness is a `Validity`, not an error.

pub mod config;
pub mod error;
pub mod host;
pub mod plugin;
pub mod plugins;
pub mod registry;

pub use config::{ConfigError, HostConfig, PluginEntry};
pub use error::{ErrorReport, PluginError, RegistryError};
pub use host::{BatchResult, PluginHost, VerifyInput};
pub use plugin::{DynPlugin, FallibleAdapter, FalliblePlugin, ProofPlugin};
pub use registry::{PluginRegistry, PluginRegistryBuilder, RegisteredPlugin};

//! # Plugin Registry
//!
//! The explicit, constructed-once mapping from [`PluginName`] to plugin. It is
//! built at startup, either from a [`HostConfig`] (resolving each entry's
//! `implementation` key against the compiled-in factory table) or by
//! registering plugin instances directly, and is immutable afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use zkauth_core::{PluginName, RoleRule};

use crate::config::HostConfig;
use crate::error::RegistryError;
use crate::plugin::DynPlugin;
use crate::plugins::{merkle_memberships, simple_password};

/// Builds a plugin from its configuration blob.
pub type PluginFactory = fn(&PluginName, &Value) -> Result<Arc<dyn DynPlugin>, RegistryError>;

/// Compiled-in implementations, keyed by the `implementation` config value.
const IMPLEMENTATIONS: &[(&str, PluginFactory)] = &[
    (merkle_memberships::IMPLEMENTATION, merkle_memberships::factory),
    (simple_password::IMPLEMENTATION, simple_password::factory),
];

/// Keys accepted in the `implementation` config field.
pub fn implementation_keys() -> impl Iterator<Item = &'static str> {
    IMPLEMENTATIONS.iter().map(|(key, _)| *key)
}

fn factory_for(implementation: &str) -> Option<PluginFactory> {
    IMPLEMENTATIONS
        .iter()
        .find(|(key, _)| *key == implementation)
        .map(|(_, factory)| *factory)
}

/// A plugin plus its role rule.
#[derive(Clone)]
pub struct RegisteredPlugin {
    /// The plugin in its dispatch form.
    pub plugin: Arc<dyn DynPlugin>,
    /// How its outputs map to roles.
    pub roles: RoleRule,
}

impl std::fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("verification_key", &self.plugin.verification_key())
            .field("roles", &self.roles)
            .finish()
    }
}

/// Immutable name-to-plugin mapping.
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<PluginName, RegisteredPlugin>,
}

impl PluginRegistry {
    /// Start an empty registry.
    pub fn builder() -> PluginRegistryBuilder {
        PluginRegistryBuilder::default()
    }

    /// Build every configured plugin.
    ///
    /// Fails on the first unknown implementation, rejected config blob, or
    /// malformed role rule; a host never starts with a partial plugin set.
    pub fn from_config(config: &HostConfig) -> Result<Self, RegistryError> {
        let mut builder = Self::builder();
        for (name, entry) in &config.plugins {
            let factory = factory_for(&entry.implementation).ok_or_else(|| {
                RegistryError::UnknownImplementation {
                    plugin: name.clone(),
                    implementation: entry.implementation.clone(),
                }
            })?;
            let plugin = factory(name, &entry.config)?;
            tracing::info!(
                plugin = %name,
                implementation = %entry.implementation,
                "plugin loaded"
            );
            builder = builder.register(name.clone(), plugin, entry.roles.clone())?;
        }
        Ok(builder.build())
    }

    /// Look up a plugin.
    pub fn get(&self, name: &PluginName) -> Option<&RegisteredPlugin> {
        self.plugins.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<PluginName> {
        self.plugins.keys().cloned().collect()
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&PluginName, &RegisteredPlugin)> {
        self.plugins.iter()
    }

    /// Number of plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Collects plugins before the registry is frozen.
#[derive(Default)]
pub struct PluginRegistryBuilder {
    plugins: BTreeMap<PluginName, RegisteredPlugin>,
}

impl PluginRegistryBuilder {
    /// Add a plugin instance.
    pub fn register(
        mut self,
        name: PluginName,
        plugin: Arc<dyn DynPlugin>,
        roles: RoleRule,
    ) -> Result<Self, RegistryError> {
        roles
            .validate()
            .map_err(|source| RegistryError::InvalidRoleRule {
                plugin: name.clone(),
                source,
            })?;
        if self.plugins.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.plugins.insert(name, RegisteredPlugin { plugin, roles });
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> PluginRegistry {
        PluginRegistry {
            plugins: self.plugins,
        }
    }
}

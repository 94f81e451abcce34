//! # Role Mapper
//!
//! Turns a plugin's output into roles. By default each plugin uses the
//! [`RoleRule`](zkauth_core::RoleRule) from its configuration entry; a
//! deployment can override that per plugin with an arbitrary function.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde_json::Value;
use zkauth_core::{PluginName, Role};
use zkauth_plugin::PluginHost;

/// Custom mapping from an output to roles.
pub type RoleFn = Arc<dyn Fn(&Value) -> BTreeSet<Role> + Send + Sync>;

/// Per-plugin output-to-roles mapping.
#[derive(Clone, Default)]
pub struct RoleMapper {
    custom: BTreeMap<PluginName, RoleFn>,
}

impl std::fmt::Debug for RoleMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleMapper")
            .field("custom", &self.custom.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RoleMapper {
    /// A mapper that uses configured rules only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the configured rule for one plugin.
    pub fn with_custom(
        mut self,
        plugin: PluginName,
        f: impl Fn(&Value) -> BTreeSet<Role> + Send + Sync + 'static,
    ) -> Self {
        self.custom.insert(plugin, Arc::new(f));
        self
    }

    /// Roles earned by `output` from `plugin`.
    ///
    /// A plugin with neither a custom function nor a registered rule earns
    /// nothing.
    pub fn roles_for(&self, host: &PluginHost, plugin: &PluginName, output: &Value) -> BTreeSet<Role> {
        if let Some(f) = self.custom.get(plugin) {
            return f(output);
        }
        host.role_rule(plugin)
            .map(|rule| rule.roles_for(output))
            .unwrap_or_default()
    }
}

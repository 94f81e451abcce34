//! # Host Configuration
//!
//! Which plugins run is a deployment-time choice, made once at startup:
//!
//! ```yaml
//! plugins:
//!   members:
//!     implementation: merkle-memberships
//!     config:
//!       trees:
//!         - { name: members, height: 10 }
//!     roles:
//!       static: [member]
//!   admin-password:
//!     implementation: simple-password
//!     config:
//!       roles: { admin: "<poseidon hash hex>" }
//!     roles:
//!       field: { pointer: /role }
//! ```
//!
//! `implementation` names a compiled-in plugin; `config` is handed to that
//! plugin's factory unchanged and validated there.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkauth_core::{PluginName, RoleRule};

/// Errors while reading host configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No file at the given path.
    #[error("config file not found: {path}")]
    NotFound {
        /// The missing path.
        path: String,
    },

    /// IO error reading the file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML syntax or schema error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or schema error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Plugin set for one host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Plugins keyed by the name they are served under.
    #[serde(default)]
    pub plugins: BTreeMap<PluginName, PluginEntry>,
}

/// One configured plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginEntry {
    /// Key of a compiled-in implementation.
    pub implementation: String,
    /// Implementation-specific configuration.
    #[serde(default)]
    pub config: Value,
    /// How this plugin's outputs map to roles.
    #[serde(default)]
    pub roles: RoleRule,
}

impl HostConfig {
    /// Parse YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = r#"
plugins:
  members:
    implementation: merkle-memberships
    config:
      trees:
        - name: members
          height: 4
    roles:
      static: [member]
  admin-password:
    implementation: simple-password
    roles:
      field:
        pointer: /role
"#;

    #[test]
    fn parses_yaml_entries() {
        let cfg = HostConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(cfg.plugins.len(), 2);
        let members = &cfg.plugins[&PluginName::new("members").unwrap()];
        assert_eq!(members.implementation, "merkle-memberships");
        assert_eq!(members.config["trees"][0]["height"], 4);
        let pw = &cfg.plugins[&PluginName::new("admin-password").unwrap()];
        assert_eq!(pw.config, Value::Null);
        assert!(matches!(pw.roles, RoleRule::Field { .. }));
    }

    #[test]
    fn empty_document_means_no_plugins() {
        let cfg = HostConfig::from_yaml_str("{}").unwrap();
        assert!(cfg.plugins.is_empty());
    }

    #[test]
    fn invalid_plugin_name_is_rejected() {
        let err = HostConfig::from_yaml_str("plugins:\n  Bad Name:\n    implementation: x\n");
        assert!(matches!(err, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = HostConfig::from_yaml_str(
            "plugins:\n  a:\n    implementation: x\n    implmentation: y\n",
        );
        assert!(err.is_err());
    }

    #[test]
    fn loads_yaml_and_json_files() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(SAMPLE.as_bytes()).unwrap();
        assert_eq!(HostConfig::from_path(yaml.path()).unwrap().plugins.len(), 2);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"plugins":{"p":{"implementation":"simple-password"}}}"#)
            .unwrap();
        let cfg = HostConfig::from_path(json.path()).unwrap();
        assert_eq!(cfg.plugins.len(), 1);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = HostConfig::from_path(Path::new("/nonexistent/zkauth.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }
}

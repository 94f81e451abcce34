//! # Role Rules
//!
//! Configuration-supplied functions from a plugin output to a set of roles.
//! A static role list is the degenerate case; the other rules read a value
//! out of the output with a JSON pointer (RFC 6901).
//!
//! ```yaml
//! roles:
//!   static: [member]
//! ---
//! roles:
//!   field: { pointer: /role, prefix: "pw:" }
//! ---
//! roles:
//!   mapping:
//!     pointer: /trees
//!     map: { founders: [founder, member], members: [member] }
//! ```
//!
//! Pointers that resolve to nothing, or to something other than a string or
//! an array of strings, yield no roles.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::identity::Role;

/// How a plugin's output is turned into roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleRule {
    /// Grant a fixed set of roles whenever the plugin succeeds.
    Static(Vec<Role>),
    /// Use the string (or strings) found at `pointer` as role labels.
    Field {
        /// JSON pointer into the output.
        pointer: String,
        /// Optional prefix prepended to every derived label.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
    },
    /// Look up the string (or strings) found at `pointer` in `map`.
    Mapping {
        /// JSON pointer into the output.
        pointer: String,
        /// Key found in the output -> roles granted.
        map: BTreeMap<String, Vec<Role>>,
    },
}

impl Default for RoleRule {
    fn default() -> Self {
        Self::Static(Vec::new())
    }
}

impl RoleRule {
    /// Check that any pointer in the rule is well formed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Static(_) => Ok(()),
            Self::Field { pointer, .. } | Self::Mapping { pointer, .. } => {
                if pointer.is_empty() || pointer.starts_with('/') {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidPointer(pointer.clone()))
                }
            }
        }
    }

    /// Derive roles from a plugin output.
    pub fn roles_for(&self, output: &Value) -> BTreeSet<Role> {
        match self {
            Self::Static(roles) => roles.iter().cloned().collect(),
            Self::Field { pointer, prefix } => strings_at(output, pointer)
                .into_iter()
                .filter_map(|s| {
                    let label = match prefix {
                        Some(p) => format!("{p}{s}"),
                        None => s.to_string(),
                    };
                    Role::new(label).ok()
                })
                .collect(),
            Self::Mapping { pointer, map } => strings_at(output, pointer)
                .into_iter()
                .filter_map(|key| map.get(key))
                .flatten()
                .cloned()
                .collect(),
        }
    }
}

fn strings_at<'a>(output: &'a Value, pointer: &str) -> Vec<&'a str> {
    match output.pointer(pointer) {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

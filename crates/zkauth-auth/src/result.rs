//! # Authentication Results
//!
//! [`AuthenticationResult`] is the unified verdict over a batch of plugin
//! results. Its status follows one rule, used both for fresh authentication
//! and for re-validation:
//!
//! | successes | failures | status    |
//! |-----------|----------|-----------|
//! | 0         | any      | `None`    |
//! | ≥ 1       | ≥ 1      | `Partial` |
//! | ≥ 1       | 0        | `Full`    |

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use zkauth_core::{PluginName, Role};
use zkauth_plugin::ErrorReport;

/// A plugin output together with the roles it earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatedOutput {
    /// The plugin's output, as issued.
    pub output: Value,
    /// Roles derived from it.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

/// Coarse authentication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// Nothing verified.
    None,
    /// Some plugins verified, some failed.
    Partial,
    /// Every requested plugin verified.
    Full,
}

/// Unified authentication verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthenticationResult {
    /// No plugin verified, or none was requested.
    None {
        /// Summary.
        reason: String,
        /// Failure per plugin.
        #[serde(default)]
        errors: BTreeMap<PluginName, ErrorReport>,
    },
    /// At least one plugin verified and at least one failed.
    Partial {
        /// Union of roles from verified plugins.
        roles: BTreeSet<Role>,
        /// Verified outputs.
        outputs: BTreeMap<PluginName, AuthenticatedOutput>,
        /// Failure per plugin.
        errors: BTreeMap<PluginName, ErrorReport>,
        /// Summary.
        reason: String,
    },
    /// Every requested plugin verified.
    Full {
        /// Union of roles.
        roles: BTreeSet<Role>,
        /// Verified outputs.
        outputs: BTreeMap<PluginName, AuthenticatedOutput>,
        /// Summary.
        reason: String,
    },
}

impl AuthenticationResult {
    /// Apply the status rule to a partitioned batch.
    pub fn from_parts(
        outputs: BTreeMap<PluginName, AuthenticatedOutput>,
        errors: BTreeMap<PluginName, ErrorReport>,
    ) -> Self {
        let total = outputs.len() + errors.len();
        if outputs.is_empty() {
            let reason = if total == 0 {
                "no plugins requested".to_string()
            } else {
                format!("all {total} plugins failed")
            };
            return Self::None { reason, errors };
        }
        let roles = outputs
            .values()
            .flat_map(|o| o.roles.iter().cloned())
            .collect();
        if errors.is_empty() {
            Self::Full {
                roles,
                reason: format!("all {total} plugins verified"),
                outputs,
            }
        } else {
            Self::Partial {
                roles,
                reason: format!("{} of {total} plugins verified", outputs.len()),
                outputs,
                errors,
            }
        }
    }

    /// Coarse status.
    pub fn status(&self) -> AuthStatus {
        match self {
            Self::None { .. } => AuthStatus::None,
            Self::Partial { .. } => AuthStatus::Partial,
            Self::Full { .. } => AuthStatus::Full,
        }
    }

    /// Roles granted (empty for `None`).
    pub fn roles(&self) -> BTreeSet<Role> {
        match self {
            Self::None { .. } => BTreeSet::new(),
            Self::Partial { roles, .. } | Self::Full { roles, .. } => roles.clone(),
        }
    }

    /// Verified outputs (empty for `None`).
    pub fn outputs(&self) -> BTreeMap<PluginName, AuthenticatedOutput> {
        match self {
            Self::None { .. } => BTreeMap::new(),
            Self::Partial { outputs, .. } | Self::Full { outputs, .. } => outputs.clone(),
        }
    }

    /// Failures (empty for `Full`).
    pub fn errors(&self) -> BTreeMap<PluginName, ErrorReport> {
        match self {
            Self::None { errors, .. } | Self::Partial { errors, .. } => errors.clone(),
            Self::Full { .. } => BTreeMap::new(),
        }
    }

    /// Summary line.
    pub fn reason(&self) -> &str {
        match self {
            Self::None { reason, .. }
            | Self::Partial { reason, .. }
            | Self::Full { reason, .. } => reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn name(s: &str) -> PluginName {
        PluginName::new(s).unwrap()
    }

    fn ok(roles: &[&str]) -> AuthenticatedOutput {
        AuthenticatedOutput {
            output: json!({}),
            roles: roles.iter().map(|r| Role::new(*r).unwrap()).collect(),
        }
    }

    fn failure() -> ErrorReport {
        ErrorReport {
            code: "PROOF_INVALID".into(),
            message: "no".into(),
        }
    }

    #[test]
    fn empty_is_none() {
        let r = AuthenticationResult::from_parts(BTreeMap::new(), BTreeMap::new());
        assert_eq!(r.status(), AuthStatus::None);
        assert_eq!(r.reason(), "no plugins requested");
    }

    #[test]
    fn all_failed_is_none() {
        let errors = BTreeMap::from([(name("a"), failure())]);
        let r = AuthenticationResult::from_parts(BTreeMap::new(), errors);
        assert_eq!(r.status(), AuthStatus::None);
        assert_eq!(r.errors().len(), 1);
        assert!(r.roles().is_empty());
    }

    #[test]
    fn mixed_is_partial_with_union_of_roles() {
        let outputs = BTreeMap::from([(name("a"), ok(&["x"])), (name("b"), ok(&["x", "y"]))]);
        let errors = BTreeMap::from([(name("c"), failure())]);
        let r = AuthenticationResult::from_parts(outputs, errors);
        assert_eq!(r.status(), AuthStatus::Partial);
        assert_eq!(r.roles().len(), 2);
        assert_eq!(r.reason(), "2 of 3 plugins verified");
    }

    #[test]
    fn all_ok_is_full() {
        let outputs = BTreeMap::from([(name("a"), ok(&["x"]))]);
        let r = AuthenticationResult::from_parts(outputs, BTreeMap::new());
        assert_eq!(r.status(), AuthStatus::Full);
        assert!(r.errors().is_empty());
    }

    #[test]
    fn serializes_with_status_tag() {
        let outputs = BTreeMap::from([(name("a"), ok(&["x"]))]);
        let r = AuthenticationResult::from_parts(outputs, BTreeMap::new());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "full");
        assert_eq!(json["roles"], json!(["x"]));
        assert_eq!(json["outputs"]["a"]["roles"], json!(["x"]));
        let back: AuthenticationResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }
}

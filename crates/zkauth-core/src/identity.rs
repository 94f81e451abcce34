//! # Identity Newtypes
//!
//! [`PluginName`] keys the plugin registry and namespaces each plugin's
//! auxiliary routes, so it is restricted to URL-path-safe characters.
//! [`Role`] is an authorization label produced by the role mapper.
//!
//! Both validate at construction time and when deserialized; an invalid name
//! in a request body is a malformed request, not an unknown plugin.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MAX_PLUGIN_NAME_LEN: usize = 64;

/// Unique name of a registered plugin within one host.
///
/// 1-64 characters of `[a-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PluginName(String);

impl PluginName {
    /// Create a plugin name, validating its format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPluginName`] for empty, overlong, or
    /// non-path-safe names.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let well_formed = !s.is_empty()
            && s.len() <= MAX_PLUGIN_NAME_LEN
            && s
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !well_formed {
            return Err(ValidationError::InvalidPluginName(s));
        }
        Ok(Self(s))
    }

    /// Borrow the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PluginName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PluginName> for String {
    fn from(name: PluginName) -> Self {
        name.0
    }
}

impl std::fmt::Display for PluginName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PluginName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// An authorization label derived from one or more plugin outputs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Create a role label.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRole`] if the label is empty or
    /// contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidRole(s));
        }
        Ok(Self(s))
    }

    /// Borrow the label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Role {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

//! # Plugin Errors
//!
//! Per-entry failures of verification and validity checks. Each variant is a
//! distinct class a caller can act on:
//!
//! | Variant            | Code               | Meaning                              |
//! |--------------------|--------------------|--------------------------------------|
//! | `NotFound`         | `PLUGIN_NOT_FOUND` | no plugin registered under the name  |
//! | `MalformedInput`   | `MALFORMED_INPUT`  | public input failed to decode        |
//! | `MalformedOutput`  | `MALFORMED_OUTPUT` | stored output failed to decode       |
//! | `ProofInvalid`     | `PROOF_INVALID`    | the claim is false                   |
//! | `Internal`         | `INTERNAL_ERROR`   | infrastructure failure, detail hidden|
//!
//! Staleness is not an error; it is `Validity::Invalid`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zkauth_core::{PluginName, ValidationError};

/// Failure of one plugin invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// No plugin is registered under this name.
    #[error("plugin not found: {0}")]
    NotFound(PluginName),

    /// Public input arguments did not match the plugin's schema.
    #[error("malformed public input: {0}")]
    MalformedInput(String),

    /// A previously issued output did not match the plugin's schema.
    #[error("malformed output: {0}")]
    MalformedOutput(String),

    /// The proof or a fact derived from it did not check out.
    #[error("proof invalid: {0}")]
    ProofInvalid(String),

    /// Infrastructure failure. The message is logged, never returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PluginError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PLUGIN_NOT_FOUND",
            Self::MalformedInput(_) => "MALFORMED_INPUT",
            Self::MalformedOutput(_) => "MALFORMED_OUTPUT",
            Self::ProofInvalid(_) => "PROOF_INVALID",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to a client.
    pub fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }

    /// Client-facing form of the error.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code().to_string(),
            message: self.public_message(),
        }
    }
}

/// Serializable `{code, message}` pair for a failed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// One of the [`PluginError::code`] values.
    pub code: String,
    /// Human-readable message, with internal detail removed.
    pub message: String,
}

/// Failure to build the plugin registry at startup.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The configured implementation key is not compiled in.
    #[error("plugin {plugin}: unknown implementation {implementation:?}")]
    UnknownImplementation {
        /// Plugin being configured.
        plugin: PluginName,
        /// The unrecognised key.
        implementation: String,
    },

    /// The plugin rejected its configuration blob.
    #[error("plugin {plugin}: invalid configuration: {reason}")]
    InvalidConfig {
        /// Plugin being configured.
        plugin: PluginName,
        /// What was wrong.
        reason: String,
    },

    /// The plugin's role rule is malformed.
    #[error("plugin {plugin}: invalid role rule: {source}")]
    InvalidRoleRule {
        /// Plugin being configured.
        plugin: PluginName,
        /// Underlying validation failure.
        source: ValidationError,
    },

    /// Two plugins were registered under one name.
    #[error("duplicate plugin name: {0}")]
    Duplicate(PluginName),
}

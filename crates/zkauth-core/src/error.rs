//! # Error Hierarchy
//!
//! Structured error types for the foundational layer, built with `thiserror`.
//! Each variant carries the offending input so operators can diagnose
//! misconfiguration without guesswork.

use thiserror::Error;

/// Errors during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Field elements and counters must be strings or integers.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed during canonicalization.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for domain primitive newtypes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Plugin name is empty, too long, or uses characters outside
    /// `[a-z0-9_-]`.
    #[error("invalid plugin name: \"{0}\" (expected 1-64 chars of [a-z0-9_-])")]
    InvalidPluginName(String),

    /// Role label is empty or contains whitespace.
    #[error("invalid role: \"{0}\" (expected non-empty label without whitespace)")]
    InvalidRole(String),

    /// JSON pointer in a role rule does not start with `/`.
    #[error("invalid JSON pointer: \"{0}\" (must be empty or start with '/')")]
    InvalidPointer(String),
}

//! # Output Validity
//!
//! The verdict of re-checking a previously accepted plugin output against
//! current backing state. A stale output is `Invalid` with a human-readable
//! reason; it is not an error.

use serde::{Deserialize, Serialize};

/// Whether a previously produced output still holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Validity {
    /// The facts the output attests to are unchanged.
    Valid,
    /// The output no longer matches current state.
    Invalid {
        /// Why the output is stale.
        reason: String,
    },
}

impl Validity {
    /// Build an `Invalid` verdict.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// True for [`Validity::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The staleness reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason } => Some(reason),
        }
    }
}

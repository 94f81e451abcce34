//! # Verification Key Identity
//!
//! The proving library's verification keys are opaque to everything above
//! the proof-system seam. Plugins report them as a [`VerificationKey`]: the
//! program identifier plus a fingerprint, compared by value.

use serde::{Deserialize, Serialize};

/// Opaque, comparable identity of a compiled program's verification key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationKey {
    /// The program the key was compiled for.
    pub program: String,
    /// Hex fingerprint of the key material.
    pub fingerprint: String,
}

impl std::fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.program, self.fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_program_and_fingerprint() {
        let vk = VerificationKey {
            program: "merkle-membership".into(),
            fingerprint: "ab".repeat(32),
        };
        assert!(vk.to_string().starts_with("merkle-membership:abab"));
    }
}

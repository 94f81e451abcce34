//! # Cryptographic Error Types
//!
//! Structured errors for all operations in `zkauth-crypto`.

use thiserror::Error;

/// Errors from field, hashing, and Merkle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// A field element encoding was not 32 canonical little-endian bytes.
    #[error("invalid field element encoding: {0}")]
    InvalidFieldEncoding(String),

    /// Poseidon was asked to hash an unsupported number of inputs.
    #[error("poseidon supports 1 or 2 inputs, got {0}")]
    InvalidArity(usize),

    /// Tree height outside `1..=MAX_TREE_HEIGHT`.
    #[error("invalid tree height {height}: must be between 1 and {max}")]
    InvalidHeight {
        /// Requested height.
        height: u8,
        /// Largest supported height.
        max: u8,
    },

    /// Leaf index beyond the tree's capacity.
    #[error("leaf index {index} out of range for tree of capacity {capacity}")]
    IndexOutOfRange {
        /// Requested index.
        index: u64,
        /// Number of slots in the tree.
        capacity: u64,
    },

    /// No leaf occupies the requested slot.
    #[error("leaf not found at index {index}")]
    LeafNotFound {
        /// Requested index.
        index: u64,
    },

    /// Every slot is occupied.
    #[error("tree is full ({capacity} leaves)")]
    TreeFull {
        /// Number of slots in the tree.
        capacity: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_carry_context() {
        let msg = CryptoError::IndexOutOfRange {
            index: 9,
            capacity: 8,
        }
        .to_string();
        assert!(msg.contains('9') && msg.contains('8'));
        assert!(CryptoError::LeafNotFound { index: 3 }
            .to_string()
            .contains("leaf not found"));
        assert!(CryptoError::InvalidHeight { height: 0, max: 32 }
            .to_string()
            .contains("between 1 and 32"));
    }
}

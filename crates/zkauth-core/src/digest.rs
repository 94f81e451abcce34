//! # SHA-256 Digests
//!
//! [`sha256_digest`] hashes [`CanonicalBytes`]; [`Sha256Accumulator`] is the
//! incremental form for composite inputs (a key fingerprint followed by a
//! canonical statement, for example).

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;

/// Compute the SHA-256 digest of canonical bytes as 32 raw bytes.
pub fn sha256_digest(data: &CanonicalBytes) -> [u8; 32] {
    Sha256::digest(data.as_bytes()).into()
}

/// Incremental SHA-256 over a sequence of byte slices.
#[derive(Clone, Default)]
pub struct Sha256Accumulator {
    hasher: Sha256,
}

impl std::fmt::Debug for Sha256Accumulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256Accumulator").finish_non_exhaustive()
    }
}

impl Sha256Accumulator {
    /// Start an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Finish and return the raw 32-byte digest.
    pub fn finalize(self) -> [u8; 32] {
        self.hasher.finalize().into()
    }

    /// Finish and return the digest as 64 lowercase hex chars.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.finalize())
    }
}

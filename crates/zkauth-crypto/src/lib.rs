//! # zkauth-crypto — Cryptographic Primitives for zkauth
//!
//! - **Field elements** over the Pallas base field, hex-encoded on the wire.
//! - **Poseidon** (P128Pow5T3) for leaf, node, and recursive-hash computation.
//! - **Merkle trees** of fixed height with canonical empty slots, producing
//!   roots and inclusion witnesses.
//! - **Witness stores**: the thread-safe storage contract the membership
//!   plugin reads roots and witnesses through.

pub mod error;
pub mod field;
pub mod merkle;
pub mod poseidon;
pub mod store;

// Re-export primary types.
pub use error::CryptoError;
pub use field::FieldElement;
pub use merkle::{MerkleTree, MerkleWitness, WitnessNode, MAX_TREE_HEIGHT};
pub use poseidon::{hash_secret, poseidon_hash, poseidon_hash2};
pub use store::{InMemoryWitnessStore, WitnessStore};

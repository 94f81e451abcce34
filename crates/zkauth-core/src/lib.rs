#![deny(missing_docs)]

//! # zkauth-core — Foundational Types for zkauth
//!
//! This crate defines the types that every other crate in the workspace
//! depends on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** A [`PluginName`] is not a
//!    [`Role`], and neither is a bare `String`. Both validate at construction
//!    and at deserialization.
//!
//! 2. **[`CanonicalBytes`] is the sole path to digest computation.** Plugin
//!    outputs and proof statements are hashed only after canonicalization
//!    (sorted keys, compact separators, float rejection).
//!
//! 3. **Staleness is a verdict, not an error.** [`Validity`] reports whether a
//!    previously accepted output still holds; it is produced fresh on every
//!    check and never cached.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod roles;
pub mod validity;
pub mod vk;

// Re-export primary types at crate root for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{sha256_digest, Sha256Accumulator};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{PluginName, Role};
pub use roles::RoleRule;
pub use validity::Validity;
pub use vk::VerificationKey;

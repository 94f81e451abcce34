//! # Proof System Trait (Sealed)
//!
//! The seam between zkauth and the proving library. Programs (membership,
//! password) are written against [`ProofSystem`]; the backend behind it is
//! opaque to everything above this crate.
//!
//! ## Sealed Trait
//!
//! Only backends defined inside `zkauth-zkp` can implement `ProofSystem`.
//! Plugins pick a program, never a backend.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Error during proof generation.
///
/// Construction errors are raised before or during witness generation; no
/// proof artifact is produced when any of them occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The circuit inputs are invalid or missing.
    #[error("invalid circuit inputs: {0}")]
    InvalidInputs(String),

    /// Proof generation failed internally.
    #[error("proof generation failed: {0}")]
    GenerationFailed(String),

    /// A chained proof was requested over zero inputs.
    #[error("empty input list")]
    EmptyInput,

    /// Public and private input lists differ in length.
    #[error("input length mismatch: {public} public inputs, {private} private inputs")]
    LengthMismatch {
        /// Number of public inputs (roots).
        public: usize,
        /// Number of private inputs (witness + secret pairs).
        private: usize,
    },

    /// The private inputs do not satisfy the program's constraints.
    #[error("unsatisfied constraint: {0}")]
    UnsatisfiedConstraint(String),

    /// The proof being extended did not verify.
    #[error("prior proof invalid: {0}")]
    PriorProofInvalid(String),
}

/// Error during proof verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The proof is structurally malformed.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// The proof is cryptographically invalid.
    #[error("proof verification failed: {0}")]
    VerificationFailed(String),

    /// The proof's declared public output differs from the recomputed one.
    #[error("public output mismatch: expected {expected}, proof declares {actual}")]
    OutputMismatch {
        /// Recomputed value (hex).
        expected: String,
        /// Value declared by the proof (hex).
        actual: String,
    },
}

/// Private module that seals the [`ProofSystem`] trait.
mod private {
    /// Sealing marker trait. Not accessible outside `zkauth-zkp`.
    pub trait Sealed {}
}

/// Sealed trait defining the interface of a proving backend.
///
/// `verify` returns `Ok(false)` for a well-formed proof that does not verify
/// and `Err(VerifyError::MalformedProof)` for one that cannot be checked at all.
pub trait ProofSystem: private::Sealed + Send + Sync {
    /// The proof type produced by this system.
    type Proof: Serialize + DeserializeOwned + Clone + std::fmt::Debug;
    /// The verifying key type.
    type VerifyingKey: Clone;
    /// The proving key type.
    type ProvingKey;
    /// The circuit type that defines the proof statement.
    type Circuit: Clone;

    /// Generate a proof for `circuit` under `pk`.
    ///
    /// # Errors
    ///
    /// Returns [`ProofError::InvalidInputs`] if the circuit data is malformed.
    fn prove(
        &self,
        pk: &Self::ProvingKey,
        circuit: &Self::Circuit,
    ) -> Result<Self::Proof, ProofError>;

    /// Verify a proof against public inputs.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::MalformedProof`] if the proof is structurally
    /// invalid.
    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[u8],
    ) -> Result<bool, VerifyError>;
}

impl private::Sealed for crate::mock::MockProofSystem {}

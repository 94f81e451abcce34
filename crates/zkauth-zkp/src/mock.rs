//! # Mock Proof System
//!
//! A deterministic, transparent backend standing in for the external proving
//! library. Proofs are SHA-256 commitments that anyone holding the verifying
//! key can recompute. There is **no zero-knowledge and no soundness**: the
//! mock exists so the protocol, plugins, and host can be exercised end to end.
//!
//! ## How It Works
//!
//! - [`MockProofSystem::compile`] derives a key pair for a program id. Both
//!   keys carry `circuit_digest = SHA256("zkauth/mock-circuit/v1" || program)`.
//! - `prove()` computes
//!   `SHA256(circuit_digest || canonical_bytes(circuit_data) || public_inputs)`.
//! - `verify()` recomputes the digest over `circuit_digest || public_inputs`,
//!   where the caller's `public_inputs` are the canonical statement bytes
//!   followed by the raw public inputs. [`MockProofSystem::verify_circuit`]
//!   does that concatenation.
//!
//! A proof made under one program's key never verifies under another's.

use serde::{Deserialize, Serialize};
use zkauth_core::digest::Sha256Accumulator;
use zkauth_core::{CanonicalBytes, VerificationKey};

use crate::traits::{ProofError, ProofSystem, VerifyError};

const CIRCUIT_DOMAIN: &[u8] = b"zkauth/mock-circuit/v1";

/// A mock proof: hex SHA-256 digest binding key, statement, and public inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MockProof {
    /// 64 lowercase hex chars.
    pub proof_hex: String,
}

/// Verifying key for one compiled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockVerifyingKey {
    /// Program id the key was compiled for.
    pub program: String,
    /// Digest identifying the compiled circuit.
    pub circuit_digest: [u8; 32],
}

/// Proving key for one compiled program.
#[derive(Debug, Clone)]
pub struct MockProvingKey {
    /// Program id the key was compiled for.
    pub program: String,
    /// Digest identifying the compiled circuit.
    pub circuit_digest: [u8; 32],
}

/// A statement plus its raw public inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockCircuit {
    /// JSON statement; canonicalized (sorted keys, no floats) before hashing.
    pub circuit_data: serde_json::Value,

    /// Raw public input bytes, appended after the canonical statement.
    #[serde(with = "hex_bytes")]
    pub public_inputs: Vec<u8>,
}

/// The deterministic mock backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockProofSystem;

impl MockProofSystem {
    /// Derive the key pair for `program`.
    pub fn compile(program: &str) -> (MockProvingKey, MockVerifyingKey) {
        let mut acc = Sha256Accumulator::new();
        acc.update(CIRCUIT_DOMAIN);
        acc.update(program.as_bytes());
        let circuit_digest = acc.finalize();
        (
            MockProvingKey {
                program: program.to_string(),
                circuit_digest,
            },
            MockVerifyingKey {
                program: program.to_string(),
                circuit_digest,
            },
        )
    }

    /// Verify a proof against the circuit it was produced for.
    pub fn verify_circuit(
        &self,
        vk: &MockVerifyingKey,
        proof: &MockProof,
        circuit: &MockCircuit,
    ) -> Result<bool, VerifyError> {
        let canonical = CanonicalBytes::from_value(circuit.circuit_data.clone()).map_err(|e| {
            VerifyError::MalformedProof(format!("failed to canonicalize circuit data: {e}"))
        })?;
        let mut verify_input = canonical.into_bytes();
        verify_input.extend_from_slice(&circuit.public_inputs);
        self.verify(vk, proof, &verify_input)
    }
}

impl ProofSystem for MockProofSystem {
    type Proof = MockProof;
    type VerifyingKey = MockVerifyingKey;
    type ProvingKey = MockProvingKey;
    type Circuit = MockCircuit;

    fn prove(
        &self,
        pk: &Self::ProvingKey,
        circuit: &Self::Circuit,
    ) -> Result<Self::Proof, ProofError> {
        let canonical = CanonicalBytes::from_value(circuit.circuit_data.clone()).map_err(|e| {
            ProofError::InvalidInputs(format!("failed to canonicalize circuit data: {e}"))
        })?;

        let mut acc = Sha256Accumulator::new();
        acc.update(&pk.circuit_digest);
        acc.update(canonical.as_bytes());
        acc.update(&circuit.public_inputs);
        Ok(MockProof {
            proof_hex: acc.finalize_hex(),
        })
    }

    fn verify(
        &self,
        vk: &Self::VerifyingKey,
        proof: &Self::Proof,
        public_inputs: &[u8],
    ) -> Result<bool, VerifyError> {
        if proof.proof_hex.len() != 64 {
            return Err(VerifyError::MalformedProof(format!(
                "expected 64 hex chars, got {}",
                proof.proof_hex.len()
            )));
        }
        if !proof.proof_hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(VerifyError::MalformedProof(
                "proof_hex contains non-hex characters".to_string(),
            ));
        }

        let mut acc = Sha256Accumulator::new();
        acc.update(&vk.circuit_digest);
        acc.update(public_inputs);
        Ok(proof.proof_hex.eq_ignore_ascii_case(&acc.finalize_hex()))
    }
}

impl From<&MockVerifyingKey> for VerificationKey {
    fn from(vk: &MockVerifyingKey) -> Self {
        VerificationKey {
            program: vk.program.clone(),
            fingerprint: hex::encode(vk.circuit_digest),
        }
    }
}

/// Serde helper for hex-encoding `Vec<u8>` fields.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}

//! # Password-Preimage Program
//!
//! Proves knowledge of `p` such that `Poseidon([p]) == password_hash`. The
//! hash is public; the password never leaves the prover.

use serde::{Deserialize, Serialize};
use serde_json::json;
use zkauth_core::VerificationKey;
use zkauth_crypto::{hash_secret, FieldElement};

use crate::mock::{MockCircuit, MockProof, MockProofSystem, MockProvingKey, MockVerifyingKey};
use crate::traits::{ProofError, ProofSystem, VerifyError};

/// Program id of the password circuit.
pub const PASSWORD_PROGRAM: &str = "password-preimage";

/// Proof of knowledge of a password preimage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordProof {
    /// The public hash the proof is about.
    pub password_hash: FieldElement,
    /// Backend proof artifact.
    pub proof: MockProof,
}

/// The compiled password program.
#[derive(Debug, Clone)]
pub struct PasswordProgram {
    system: MockProofSystem,
    pk: MockProvingKey,
    vk: MockVerifyingKey,
}

impl Default for PasswordProgram {
    fn default() -> Self {
        Self::compile()
    }
}

impl PasswordProgram {
    /// Compile the program's key pair.
    pub fn compile() -> Self {
        let (pk, vk) = MockProofSystem::compile(PASSWORD_PROGRAM);
        Self {
            system: MockProofSystem,
            pk,
            vk,
        }
    }

    /// Identity of the verifying key.
    pub fn verification_key(&self) -> VerificationKey {
        VerificationKey::from(&self.vk)
    }

    /// Prove that `password` hashes to `password_hash`.
    pub fn prove(
        &self,
        password_hash: &FieldElement,
        password: &FieldElement,
    ) -> Result<PasswordProof, ProofError> {
        if hash_secret(password) != *password_hash {
            return Err(ProofError::UnsatisfiedConstraint(
                "password does not hash to the public hash".into(),
            ));
        }
        let proof = self.system.prove(&self.pk, &statement(password_hash))?;
        Ok(PasswordProof {
            password_hash: *password_hash,
            proof,
        })
    }

    /// Check the proof under this program's key.
    pub fn verify(&self, proof: &PasswordProof) -> Result<bool, VerifyError> {
        self.system
            .verify_circuit(&self.vk, &proof.proof, &statement(&proof.password_hash))
    }
}

fn statement(password_hash: &FieldElement) -> MockCircuit {
    MockCircuit {
        circuit_data: json!({
            "program": PASSWORD_PROGRAM,
            "password_hash": password_hash.to_hex(),
        }),
        public_inputs: password_hash.to_bytes().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_proves_and_verifies() {
        let program = PasswordProgram::compile();
        let password = FieldElement::from_u64(1234);
        let hash = hash_secret(&password);
        let proof = program.prove(&hash, &password).unwrap();
        assert!(program.verify(&proof).unwrap());
    }

    #[test]
    fn wrong_password_fails_construction() {
        let program = PasswordProgram::compile();
        let hash = hash_secret(&FieldElement::from_u64(1234));
        assert!(matches!(
            program.prove(&hash, &FieldElement::from_u64(4321)),
            Err(ProofError::UnsatisfiedConstraint(_))
        ));
    }

    #[test]
    fn proof_is_bound_to_its_hash() {
        let program = PasswordProgram::compile();
        let password = FieldElement::from_u64(1);
        let mut proof = program.prove(&hash_secret(&password), &password).unwrap();
        proof.password_hash = hash_secret(&FieldElement::from_u64(2));
        assert!(!program.verify(&proof).unwrap());
    }

    #[test]
    fn membership_and_password_keys_differ() {
        let password = PasswordProgram::compile().verification_key();
        let membership = crate::membership::MembershipProgram::compile().verification_key();
        assert_ne!(password, membership);
    }
}

//! # Recursive Merkle-Membership Program
//!
//! Proves, without revealing which leaf, that the prover knows a secret whose
//! Poseidon hash is a leaf of each of one or more Merkle trees. The proof is
//! built one tree at a time:
//!
//! - **Base step** over `root₁`: assert `witness.calculate_root(hash(secret)) == root₁`;
//!   the public output is `recursive_hash = root₁`.
//! - **Inductive step** over `rootₖ` with a prior proof: verify the prior proof,
//!   re-assert the witness equation for `rootₖ`, and set
//!   `recursive_hash = Poseidon([rootₖ, prior.recursive_hash])`.
//!
//! The final public output is a left fold over the roots in construction
//! order, so it depends on that order:
//!
//! ```text
//! recursive_hash = H(rootₙ, H(rootₙ₋₁, ... H(root₂, root₁)))
//! ```
//!
//! A verifier must check both that the declared output equals the fold over
//! the roots it considers authoritative ([`expected_recursive_hash`]) and that
//! the proof verifies under the program's key. [`MembershipProgram::verify_against_roots`]
//! performs both.

use serde::{Deserialize, Serialize};
use serde_json::json;
use zkauth_core::VerificationKey;
use zkauth_crypto::{hash_secret, poseidon_hash2, FieldElement, MerkleWitness};

use crate::mock::{MockCircuit, MockProof, MockProofSystem, MockProvingKey, MockVerifyingKey};
use crate::traits::{ProofError, ProofSystem, VerifyError};

/// Program id of the membership circuit.
pub const MEMBERSHIP_PROGRAM: &str = "merkle-membership";

/// Private inputs for one tree: the inclusion path and the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipPrivateInput {
    /// Inclusion path of `hash_secret(secret)` in the tree.
    pub witness: MerkleWitness,
    /// The prover's secret.
    pub secret: FieldElement,
}

/// A (possibly chained) membership proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    /// Root proven by the last step.
    pub public_input: FieldElement,
    /// Recursive hash over every root proven so far.
    pub public_output: FieldElement,
    /// Number of trees the proof spans.
    pub depth: u32,
    /// Backend proof artifact.
    pub proof: MockProof,
}

impl MembershipProof {
    fn circuit(&self) -> MockCircuit {
        statement(&self.public_input, &self.public_output, self.depth)
    }
}

/// Fold of the roots in proving order, or `None` for an empty list.
pub fn expected_recursive_hash(roots: &[FieldElement]) -> Option<FieldElement> {
    let (first, rest) = roots.split_first()?;
    Some(
        rest.iter()
            .fold(*first, |acc, root| poseidon_hash2(root, &acc)),
    )
}

/// Construction state while folding over the trees.
enum Accumulator {
    NoProofYet,
    HaveProof(MembershipProof),
}

/// The compiled membership program: proving and verifying keys.
#[derive(Debug, Clone)]
pub struct MembershipProgram {
    system: MockProofSystem,
    pk: MockProvingKey,
    vk: MockVerifyingKey,
}

impl Default for MembershipProgram {
    fn default() -> Self {
        Self::compile()
    }
}

impl MembershipProgram {
    /// Compile the program's key pair.
    pub fn compile() -> Self {
        let (pk, vk) = MockProofSystem::compile(MEMBERSHIP_PROGRAM);
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

    /// Prove membership in a single tree.
    ///
    /// # Errors
    ///
    /// [`ProofError::UnsatisfiedConstraint`] when the witness does not lead
    /// from `hash_secret(secret)` to `root`.
    pub fn prove_base(
        &self,
        root: &FieldElement,
        private: &MembershipPrivateInput,
    ) -> Result<MembershipProof, ProofError> {
        check_membership(root, private)?;
        self.seal(*root, *root, 1)
    }

    /// Extend `prior` with membership in one more tree.
    ///
    /// # Errors
    ///
    /// [`ProofError::PriorProofInvalid`] when `prior` does not verify, and
    /// [`ProofError::UnsatisfiedConstraint`] when the witness does not lead
    /// to `root`.
    pub fn prove_step(
        &self,
        root: &FieldElement,
        prior: &MembershipProof,
        private: &MembershipPrivateInput,
    ) -> Result<MembershipProof, ProofError> {
        match self.verify(prior) {
            Ok(true) => {}
            Ok(false) => {
                return Err(ProofError::PriorProofInvalid(
                    "prior proof does not verify".into(),
                ))
            }
            Err(e) => return Err(ProofError::PriorProofInvalid(e.to_string())),
        }
        check_membership(root, private)?;
        let depth = prior
            .depth
            .checked_add(1)
            .ok_or_else(|| ProofError::InvalidInputs("proof depth overflow".into()))?;
        self.seal(
            *root,
            poseidon_hash2(root, &prior.public_output),
            depth,
        )
    }

    /// Prove membership in every tree, folding left over `roots`.
    ///
    /// Input lengths are checked before any proving work starts.
    pub fn prove_chain(
        &self,
        roots: &[FieldElement],
        privates: &[MembershipPrivateInput],
    ) -> Result<MembershipProof, ProofError> {
        if roots.len() != privates.len() {
            return Err(ProofError::LengthMismatch {
                public: roots.len(),
                private: privates.len(),
            });
        }
        if roots.is_empty() {
            return Err(ProofError::EmptyInput);
        }

        let mut acc = Accumulator::NoProofYet;
        for (root, private) in roots.iter().zip(privates) {
            let next = match &acc {
                Accumulator::NoProofYet => self.prove_base(root, private)?,
                Accumulator::HaveProof(prior) => self.prove_step(root, prior, private)?,
            };
            acc = Accumulator::HaveProof(next);
        }
        match acc {
            Accumulator::HaveProof(proof) => Ok(proof),
            Accumulator::NoProofYet => Err(ProofError::EmptyInput),
        }
    }

    /// Cryptographic check only: the proof verifies under this program's key.
    pub fn verify(&self, proof: &MembershipProof) -> Result<bool, VerifyError> {
        self.system
            .verify_circuit(&self.vk, &proof.proof, &proof.circuit())
    }

    /// Full verification against the authoritative ordered root list.
    ///
    /// Checks depth and declared output against the fold over `roots`, then
    /// runs the cryptographic check. Both must pass.
    pub fn verify_against_roots(
        &self,
        proof: &MembershipProof,
        roots: &[FieldElement],
    ) -> Result<(), VerifyError> {
        let expected = expected_recursive_hash(roots)
            .ok_or_else(|| VerifyError::VerificationFailed("no roots supplied".into()))?;
        if usize::try_from(proof.depth).ok() != Some(roots.len()) {
            return Err(VerifyError::VerificationFailed(format!(
                "proof spans {} trees, {} roots supplied",
                proof.depth,
                roots.len()
            )));
        }
        if proof.public_output != expected {
            return Err(VerifyError::OutputMismatch {
                expected: expected.to_hex(),
                actual: proof.public_output.to_hex(),
            });
        }
        if !self.verify(proof)? {
            return Err(VerifyError::VerificationFailed(
                "membership proof does not verify".into(),
            ));
        }
        Ok(())
    }

    fn seal(
        &self,
        root: FieldElement,
        output: FieldElement,
        depth: u32,
    ) -> Result<MembershipProof, ProofError> {
        let proof = self
            .system
            .prove(&self.pk, &statement(&root, &output, depth))?;
        Ok(MembershipProof {
            public_input: root,
            public_output: output,
            depth,
            proof,
        })
    }
}

fn statement(root: &FieldElement, output: &FieldElement, depth: u32) -> MockCircuit {
    MockCircuit {
        circuit_data: json!({
            "program": MEMBERSHIP_PROGRAM,
            "root": root.to_hex(),
            "recursive_hash": output.to_hex(),
            "depth": depth,
        }),
        public_inputs: root.to_bytes().to_vec(),
    }
}

fn check_membership(
    root: &FieldElement,
    private: &MembershipPrivateInput,
) -> Result<(), ProofError> {
    let leaf = hash_secret(&private.secret);
    if private.witness.calculate_root(&leaf) != *root {
        return Err(ProofError::UnsatisfiedConstraint(
            "witness does not lead from hash(secret) to root".into(),
        ));
    }
    Ok(())
}

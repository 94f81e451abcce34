//! # zkauth-zkp — Proof System Seam
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): the sealed `ProofSystem` trait every backend
//!   implements. Programs are written against it.
//!
//! - **Mock** (`mock.rs`): `MockProofSystem`, a deterministic SHA-256
//!   commitment backend standing in for the external proving library. It
//!   offers no zero-knowledge and no soundness.
//!
//! - **Membership** (`membership.rs`): the recursive Merkle-membership
//!   program. One proof spans any number of trees; its public output is an
//!   order-sensitive Poseidon fold over the proven roots.
//!
//! - **Password** (`password.rs`): proof of knowledge of a Poseidon preimage.
//!
//! ## Crate Policy
//!
//! - Depends on `zkauth-core` and `zkauth-crypto` internally.
//! - Programs enforce their constraints during proving: an unsatisfiable
//!   witness fails construction instead of yielding an invalid proof.

pub mod membership;
pub mod mock;
pub mod password;
pub mod traits;

pub use membership::{
    expected_recursive_hash, MembershipPrivateInput, MembershipProgram, MembershipProof,
    MEMBERSHIP_PROGRAM,
};
pub use mock::{MockProof, MockProofSystem};
pub use password::{PasswordProgram, PasswordProof, PASSWORD_PROGRAM};
pub use traits::{ProofError, ProofSystem, VerifyError};

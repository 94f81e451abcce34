//! Order sensitivity and determinism of chained membership proofs.

use proptest::prelude::*;
use zkauth_crypto::{hash_secret, FieldElement, MerkleTree};
use zkauth_zkp::{
    expected_recursive_hash, MembershipPrivateInput, MembershipProgram, ProofError, VerifyError,
};

fn tree_with(secrets: &[u64]) -> MerkleTree {
    MerkleTree::from_leaves(
        4,
        secrets.iter().map(|s| hash_secret(&FieldElement::from_u64(*s))),
    )
    .unwrap()
}

fn input(tree: &MerkleTree, index: u64, secret: u64) -> MembershipPrivateInput {
    MembershipPrivateInput {
        witness: tree.witness(index).unwrap(),
        secret: FieldElement::from_u64(secret),
    }
}

#[test]
fn proving_order_changes_recursive_hash() {
    let program = MembershipProgram::compile();
    let a = tree_with(&[1, 2, 3]);
    let b = tree_with(&[4, 5, 6]);

    let ab = program
        .prove_chain(&[a.root(), b.root()], &[input(&a, 0, 1), input(&b, 0, 4)])
        .unwrap();
    let ba = program
        .prove_chain(&[b.root(), a.root()], &[input(&b, 0, 4), input(&a, 0, 1)])
        .unwrap();

    assert_ne!(ab.public_output, ba.public_output);
    program
        .verify_against_roots(&ab, &[a.root(), b.root()])
        .unwrap();
    assert!(matches!(
        program.verify_against_roots(&ab, &[b.root(), a.root()]),
        Err(VerifyError::OutputMismatch { .. })
    ));
}

#[test]
fn unoccupied_index_cannot_seed_a_proof() {
    let program = MembershipProgram::compile();
    let t = tree_with(&[0, 1, 2]);
    assert!(t.witness(7).is_err());
    // Borrowing another leaf's witness does not satisfy the constraint either.
    let err = program.prove_base(&t.root(), &input(&t, 1, 0)).unwrap_err();
    assert!(matches!(err, ProofError::UnsatisfiedConstraint(_)));
}

#[test]
fn one_bad_step_fails_the_whole_chain() {
    let program = MembershipProgram::compile();
    let a = tree_with(&[1]);
    let b = tree_with(&[2]);
    let c = tree_with(&[3]);
    let err = program
        .prove_chain(
            &[a.root(), b.root(), c.root()],
            &[input(&a, 0, 1), input(&b, 0, 99), input(&c, 0, 3)],
        )
        .unwrap_err();
    assert!(matches!(err, ProofError::UnsatisfiedConstraint(_)));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn chain_output_matches_fold_and_is_deterministic(
        secrets in proptest::collection::vec(1u64..1_000_000, 1..5)
    ) {
        let program = MembershipProgram::compile();
        let trees: Vec<MerkleTree> = secrets.iter().map(|s| tree_with(&[*s])).collect();
        let roots: Vec<FieldElement> = trees.iter().map(|t| t.root()).collect();
        let privates: Vec<_> = trees
            .iter()
            .zip(&secrets)
            .map(|(t, s)| input(t, 0, *s))
            .collect();

        let first = program.prove_chain(&roots, &privates).unwrap();
        let second = program.prove_chain(&roots, &privates).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(Some(first.public_output), expected_recursive_hash(&roots));
        prop_assert!(program.verify_against_roots(&first, &roots).is_ok());
    }
}

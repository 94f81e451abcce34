//! Property tests: witnesses reproduce the root for their own leaf and index,
//! and only for that leaf.

use proptest::prelude::*;
use zkauth_crypto::{hash_secret, FieldElement, InMemoryWitnessStore, MerkleTree, WitnessStore};

fn leaves(secrets: &[u64]) -> Vec<FieldElement> {
    secrets
        .iter()
        .map(|s| hash_secret(&FieldElement::from_u64(*s)))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_occupied_leaf_has_a_sound_witness(
        secrets in proptest::collection::btree_set(any::<u64>(), 1..16),
        height in 4u8..8,
    ) {
        let secrets: Vec<u64> = secrets.into_iter().collect();
        let values = leaves(&secrets);
        let tree = MerkleTree::from_leaves(height, values.clone()).unwrap();
        let root = tree.root();
        for (i, value) in values.iter().enumerate() {
            let witness = tree.witness(i as u64).unwrap();
            prop_assert_eq!(witness.calculate_root(value), root);
            prop_assert_eq!(witness.calculate_index(), i as u64);
            let other = values[(i + 1) % values.len()];
            if other != *value {
                prop_assert_ne!(witness.calculate_root(&other), root);
            }
        }
    }

    #[test]
    fn root_is_independent_of_insertion_order(
        secrets in proptest::collection::btree_set(any::<u64>(), 1..12),
    ) {
        let values = leaves(&secrets.into_iter().collect::<Vec<_>>());
        let forward = MerkleTree::from_leaves(5, values.clone()).unwrap();
        let mut backward = MerkleTree::new(5).unwrap();
        for (i, v) in values.iter().enumerate().rev() {
            backward.set_leaf(i as u64, *v).unwrap();
        }
        prop_assert_eq!(forward.root(), backward.root());
    }

    #[test]
    fn append_invalidates_previous_witnesses(
        secrets in proptest::collection::btree_set(any::<u64>(), 1..8),
        extra in any::<u64>(),
    ) {
        let secrets: Vec<u64> = secrets.into_iter().collect();
        prop_assume!(!secrets.contains(&extra));
        let values = leaves(&secrets);
        let store = InMemoryWitnessStore::with_leaves(4, values.clone()).unwrap();
        let (old_root, old_witness) = store.public_inputs(0).unwrap();
        store.append_leaf(hash_secret(&FieldElement::from_u64(extra))).unwrap();
        prop_assert_ne!(store.root(), old_root);
        prop_assert_ne!(old_witness.calculate_root(&values[0]), store.root());
    }
}

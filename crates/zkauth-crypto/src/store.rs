//! # Witness Store
//!
//! The storage contract for one Merkle tree: roots, inclusion witnesses, and
//! leaf mutation. Every read reflects all writes that completed before it.
//!
//! [`InMemoryWitnessStore`] guards a [`MerkleTree`] with a `parking_lot`
//! read-write lock. Each mutation (including the recomputation of the path to
//! the root) happens under a single write lock, so a concurrent reader sees
//! either the whole pre-mutation tree or the whole post-mutation tree.

use parking_lot::RwLock;

use crate::error::CryptoError;
use crate::field::FieldElement;
use crate::merkle::{MerkleTree, MerkleWitness};

/// Storage contract for a single Merkle tree.
///
/// Implementations must be safe to share between a verification request and
/// an administrative mutation running at the same time.
pub trait WitnessStore: Send + Sync {
    /// Fixed tree height.
    fn height(&self) -> u8;

    /// Current root.
    fn root(&self) -> FieldElement;

    /// Inclusion witness for an occupied slot.
    ///
    /// An unoccupied slot yields [`CryptoError::LeafNotFound`].
    fn witness(&self, index: u64) -> Result<MerkleWitness, CryptoError>;

    /// Whether a value occupies `index`.
    fn has_leaf(&self, index: u64) -> bool;

    /// Write a value at `index`.
    fn set_leaf(&self, index: u64, value: FieldElement) -> Result<(), CryptoError>;

    /// Slot contents up to the highest occupied index, with holes.
    fn leaves(&self) -> Vec<Option<FieldElement>>;

    /// Root and witness for `index`, read from the same tree state.
    fn public_inputs(&self, index: u64) -> Result<(FieldElement, MerkleWitness), CryptoError>;

    /// First index holding `value`.
    fn find_leaf(&self, value: &FieldElement) -> Option<u64>;

    /// Write `value` at the next free index and return that index.
    fn append_leaf(&self, value: FieldElement) -> Result<u64, CryptoError>;
}

/// A [`WitnessStore`] backed by an in-memory tree.
#[derive(Debug)]
pub struct InMemoryWitnessStore {
    tree: RwLock<MerkleTree>,
}

impl InMemoryWitnessStore {
    /// An empty store of the given height.
    pub fn new(height: u8) -> Result<Self, CryptoError> {
        Ok(Self::from_tree(MerkleTree::new(height)?))
    }

    /// A store seeded with `values` at indices `0..values.len()`.
    pub fn with_leaves(
        height: u8,
        values: impl IntoIterator<Item = FieldElement>,
    ) -> Result<Self, CryptoError> {
        Ok(Self::from_tree(MerkleTree::from_leaves(height, values)?))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: MerkleTree) -> Self {
        Self {
            tree: RwLock::new(tree),
        }
    }

    /// A copy of the current tree state.
    pub fn snapshot(&self) -> MerkleTree {
        self.tree.read().clone()
    }
}

impl WitnessStore for InMemoryWitnessStore {
    fn height(&self) -> u8 {
        self.tree.read().height()
    }

    fn root(&self) -> FieldElement {
        self.tree.read().root()
    }

    fn witness(&self, index: u64) -> Result<MerkleWitness, CryptoError> {
        self.tree.read().witness(index)
    }

    fn has_leaf(&self, index: u64) -> bool {
        self.tree.read().has_leaf(index)
    }

    fn set_leaf(&self, index: u64, value: FieldElement) -> Result<(), CryptoError> {
        self.tree.write().set_leaf(index, value)
    }

    fn leaves(&self) -> Vec<Option<FieldElement>> {
        self.tree.read().leaves()
    }

    fn public_inputs(&self, index: u64) -> Result<(FieldElement, MerkleWitness), CryptoError> {
        let tree = self.tree.read();
        let witness = tree.witness(index)?;
        Ok((tree.root(), witness))
    }

    fn find_leaf(&self, value: &FieldElement) -> Option<u64> {
        self.tree.read().find_leaf(value)
    }

    fn append_leaf(&self, value: FieldElement) -> Result<u64, CryptoError> {
        let mut tree = self.tree.write();
        let index = tree.next_free_index();
        if index >= tree.capacity() {
            return Err(CryptoError::TreeFull {
                capacity: tree.capacity(),
            });
        }
        tree.set_leaf(index, value)?;
        Ok(index)
    }
}

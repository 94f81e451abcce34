//! # Fixed-Height Merkle Tree
//!
//! A binary Poseidon Merkle tree with `2^height` slots. Unoccupied slots hold
//! the canonical empty value (field zero), and every empty subtree hashes to a
//! precomputed constant, so only occupied paths are stored.
//!
//! ## Hashing
//!
//! - Leaf slot: the stored value itself (callers commit `Poseidon([secret])`).
//! - Node: `Poseidon([left, right])`.
//! - Empty subtree of level `k`: `zeros[k]`, with `zeros[0] = 0` and
//!   `zeros[k + 1] = Poseidon([zeros[k], zeros[k]])`.
//!
//! ## Witnesses
//!
//! A [`MerkleWitness`] is the sibling path from a leaf to the root, valid for
//! the tree state it was taken from. Any later mutation on the path (which for
//! a fixed-height tree means any mutation that changes the root) makes it
//! stale: `calculate_root` no longer reproduces the current root.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::field::FieldElement;
use crate::poseidon::poseidon_hash2;

/// Largest supported tree height.
pub const MAX_TREE_HEIGHT: u8 = 32;

/// One step of an inclusion path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessNode {
    /// The sibling hash at this level.
    pub sibling: FieldElement,
    /// Whether the path node at this level is the left child.
    pub is_left: bool,
}

/// Inclusion path for one leaf, ordered from leaf level to just below the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleWitness {
    /// Sibling path, leaf level first.
    pub path: Vec<WitnessNode>,
}

impl MerkleWitness {
    /// Fold `leaf` up the path and return the implied root.
    pub fn calculate_root(&self, leaf: &FieldElement) -> FieldElement {
        self.path.iter().fold(*leaf, |current, node| {
            if node.is_left {
                poseidon_hash2(&current, &node.sibling)
            } else {
                poseidon_hash2(&node.sibling, &current)
            }
        })
    }

    /// Recover the leaf index encoded by the left/right flags.
    pub fn calculate_index(&self) -> u64 {
        self.path
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_left)
            .fold(0u64, |acc, (level, _)| acc | (1u64 << level))
    }

    /// Number of levels in the path (equals the tree height).
    pub fn height(&self) -> usize {
        self.path.len()
    }
}

/// A fixed-height Poseidon Merkle tree.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    height: u8,
    leaves: BTreeMap<u64, FieldElement>,
    /// Non-empty nodes keyed by `(level, index)`; level 0 is the leaf level.
    nodes: HashMap<(u8, u64), FieldElement>,
    /// `zeros[k]` is the hash of an empty subtree of level `k`.
    zeros: Vec<FieldElement>,
}

impl MerkleTree {
    /// Create an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidHeight`] unless `1 <= height <= MAX_TREE_HEIGHT`.
    pub fn new(height: u8) -> Result<Self, CryptoError> {
        if height == 0 || height > MAX_TREE_HEIGHT {
            return Err(CryptoError::InvalidHeight {
                height,
                max: MAX_TREE_HEIGHT,
            });
        }
        let mut zeros = Vec::with_capacity(usize::from(height) + 1);
        zeros.push(FieldElement::zero());
        for level in 0..usize::from(height) {
            let z = zeros[level];
            zeros.push(poseidon_hash2(&z, &z));
        }
        Ok(Self {
            height,
            leaves: BTreeMap::new(),
            nodes: HashMap::new(),
            zeros,
        })
    }

    /// Create a tree and fill slots `0..values.len()` in order.
    pub fn from_leaves(
        height: u8,
        values: impl IntoIterator<Item = FieldElement>,
    ) -> Result<Self, CryptoError> {
        let mut tree = Self::new(height)?;
        for (index, value) in values.into_iter().enumerate() {
            tree.set_leaf(index as u64, value)?;
        }
        Ok(tree)
    }

    /// Tree height (number of sibling levels in a witness).
    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of slots: `2^height`.
    pub fn capacity(&self) -> u64 {
        1u64 << self.height
    }

    /// Number of occupied slots.
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Current root.
    pub fn root(&self) -> FieldElement {
        self.node(self.height, 0)
    }

    /// Whether a value occupies `index`.
    pub fn has_leaf(&self, index: u64) -> bool {
        self.leaves.contains_key(&index)
    }

    /// The value at `index`, if occupied.
    pub fn leaf(&self, index: u64) -> Option<FieldElement> {
        self.leaves.get(&index).copied()
    }

    /// Write `value` at `index` and recompute the path to the root.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::IndexOutOfRange`] past the tree's capacity.
    pub fn set_leaf(&mut self, index: u64, value: FieldElement) -> Result<(), CryptoError> {
        self.check_index(index)?;
        self.leaves.insert(index, value);
        self.nodes.insert((0, index), value);

        let mut idx = index;
        for level in 0..self.height {
            let parent = idx >> 1;
            let left = self.node(level, parent << 1);
            let right = self.node(level, (parent << 1) | 1);
            self.nodes.insert((level + 1, parent), poseidon_hash2(&left, &right));
            idx = parent;
        }
        Ok(())
    }

    /// Inclusion witness for the occupied slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::LeafNotFound`] for an unoccupied slot and
    /// [`CryptoError::IndexOutOfRange`] past capacity.
    pub fn witness(&self, index: u64) -> Result<MerkleWitness, CryptoError> {
        self.check_index(index)?;
        if !self.has_leaf(index) {
            return Err(CryptoError::LeafNotFound { index });
        }
        let path = (0..self.height)
            .map(|level| {
                let idx = index >> level;
                WitnessNode {
                    sibling: self.node(level, idx ^ 1),
                    is_left: idx & 1 == 0,
                }
            })
            .collect();
        Ok(MerkleWitness { path })
    }

    /// Slot contents from index 0 through the highest occupied index.
    pub fn leaves(&self) -> Vec<Option<FieldElement>> {
        let Some((&last, _)) = self.leaves.iter().next_back() else {
            return Vec::new();
        };
        (0..=last).map(|i| self.leaf(i)).collect()
    }

    /// First index holding `value`.
    pub fn find_leaf(&self, value: &FieldElement) -> Option<u64> {
        self.leaves
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(index, _)| *index)
    }

    /// One past the highest occupied index.
    pub fn next_free_index(&self) -> u64 {
        self.leaves
            .keys()
            .next_back()
            .map(|last| last + 1)
            .unwrap_or(0)
    }

    fn node(&self, level: u8, index: u64) -> FieldElement {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or(self.zeros[usize::from(level)])
    }

    fn check_index(&self, index: u64) -> Result<(), CryptoError> {
        if index >= self.capacity() {
            return Err(CryptoError::IndexOutOfRange {
                index,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }
}

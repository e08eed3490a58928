//! # Registry Merkle Tree
//!
//! A fixed-depth binary hash tree over `2^levels` slots. Each slot holds
//! one field element; the zero element marks an unoccupied slot.
//!
//! ## Layers
//!
//! `layers[0]` is a copy of the leaves and
//! `layers[k + 1][j] = hash2(layers[k][2j], layers[k][2j + 1])`, with the
//! zero element standing in for a missing right child. The root is the
//! single element of `layers[levels]`.
//!
//! ## Build Discipline
//!
//! Building is not incremental. `insert_leaf` only writes the slot and
//! marks the tree unbuilt; `root` and `proof` fail with
//! [`TreeError::NotBuilt`] until `build` recomputes every layer from the
//! current leaves. A proof therefore never mixes stale upper layers with
//! fresh leaves.
//!
//! ## Proofs
//!
//! A [`MerkleProof`] carries the root, the leaf actually stored at the
//! queried slot, one sibling per level, and one path bit per level
//! (`0` = the running node is a left child, `1` = right child).
//! Recomputing the path from the leaf reproduces the root for every proof
//! taken from a built tree.

use serde::{Deserialize, Serialize};
use zkreg_core::FieldElement;

use crate::error::{HashError, TreeError};
use crate::hasher::HashProvider;

/// Largest supported depth. 2^20 slots keeps a full rebuild tractable.
pub const MAX_LEVELS: usize = 20;

/// A sibling-path proof for one slot of a built tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    /// Root of the tree the proof was taken from.
    pub root: FieldElement,
    /// Value stored at the queried slot.
    pub leaf: FieldElement,
    /// Sibling at each level, leaf level first.
    pub siblings: Vec<FieldElement>,
    /// Path bit at each level: 0 = left child, 1 = right child.
    pub path_indices: Vec<u8>,
}

/// A fixed-depth registry tree that owns its hash provider.
#[derive(Debug, Clone)]
pub struct MerkleTree<H> {
    levels: usize,
    leaves: Vec<FieldElement>,
    layers: Vec<Vec<FieldElement>>,
    hasher: H,
}

impl<H: HashProvider> MerkleTree<H> {
    /// Allocate `2^levels` zero leaves. The tree starts unbuilt.
    pub fn new(levels: usize, hasher: H) -> Result<Self, TreeError> {
        if levels > MAX_LEVELS {
            return Err(TreeError::InvalidDepth {
                levels,
                max: MAX_LEVELS,
            });
        }
        Ok(Self {
            levels,
            leaves: vec![FieldElement::zero(); 1usize << levels],
            layers: Vec::new(),
            hasher,
        })
    }

    /// Tree depth.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Number of leaf slots, `2^levels`.
    pub fn capacity(&self) -> usize {
        self.leaves.len()
    }

    /// Current leaf values, index-addressed.
    pub fn leaves(&self) -> &[FieldElement] {
        &self.leaves
    }

    /// All layers, leaves first. Empty while the tree is unbuilt.
    pub fn layers(&self) -> &[Vec<FieldElement>] {
        &self.layers
    }

    /// The injected hash provider.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Whether every layer has been computed from the current leaves.
    pub fn is_built(&self) -> bool {
        self.layers.len() == self.levels + 1
    }

    /// Derive a leaf value from a human-readable description.
    pub fn hash_leaf_value(&self, description: &str) -> Result<FieldElement, TreeError> {
        Ok(self.hasher.hash1(description.as_bytes())?)
    }

    /// Overwrite the slot at `index`. Marks the tree unbuilt.
    pub fn insert_leaf(&mut self, index: usize, value: FieldElement) -> Result<(), TreeError> {
        let capacity = self.capacity();
        let slot = self
            .leaves
            .get_mut(index)
            .ok_or(TreeError::IndexOutOfRange { index, capacity })?;
        *slot = value;
        self.layers.clear();
        Ok(())
    }

    /// Recompute every layer bottom-up and return the root.
    pub fn build(&mut self) -> Result<FieldElement, TreeError> {
        let mut layers = Vec::with_capacity(self.levels + 1);
        layers.push(self.leaves.clone());

        for level in 0..self.levels {
            let current = &layers[level];
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                let zero = FieldElement::zero();
                let right = pair.get(1).unwrap_or(&zero);
                next.push(self.hasher.hash2(&pair[0], right)?);
            }
            layers.push(next);
        }

        self.layers = layers;
        self.root()
    }

    /// The root of the built tree.
    pub fn root(&self) -> Result<FieldElement, TreeError> {
        if !self.is_built() {
            return Err(TreeError::NotBuilt);
        }
        self.layers
            .last()
            .and_then(|top| top.first())
            .cloned()
            .ok_or(TreeError::NotBuilt)
    }

    /// Sibling-path proof for the slot at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, TreeError> {
        if !self.is_built() {
            return Err(TreeError::NotBuilt);
        }
        if index >= self.capacity() {
            return Err(TreeError::IndexOutOfRange {
                index,
                capacity: self.capacity(),
            });
        }

        let mut siblings = Vec::with_capacity(self.levels);
        let mut path_indices = Vec::with_capacity(self.levels);
        let mut current = index;

        for layer in &self.layers[..self.levels] {
            let is_right = current % 2 == 1;
            let sibling_index = current ^ 1;
            siblings.push(
                layer
                    .get(sibling_index)
                    .cloned()
                    .unwrap_or_else(FieldElement::zero),
            );
            path_indices.push(u8::from(is_right));
            current /= 2;
        }

        Ok(MerkleProof {
            root: self.root()?,
            leaf: self.leaves[index].clone(),
            siblings,
            path_indices,
        })
    }

    /// Recompute the proof's path with this tree's hasher and compare to
    /// the proof's root. A proof whose shape does not match this tree's
    /// depth is rejected.
    pub fn verify(&self, proof: &MerkleProof) -> Result<bool, TreeError> {
        if proof.siblings.len() != self.levels {
            return Ok(false);
        }
        Ok(verify_proof(&self.hasher, proof)?)
    }

    /// Lowest slot holding the zero element, or `None` if the registry is
    /// full.
    pub fn find_first_empty_slot(&self) -> Option<usize> {
        self.leaves.iter().position(FieldElement::is_zero)
    }

    /// Whether some slot holds exactly `value`. On an empty tree this is
    /// true for the zero element.
    pub fn contains(&self, value: &FieldElement) -> bool {
        self.leaves.iter().any(|leaf| leaf == value)
    }
}

/// Recompute a proof's path from its leaf and compare to its root.
///
/// Returns `false` for malformed proofs (length mismatch between siblings
/// and path bits, or a path bit other than 0/1).
pub fn verify_proof<H: HashProvider + ?Sized>(
    hasher: &H,
    proof: &MerkleProof,
) -> Result<bool, HashError> {
    if proof.siblings.len() != proof.path_indices.len() {
        return Ok(false);
    }

    let mut computed = proof.leaf.clone();
    for (sibling, bit) in proof.siblings.iter().zip(&proof.path_indices) {
        computed = match bit {
            0 => hasher.hash2(&computed, sibling)?,
            1 => hasher.hash2(sibling, &computed)?,
            _ => return Ok(false),
        };
    }
    Ok(computed == proof.root)
}

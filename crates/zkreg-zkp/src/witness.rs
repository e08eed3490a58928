//! # Non-Membership Witness Builder
//!
//! Assembles the input bundle the non-membership circuit consumes from a
//! built registry tree and a candidate description.
//!
//! The witness anchors the proof at the lowest empty slot: it carries the
//! sibling path of that slot, the value stored there (the zero element),
//! and the candidate's leaf hash. The circuit checks that the path
//! reproduces `root` and that the candidate hash differs from the stored
//! value.
//!
//! ## Soundness Note
//!
//! This proves that *some* slot is empty and that the candidate is not
//! the value stored in it. It does not bind the candidate against the
//! occupied slots by any ordering or range argument. Whether the circuit
//! adds such a constraint has to be confirmed against the circuit source
//! before the output is treated as a sound exclusion proof. The builder
//! does refuse candidates that [`MerkleTree::contains`] already.
//!
//! ## Wire Form
//!
//! Serializes to the circuit's `input.json`: `root`,
//! `agentDescriptionHash`, `siblings`, `pathIndices`, `leafHash`, every
//! value a decimal string.

use serde::{Deserialize, Serialize};
use zkreg_core::FieldElement;
use zkreg_crypto::{HashProvider, MerkleProof, MerkleTree};

use crate::error::WitnessError;

/// Circuit input for one non-membership proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Witness {
    /// Root of the registry snapshot.
    pub root: FieldElement,
    /// Leaf hash of the candidate description.
    #[serde(rename = "agentDescriptionHash")]
    pub candidate_hash: FieldElement,
    /// Sibling path of the anchoring empty slot.
    pub siblings: Vec<FieldElement>,
    /// Path bits of the anchoring empty slot.
    #[serde(rename = "pathIndices", with = "decimal_bits")]
    pub path_indices: Vec<u8>,
    /// Value stored at the anchoring slot.
    #[serde(rename = "leafHash")]
    pub leaf: FieldElement,
}

impl Witness {
    /// Tree depth the witness was taken at.
    pub fn levels(&self) -> usize {
        self.siblings.len()
    }

    /// Slot index encoded by the path bits (leaf level is the low bit).
    ///
    /// Bits past the width of `usize` cannot name a slot and are ignored;
    /// deserialized witnesses never carry more than
    /// [`MAX_LEVELS`](zkreg_crypto::MAX_LEVELS).
    pub fn slot_index(&self) -> usize {
        self.path_indices
            .iter()
            .enumerate()
            .fold(0, |acc, (level, bit)| {
                let shift = u32::try_from(level).unwrap_or(u32::MAX);
                acc | usize::from(*bit).checked_shl(shift).unwrap_or(0)
            })
    }

    /// The Merkle proof of the anchoring slot.
    pub fn merkle_proof(&self) -> MerkleProof {
        MerkleProof {
            root: self.root.clone(),
            leaf: self.leaf.clone(),
            siblings: self.siblings.clone(),
            path_indices: self.path_indices.clone(),
        }
    }

    /// Whether the candidate differs from the anchoring slot's value. This
    /// is the bit the circuit publishes as `isNonMember`.
    pub fn claims_non_membership(&self) -> bool {
        self.candidate_hash != self.leaf
    }
}

/// Build a non-membership witness for `description` against a built tree.
///
/// Fails with [`WitnessError::AlreadyMember`] if the candidate's hash is
/// stored in some slot, [`WitnessError::RegistryFull`] if no slot is
/// empty, and `TreeError::NotBuilt` if the tree has pending inserts.
pub fn build_non_membership_witness<H: HashProvider>(
    tree: &MerkleTree<H>,
    description: &str,
) -> Result<Witness, WitnessError> {
    let candidate_hash = tree.hash_leaf_value(description)?;
    if tree.contains(&candidate_hash) {
        return Err(WitnessError::AlreadyMember {
            hash: candidate_hash.to_decimal(),
        });
    }

    let slot = tree
        .find_first_empty_slot()
        .ok_or(WitnessError::RegistryFull {
            capacity: tree.capacity(),
        })?;
    let proof = tree.proof(slot)?;
    tracing::debug!(slot, hasher = tree.hasher().name(), "anchored witness at empty slot");

    Ok(Witness {
        root: proof.root,
        candidate_hash,
        siblings: proof.siblings,
        path_indices: proof.path_indices,
        leaf: proof.leaf,
    })
}

/// Build a tree holding `descriptions` in slots `0..n` and compute its root.
pub fn seed_registry<H, S>(
    levels: usize,
    hasher: H,
    descriptions: &[S],
) -> Result<MerkleTree<H>, WitnessError>
where
    H: HashProvider,
    S: AsRef<str>,
{
    let mut tree = MerkleTree::new(levels, hasher)?;
    if descriptions.len() > tree.capacity() {
        return Err(WitnessError::RegistryFull {
            capacity: tree.capacity(),
        });
    }
    for (index, description) in descriptions.iter().enumerate() {
        let leaf = tree.hash_leaf_value(description.as_ref())?;
        tree.insert_leaf(index, leaf)?;
    }
    tree.build()?;
    Ok(tree)
}

/// Path bits travel as decimal strings (`"0"` / `"1"`) in circuit input.
mod decimal_bits {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use zkreg_crypto::MAX_LEVELS;

    pub fn serialize<S: Serializer>(bits: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(bits.iter().map(|b| b.to_string()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = Vec::<String>::deserialize(deserializer)?;
        if raw.len() > MAX_LEVELS {
            return Err(D::Error::custom(format!(
                "{} path indices exceed the maximum depth of {MAX_LEVELS}",
                raw.len()
            )));
        }
        raw.iter()
            .map(|s| match s.as_str() {
                "0" => Ok(0),
                "1" => Ok(1),
                other => Err(D::Error::custom(format!(
                    "path index must be \"0\" or \"1\", got {other:?}"
                ))),
            })
            .collect()
    }
}

//! # Cryptographic Error Types
//!
//! Errors from hash providers and the registry tree.

use thiserror::Error;
use zkreg_core::CodecError;

/// Errors from a [`HashProvider`](crate::HashProvider).
#[derive(Error, Debug)]
pub enum HashError {
    /// Hash parameters could not be loaded.
    #[error("failed to load hash parameters: {0}")]
    ParameterLoad(String),

    /// The hash backend rejected its input.
    #[error("hash backend error: {0}")]
    Backend(String),

    /// An input could not be encoded for hashing.
    #[error("hash input encoding error: {0}")]
    Encoding(#[from] CodecError),
}

/// Errors from [`MerkleTree`](crate::MerkleTree) operations.
#[derive(Error, Debug)]
pub enum TreeError {
    /// Leaf index at or beyond the tree capacity.
    #[error("index {index} out of range (capacity {capacity}, max index {})", capacity - 1)]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of leaf slots, `2^levels`.
        capacity: usize,
    },

    /// A root or proof was requested from an unbuilt tree.
    #[error("tree not built; call build() after the last insert")]
    NotBuilt,

    /// Requested depth exceeds the supported maximum.
    #[error("tree depth {levels} exceeds the maximum of {max}")]
    InvalidDepth {
        /// The requested depth.
        levels: usize,
        /// Largest supported depth.
        max: usize,
    },

    /// The hash provider failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

//! # zkreg-crypto: Registry Hashing and the Merkle Tree
//!
//! - **Hash providers** (`hasher.rs`, `poseidon.rs`): the two-ary and
//!   one-ary field hash the registry tree is built from. Providers are
//!   explicit values injected into the tree at construction; there is no
//!   process-wide hasher.
//! - **Merkle tree** (`merkle.rs`): fixed-depth binary tree over
//!   `2^levels` slots, root computation, sibling-path proofs, and proof
//!   verification.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkreg-core` internally.
//! - Tree tests run against the SHA-256 provider; Poseidon tests pin the
//!   circom reference vectors.

pub mod error;
pub mod hasher;
pub mod merkle;
pub mod poseidon;

pub use error::{HashError, TreeError};
pub use hasher::{HashProvider, Sha256FieldHasher};
pub use merkle::{verify_proof, MerkleProof, MerkleTree, MAX_LEVELS};
pub use poseidon::CircomPoseidon;

//! # Hash Providers
//!
//! The registry tree is generic over a [`HashProvider`]: a deterministic,
//! collision-resistant hash whose outputs are themselves valid leaf and
//! node values (reduced modulo the BN254 scalar field).
//!
//! - `hash2(a, b)` binds two field elements into a parent node.
//! - `hash1(bytes)` packs a byte string into one field element as its
//!   big-endian numeric value (reduced modulo the field) and hashes it.
//!   This derives a leaf from a human-readable item description.
//!
//! Two providers ship with the crate:
//!
//! - [`CircomPoseidon`](crate::CircomPoseidon), bit-compatible with the
//!   circuit's Poseidon gadget. Required for proofs that verify.
//! - [`Sha256FieldHasher`], a domain-separated SHA-256 reduced into the
//!   field. A fixed test hash for tree behaviour; its roots do not match
//!   the circuit.

use std::sync::Arc;

use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use zkreg_core::codec::encode_element;
use zkreg_core::{bn254_scalar_modulus, FieldElement};

use crate::error::HashError;

/// Domain-separation tag for single-element hashing.
const SINGLE_TAG: u8 = 0x00;
/// Domain-separation tag for pair hashing.
const PAIR_TAG: u8 = 0x01;

/// A field hash used to build registry trees.
pub trait HashProvider: Send + Sync {
    /// Hash two field elements (left, right) into a parent node.
    fn hash2(&self, left: &FieldElement, right: &FieldElement) -> Result<FieldElement, HashError>;

    /// Hash a single field element.
    fn hash_element(&self, value: &FieldElement) -> Result<FieldElement, HashError>;

    /// Short identifier for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Pack `bytes` big-endian into one field element and hash it.
    fn hash1(&self, bytes: &[u8]) -> Result<FieldElement, HashError> {
        self.hash_element(&FieldElement::pack_be(bytes))
    }
}

impl<T: HashProvider + ?Sized> HashProvider for &T {
    fn hash2(&self, left: &FieldElement, right: &FieldElement) -> Result<FieldElement, HashError> {
        (**self).hash2(left, right)
    }

    fn hash_element(&self, value: &FieldElement) -> Result<FieldElement, HashError> {
        (**self).hash_element(value)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

impl<T: HashProvider + ?Sized> HashProvider for Arc<T> {
    fn hash2(&self, left: &FieldElement, right: &FieldElement) -> Result<FieldElement, HashError> {
        (**self).hash2(left, right)
    }

    fn hash_element(&self, value: &FieldElement) -> Result<FieldElement, HashError> {
        (**self).hash_element(value)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Domain-separated SHA-256 reduced into the BN254 scalar field.
///
/// - Single: `SHA256(0x00 || enc(a)) mod r`
/// - Pair: `SHA256(0x01 || enc(a) || enc(b)) mod r`
///
/// where `enc` is the 32-byte big-endian encoding of the input after
/// reduction modulo `r`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256FieldHasher;

impl Sha256FieldHasher {
    fn digest_to_field(hasher: Sha256) -> FieldElement {
        let digest = hasher.finalize();
        FieldElement::new(BigUint::from_bytes_be(&digest) % bn254_scalar_modulus())
    }
}

impl HashProvider for Sha256FieldHasher {
    fn hash2(&self, left: &FieldElement, right: &FieldElement) -> Result<FieldElement, HashError> {
        let mut hasher = Sha256::new();
        hasher.update([PAIR_TAG]);
        hasher.update(encode_element(&left.reduce())?);
        hasher.update(encode_element(&right.reduce())?);
        Ok(Self::digest_to_field(hasher))
    }

    fn hash_element(&self, value: &FieldElement) -> Result<FieldElement, HashError> {
        let mut hasher = Sha256::new();
        hasher.update([SINGLE_TAG]);
        hasher.update(encode_element(&value.reduce())?);
        Ok(Self::digest_to_field(hasher))
    }

    fn name(&self) -> &'static str {
        "sha256-field"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hasher_is_deterministic() {
        let h = Sha256FieldHasher;
        let a = FieldElement::from_u64(1);
        let b = FieldElement::from_u64(2);
        assert_eq!(h.hash2(&a, &b).unwrap(), h.hash2(&a, &b).unwrap());
    }

    #[test]
    fn sha256_hasher_is_order_sensitive() {
        let h = Sha256FieldHasher;
        let a = FieldElement::from_u64(1);
        let b = FieldElement::from_u64(2);
        assert_ne!(h.hash2(&a, &b).unwrap(), h.hash2(&b, &a).unwrap());
    }

    #[test]
    fn single_and_pair_domains_differ() {
        let h = Sha256FieldHasher;
        let z = FieldElement::zero();
        assert_ne!(h.hash_element(&z).unwrap(), h.hash2(&z, &z).unwrap());
    }

    #[test]
    fn outputs_are_canonical_field_elements() {
        let h = Sha256FieldHasher;
        for i in 0..32u64 {
            let out = h.hash2(&FieldElement::from_u64(i), &FieldElement::zero()).unwrap();
            assert!(out.is_canonical());
        }
    }

    #[test]
    fn hash1_packs_bytes_before_hashing() {
        let h = Sha256FieldHasher;
        assert_eq!(
            h.hash1(&[0x01, 0x00]).unwrap(),
            h.hash_element(&FieldElement::from_u64(256)).unwrap()
        );
    }

    #[test]
    fn distinct_descriptions_hash_differently() {
        let h = Sha256FieldHasher;
        let a = h.hash1(b"Code Review Bot").unwrap();
        let b = h.hash1(b"Data Analysis Agent").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn provider_works_through_references_and_arcs() {
        let h = Sha256FieldHasher;
        let direct = h.hash1(b"x").unwrap();
        let by_ref = (&h).hash1(b"x").unwrap();
        let by_arc = Arc::new(h).hash1(b"x").unwrap();
        assert_eq!(direct, by_ref);
        assert_eq!(direct, by_arc);
    }
}

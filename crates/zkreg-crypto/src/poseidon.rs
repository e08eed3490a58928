//! # Poseidon over BN254 (circom-compatible)
//!
//! The production [`HashProvider`]. Uses the circom parameter set (x^5
//! S-box, 8 full rounds, arity-dependent partial rounds) so that roots and
//! leaf hashes computed here match what the non-membership circuit
//! recomputes in-constraint.
//!
//! ## Acquisition
//!
//! Round constants and MDS matrices are materialised once by
//! [`CircomPoseidon::load`]. The returned value is ready to use and is
//! passed explicitly to every tree that needs it; share it across trees
//! with `Arc<CircomPoseidon>`.
//!
//! ## Input Reduction
//!
//! Inputs are reduced modulo the scalar field before hashing, so a packed
//! description longer than 31 bytes wraps rather than failing.

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonHasher};
use num_bigint::BigUint;
use parking_lot::Mutex;
use zkreg_core::FieldElement;

use crate::error::HashError;
use crate::hasher::HashProvider;

/// Circom-compatible Poseidon hasher over the BN254 scalar field.
pub struct CircomPoseidon {
    single: Mutex<Poseidon<Fr>>,
    pair: Mutex<Poseidon<Fr>>,
}

impl CircomPoseidon {
    /// Materialise the one-input and two-input parameter sets.
    pub fn load() -> Result<Self, HashError> {
        let single = Poseidon::<Fr>::new_circom(1)
            .map_err(|e| HashError::ParameterLoad(format!("poseidon t=2: {e}")))?;
        let pair = Poseidon::<Fr>::new_circom(2)
            .map_err(|e| HashError::ParameterLoad(format!("poseidon t=3: {e}")))?;
        Ok(Self {
            single: Mutex::new(single),
            pair: Mutex::new(pair),
        })
    }
}

impl std::fmt::Debug for CircomPoseidon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircomPoseidon").finish_non_exhaustive()
    }
}

fn to_fr(value: &FieldElement) -> Fr {
    Fr::from_be_bytes_mod_order(&value.as_biguint().to_bytes_be())
}

fn from_fr(value: Fr) -> FieldElement {
    FieldElement::new(BigUint::from_bytes_be(&value.into_bigint().to_bytes_be()))
}

impl HashProvider for CircomPoseidon {
    fn hash2(&self, left: &FieldElement, right: &FieldElement) -> Result<FieldElement, HashError> {
        let out = self
            .pair
            .lock()
            .hash(&[to_fr(left), to_fr(right)])
            .map_err(|e| HashError::Backend(e.to_string()))?;
        Ok(from_fr(out))
    }

    fn hash_element(&self, value: &FieldElement) -> Result<FieldElement, HashError> {
        let out = self
            .single
            .lock()
            .hash(&[to_fr(value)])
            .map_err(|e| HashError::Backend(e.to_string()))?;
        Ok(from_fr(out))
    }

    fn name(&self) -> &'static str {
        "poseidon-bn254-circom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(s: &str) -> FieldElement {
        FieldElement::from_decimal(s).unwrap()
    }

    #[test]
    fn pair_matches_circomlib_vector() {
        // circomlibjs: poseidon([1, 2])
        let h = CircomPoseidon::load().unwrap();
        let out = h.hash2(&fe("1"), &fe("2")).unwrap();
        assert_eq!(
            out.to_decimal(),
            "7853200120776062878684798364095072458815029376092732009249414926327459813530"
        );
    }

    #[test]
    fn outputs_are_canonical() {
        let h = CircomPoseidon::load().unwrap();
        let out = h.hash1(b"Code Review Bot - Analyzes pull requests").unwrap();
        assert!(out.is_canonical());
        assert!(!out.is_zero());
    }

    #[test]
    fn inputs_at_modulus_wrap_to_zero() {
        let h = CircomPoseidon::load().unwrap();
        let r = FieldElement::new(zkreg_core::bn254_scalar_modulus());
        assert_eq!(
            h.hash2(&r, &FieldElement::zero()).unwrap(),
            h.hash2(&FieldElement::zero(), &FieldElement::zero()).unwrap()
        );
    }

    #[test]
    fn single_and_pair_differ() {
        let h = CircomPoseidon::load().unwrap();
        let one = fe("1");
        assert_ne!(
            h.hash_element(&one).unwrap(),
            h.hash2(&one, &FieldElement::zero()).unwrap()
        );
    }
}

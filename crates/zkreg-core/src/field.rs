//! # Field Elements
//!
//! Defines `FieldElement`, the unit of value flowing through the registry
//! tree, the witness, and the proof artifacts.
//!
//! A field element is a non-negative integer. Hash outputs are always
//! reduced modulo the BN254 scalar field; proof coordinates live in the
//! BN254 base field. Both fit in 256 bits, which is the only bound this
//! type enforces at parse time. Reduction is explicit via
//! [`FieldElement::reduce`].
//!
//! ## Serialization
//!
//! Serialized as a decimal string, matching the JSON produced and consumed
//! by the circuit toolchain (`"12345"`, never a JSON number).
//!
//! ## Absence Sentinel
//!
//! The zero element marks an unoccupied registry slot. No entry is ever
//! removed from a registry, only left at zero.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// Big-endian bytes of the BN254 scalar field modulus
/// `r = 21888242871839275222246405745257275088548364400416034343698204186575808495617`.
const BN254_SCALAR_MODULUS_BE: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

/// The BN254 scalar field modulus, the field the registry tree hashes over.
pub fn bn254_scalar_modulus() -> BigUint {
    BigUint::from_bytes_be(&BN254_SCALAR_MODULUS_BE)
}

/// A non-negative integer carried as a field value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// The zero element (the unoccupied-slot sentinel).
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    /// Wrap an arbitrary non-negative integer.
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    /// Construct from a machine integer.
    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    /// Interpret `bytes` as a big-endian integer and reduce it modulo the
    /// BN254 scalar field.
    ///
    /// This is how a human-readable description is packed into a single
    /// field element before leaf hashing. Inputs longer than 31 bytes
    /// exceed the modulus and wrap.
    pub fn pack_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes) % bn254_scalar_modulus())
    }

    /// Parse a decimal string.
    ///
    /// Negative values and values at or above 2^256 fail with
    /// [`CodecError::EncodingRange`]; anything else that is not a plain
    /// run of ASCII digits fails with [`CodecError::InvalidDecimal`].
    pub fn from_decimal(s: &str) -> Result<Self, CodecError> {
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CodecError::InvalidDecimal(s.to_string()));
        }
        let value = BigUint::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| CodecError::InvalidDecimal(s.to_string()))?;
        if negative && !value.is_zero() {
            return Err(CodecError::EncodingRange {
                value: trimmed.to_string(),
            });
        }
        if value.bits() > 256 {
            return Err(CodecError::EncodingRange {
                value: value.to_str_radix(10),
            });
        }
        Ok(Self(value))
    }

    /// Render as a decimal string.
    pub fn to_decimal(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// Whether this is the zero element.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Whether the value is already reduced modulo the BN254 scalar field.
    pub fn is_canonical(&self) -> bool {
        self.0 < bn254_scalar_modulus()
    }

    /// Reduce modulo the BN254 scalar field.
    pub fn reduce(&self) -> Self {
        Self(&self.0 % bn254_scalar_modulus())
    }

    /// Borrow the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Consume into the underlying integer.
    pub fn into_biguint(self) -> BigUint {
        self.0
    }
}

impl From<u64> for FieldElement {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<BigUint> for FieldElement {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl FromStr for FieldElement {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_decimal(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_default_and_sentinel() {
        assert_eq!(FieldElement::default(), FieldElement::zero());
        assert!(FieldElement::zero().is_zero());
        assert!(!FieldElement::from_u64(1).is_zero());
    }

    #[test]
    fn decimal_roundtrip() {
        let fe = FieldElement::from_decimal("123456789012345678901234567890").unwrap();
        assert_eq!(fe.to_decimal(), "123456789012345678901234567890");
        assert_eq!(fe.to_string(), "123456789012345678901234567890");
    }

    #[test]
    fn rejects_negative_with_range_error() {
        let err = FieldElement::from_decimal("-5").unwrap_err();
        assert!(matches!(err, CodecError::EncodingRange { .. }));
    }

    #[test]
    fn negative_zero_is_zero() {
        assert_eq!(FieldElement::from_decimal("-0").unwrap(), FieldElement::zero());
    }

    #[test]
    fn rejects_value_at_two_pow_256() {
        let two_256 = (BigUint::from(1u8) << 256usize).to_str_radix(10);
        let err = FieldElement::from_decimal(&two_256).unwrap_err();
        assert!(matches!(err, CodecError::EncodingRange { .. }));
    }

    #[test]
    fn accepts_two_pow_256_minus_one() {
        let max = ((BigUint::from(1u8) << 256usize) - 1u8).to_str_radix(10);
        assert!(FieldElement::from_decimal(&max).is_ok());
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "abc", "12a", "1_000", "+5", "0x10", "-"] {
            assert!(
                matches!(
                    FieldElement::from_decimal(bad),
                    Err(CodecError::InvalidDecimal(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn modulus_matches_known_decimal() {
        assert_eq!(
            bn254_scalar_modulus().to_str_radix(10),
            "21888242871839275222246405745257275088548364400416034343698204186575808495617"
        );
    }

    #[test]
    fn reduce_wraps_modulus_to_zero() {
        let r = FieldElement::new(bn254_scalar_modulus());
        assert!(!r.is_canonical());
        assert!(r.reduce().is_zero());
    }

    #[test]
    fn pack_be_is_big_endian() {
        assert_eq!(FieldElement::pack_be(&[0x01, 0x00]), FieldElement::from_u64(256));
        assert_eq!(FieldElement::pack_be(b""), FieldElement::zero());
        // "AB" = 0x4142
        assert_eq!(FieldElement::pack_be(b"AB"), FieldElement::from_u64(0x4142));
    }

    #[test]
    fn pack_be_long_input_is_reduced() {
        let long = "Marketing Content Generator - Creates social media posts";
        let packed = FieldElement::pack_be(long.as_bytes());
        assert!(packed.is_canonical());
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let fe = FieldElement::from_u64(42);
        assert_eq!(serde_json::to_string(&fe).unwrap(), "\"42\"");
        let back: FieldElement = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(back, fe);
        assert!(serde_json::from_str::<FieldElement>("42").is_err());
        assert!(serde_json::from_str::<FieldElement>("\"-1\"").is_err());
    }
}

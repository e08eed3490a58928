//! # Field Element Codec
//!
//! Converts between arbitrary-precision integers and the fixed-width
//! big-endian byte form the on-chain verifier expects for every field
//! value: exactly 32 bytes, zero-padded on the left.
//!
//! ## Invariant
//!
//! `decode(&encode_fixed_width(v)?) == v` for every `v` in `[0, 2^256)`.
//! Negative values and values at or above 2^256 are rejected with
//! [`CodecError::EncodingRange`]; the codec never truncates.
//!
//! The hex helpers render the same 32 bytes as `0x` followed by exactly
//! 64 lowercase hex digits, the argument form used by the contract CLI.

use num_bigint::{BigInt, BigUint, Sign};

use crate::error::CodecError;
use crate::field::FieldElement;

/// Width in bytes of an encoded field element.
pub const FIELD_WIDTH: usize = 32;

/// Encode a non-negative integer below 2^256 as 32 big-endian bytes.
pub fn encode_fixed_width(value: &BigInt) -> Result<[u8; FIELD_WIDTH], CodecError> {
    if value.sign() == Sign::Minus {
        return Err(CodecError::EncodingRange {
            value: value.to_str_radix(10),
        });
    }
    let magnitude = value.magnitude();
    encode_magnitude(magnitude)
}

/// Encode a [`FieldElement`] as 32 big-endian bytes.
pub fn encode_element(value: &FieldElement) -> Result<[u8; FIELD_WIDTH], CodecError> {
    encode_magnitude(value.as_biguint())
}

fn encode_magnitude(magnitude: &BigUint) -> Result<[u8; FIELD_WIDTH], CodecError> {
    if magnitude.bits() > (FIELD_WIDTH as u64) * 8 {
        return Err(CodecError::EncodingRange {
            value: magnitude.to_str_radix(10),
        });
    }
    let be = magnitude.to_bytes_be();
    let mut out = [0u8; FIELD_WIDTH];
    // to_bytes_be() of zero is [0]; the left padding absorbs it.
    out[FIELD_WIDTH - be.len()..].copy_from_slice(&be);
    Ok(out)
}

/// Decode 32 big-endian bytes. Exact inverse of [`encode_fixed_width`].
pub fn decode(bytes: &[u8; FIELD_WIDTH]) -> BigInt {
    BigInt::from_bytes_be(Sign::Plus, bytes)
}

/// Decode a byte slice that must be exactly [`FIELD_WIDTH`] bytes long.
pub fn decode_slice(bytes: &[u8]) -> Result<FieldElement, CodecError> {
    let fixed: &[u8; FIELD_WIDTH] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
        expected: FIELD_WIDTH,
        actual: bytes.len(),
    })?;
    Ok(FieldElement::new(BigUint::from_bytes_be(fixed)))
}

/// Render a field element as `0x` + 64 lowercase hex digits.
pub fn to_hex32(value: &FieldElement) -> Result<String, CodecError> {
    let bytes = encode_element(value)?;
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("0x{hex}"))
}

/// Parse the `0x` + 64 hex digit form produced by [`to_hex32`].
///
/// The `0x` prefix is optional; the digit count is not.
pub fn from_hex32(s: &str) -> Result<FieldElement, CodecError> {
    let t = s.trim();
    let digits = t.strip_prefix("0x").unwrap_or(t);
    if digits.len() != FIELD_WIDTH * 2 {
        return Err(CodecError::InvalidLength {
            expected: FIELD_WIDTH,
            actual: digits.len() / 2,
        });
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodecError::InvalidHex(s.to_string()));
    }
    let mut out = [0u8; FIELD_WIDTH];
    for (i, chunk) in digits.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).map_err(|_| CodecError::InvalidHex(s.to_string()))?;
        out[i] = u8::from_str_radix(pair, 16).map_err(|_| CodecError::InvalidHex(s.to_string()))?;
    }
    Ok(FieldElement::new(BigUint::from_bytes_be(&out)))
}

/// Parse a signed decimal integer, as found in externally produced
/// artifacts, into a value the codec can range-check.
pub fn parse_signed_decimal(s: &str) -> Result<BigInt, CodecError> {
    BigInt::parse_bytes(s.trim().as_bytes(), 10).ok_or_else(|| CodecError::InvalidDecimal(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_pow_256() -> BigInt {
        BigInt::from(1u8) << 256usize
    }

    #[test]
    fn zero_encodes_to_all_zero_bytes() {
        assert_eq!(encode_fixed_width(&BigInt::from(0)).unwrap(), [0u8; 32]);
    }

    #[test]
    fn small_value_is_left_padded() {
        let bytes = encode_fixed_width(&BigInt::from(0x0102u32)).unwrap();
        assert!(bytes[..30].iter().all(|b| *b == 0));
        assert_eq!(bytes[30], 0x01);
        assert_eq!(bytes[31], 0x02);
    }

    #[test]
    fn max_value_encodes_to_all_ff() {
        let max = two_pow_256() - 1;
        assert_eq!(encode_fixed_width(&max).unwrap(), [0xffu8; 32]);
    }

    #[test]
    fn rejects_negative() {
        let err = encode_fixed_width(&BigInt::from(-1)).unwrap_err();
        assert!(matches!(err, CodecError::EncodingRange { value } if value == "-1"));
    }

    #[test]
    fn rejects_two_pow_256() {
        let err = encode_fixed_width(&two_pow_256()).unwrap_err();
        assert!(matches!(err, CodecError::EncodingRange { .. }));
    }

    #[test]
    fn hex32_has_prefix_and_64_digits() {
        let hex = to_hex32(&FieldElement::from_u64(123)).unwrap();
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("0x"));
        assert!(hex[2..].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(hex.ends_with("7b"));
    }

    #[test]
    fn hex32_roundtrip() {
        let fe = FieldElement::from_decimal("456").unwrap();
        let hex = to_hex32(&fe).unwrap();
        assert_eq!(from_hex32(&hex).unwrap(), fe);
        assert_eq!(from_hex32(&hex[2..]).unwrap(), fe);
    }

    #[test]
    fn from_hex32_rejects_short_and_non_hex() {
        assert!(matches!(from_hex32("0xabcd"), Err(CodecError::InvalidLength { .. })));
        assert!(matches!(
            from_hex32(&format!("0x{}", "zz".repeat(32))),
            Err(CodecError::InvalidHex(_))
        ));
    }

    #[test]
    fn from_hex32_rejects_signed_pairs() {
        let signed = format!("0x+f{}", "00".repeat(31));
        assert!(matches!(from_hex32(&signed), Err(CodecError::InvalidHex(_))));
        let minus = format!("{}-1", "00".repeat(31));
        assert!(matches!(from_hex32(&minus), Err(CodecError::InvalidHex(_))));
    }

    #[test]
    fn decode_slice_checks_width() {
        assert!(matches!(
            decode_slice(&[0u8; 31]),
            Err(CodecError::InvalidLength { expected: 32, actual: 31 })
        ));
        assert_eq!(decode_slice(&[0u8; 32]).unwrap(), FieldElement::zero());
    }

    #[test]
    fn signed_decimal_feeds_range_check() {
        let v = parse_signed_decimal("-7").unwrap();
        assert!(encode_fixed_width(&v).is_err());
        assert!(parse_signed_decimal("seven").is_err());
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(bytes in proptest::collection::vec(any::<u8>(), 0..=32)) {
            let v = BigInt::from_bytes_be(Sign::Plus, &bytes);
            let encoded = encode_fixed_width(&v).unwrap();
            prop_assert_eq!(decode(&encoded), v);
        }

        #[test]
        fn negative_values_always_rejected(n in 1u64..) {
            let v = -BigInt::from(n);
            prop_assert!(encode_fixed_width(&v).is_err());
        }
    }
}

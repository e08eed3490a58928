//! # Error Types
//!
//! Structured errors for field element parsing and encoding, and for
//! timestamp handling. All errors use `thiserror` for derive-based
//! `Display` and `Error` implementations.

use thiserror::Error;

/// Error converting a value to or from its fixed-width encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The value is negative or not below 2^256. Field data reaching the
    /// codec in this state has been corrupted upstream.
    #[error("value {value} is outside the encodable range [0, 2^256); regenerate the artifact that produced it")]
    EncodingRange {
        /// Decimal rendering of the offending value.
        value: String,
    },

    /// A decimal field element string could not be parsed.
    #[error("invalid decimal field element {0:?}")]
    InvalidDecimal(String),

    /// A hex field element string could not be parsed.
    #[error("invalid hex field element {0:?}")]
    InvalidHex(String),

    /// A byte encoding had the wrong width.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required width in bytes.
        expected: usize,
        /// Width actually supplied.
        actual: usize,
    },
}

/// Error constructing a [`Timestamp`](crate::Timestamp).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    /// The string is not RFC 3339.
    #[error("invalid RFC 3339 timestamp {input:?}: {reason}")]
    Invalid {
        /// The rejected input.
        input: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The timestamp carries a non-UTC offset.
    #[error("timestamp must use Z suffix (UTC only), got {0:?}")]
    NotUtc(String),
}

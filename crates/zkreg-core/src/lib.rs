//! # zkreg-core: Foundational Types
//!
//! The leaf of the zkreg crate DAG. Defines the value type that flows
//! through the hash tree, the proof artifacts, and the contract call
//! parameters, plus the encoding rules that move those values across the
//! on-chain boundary.
//!
//! ## Key Design Principles
//!
//! 1. **`FieldElement` newtype.** Registry values, hashes, roots, and proof
//!    coordinates are all non-negative arbitrary-precision integers. No bare
//!    `String` or `u64` carries a field value between crates.
//!
//! 2. **One codec.** Every conversion to the on-chain 32-byte big-endian
//!    form goes through [`codec::encode_fixed_width`]. Values outside
//!    `[0, 2^256)` are rejected, never truncated.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] is UTC with seconds precision,
//!    used by deployment configs and submission records.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkreg-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod codec;
pub mod error;
pub mod field;
pub mod temporal;

pub use codec::{decode, encode_fixed_width, from_hex32, to_hex32, FIELD_WIDTH};
pub use error::{CodecError, TemporalError};
pub use field::{bn254_scalar_modulus, FieldElement};
pub use temporal::Timestamp;

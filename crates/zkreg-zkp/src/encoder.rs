//! # Submission Encoder
//!
//! Maps a [`ProofArtifact`] into the eleven named parameters of the
//! contract's `verify_non_membership` function, and the public signals
//! into the two parameters of `register_agent`.
//!
//! Every pairing coordinate and the two public field elements pass
//! through [`to_hex32`]: `0x` followed by exactly 64 hex digits. The
//! non-membership flag is passed as its raw decimal value (`"0"` or
//! `"1"`), since the contract takes it as a boolean-valued integer.
//!
//! Parameter order is fixed:
//! `a.x, a.y, b.x0, b.x1, b.y0, b.y1, c.x, c.y, root, candidateHash, isNonMember`.

use serde::{Deserialize, Serialize};
use zkreg_core::to_hex32;

use crate::artifact::{ProofArtifact, PublicSignals};
use crate::error::ArtifactError;

/// Arguments of `verify_non_membership`, in contract order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCallParams {
    pub proof_a_x: String,
    pub proof_a_y: String,
    pub proof_b_x0: String,
    pub proof_b_x1: String,
    pub proof_b_y0: String,
    pub proof_b_y1: String,
    pub proof_c_x: String,
    pub proof_c_y: String,
    pub public_root: String,
    pub public_agent_hash: String,
    /// Raw decimal flag, not hex.
    pub public_is_non_member: String,
}

impl ContractCallParams {
    /// Contract function these parameters are for.
    pub const FUNCTION: &'static str = "verify_non_membership";

    /// `(name, value)` pairs in contract parameter order.
    pub fn as_args(&self) -> [(&'static str, &str); 11] {
        [
            ("proof_a_x", self.proof_a_x.as_str()),
            ("proof_a_y", self.proof_a_y.as_str()),
            ("proof_b_x0", self.proof_b_x0.as_str()),
            ("proof_b_x1", self.proof_b_x1.as_str()),
            ("proof_b_y0", self.proof_b_y0.as_str()),
            ("proof_b_y1", self.proof_b_y1.as_str()),
            ("proof_c_x", self.proof_c_x.as_str()),
            ("proof_c_y", self.proof_c_y.as_str()),
            ("public_root", self.public_root.as_str()),
            ("public_agent_hash", self.public_agent_hash.as_str()),
            ("public_is_non_member", self.public_is_non_member.as_str()),
        ]
    }
}

/// Arguments of `register_agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationParams {
    pub agent_hash: String,
    pub merkle_root: String,
}

impl RegistrationParams {
    /// Contract function these parameters are for.
    pub const FUNCTION: &'static str = "register_agent";

    /// `(name, value)` pairs in contract parameter order.
    pub fn as_args(&self) -> [(&'static str, &str); 2] {
        [
            ("agent_hash", self.agent_hash.as_str()),
            ("merkle_root", self.merkle_root.as_str()),
        ]
    }
}

/// Encode a proof artifact for `verify_non_membership`.
pub fn encode_submission(artifact: &ProofArtifact) -> Result<ContractCallParams, ArtifactError> {
    let (a_x, a_y) = artifact.proof.a()?;
    let ((b_x0, b_x1), (b_y0, b_y1)) = artifact.proof.b()?;
    let (c_x, c_y) = artifact.proof.c()?;
    let signals = &artifact.public_signals;

    Ok(ContractCallParams {
        proof_a_x: to_hex32(a_x)?,
        proof_a_y: to_hex32(a_y)?,
        proof_b_x0: to_hex32(b_x0)?,
        proof_b_x1: to_hex32(b_x1)?,
        proof_b_y0: to_hex32(b_y0)?,
        proof_b_y1: to_hex32(b_y1)?,
        proof_c_x: to_hex32(c_x)?,
        proof_c_y: to_hex32(c_y)?,
        public_root: to_hex32(&signals.root)?,
        public_agent_hash: to_hex32(&signals.candidate_hash)?,
        public_is_non_member: signals.is_non_member.to_decimal(),
    })
}

/// Encode public signals for `register_agent`.
pub fn encode_registration(signals: &PublicSignals) -> Result<RegistrationParams, ArtifactError> {
    Ok(RegistrationParams {
        agent_hash: to_hex32(&signals.candidate_hash)?,
        merkle_root: to_hex32(&signals.root)?,
    })
}

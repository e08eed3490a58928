//! # Proof Artifact and Witness Errors

use thiserror::Error;
use zkreg_core::CodecError;
use zkreg_crypto::TreeError;

/// Errors from assembling a non-membership witness.
#[derive(Error, Debug)]
pub enum WitnessError {
    /// Every slot is occupied; no empty slot can anchor the proof.
    #[error("registry is full ({capacity} slots occupied); rebuild with more levels")]
    RegistryFull {
        /// Number of slots in the tree.
        capacity: usize,
    },

    /// The candidate's hash is already stored in the registry.
    #[error("candidate {hash} is already a registry member; no non-membership proof exists")]
    AlreadyMember {
        /// Decimal form of the candidate's leaf hash.
        hash: String,
    },

    /// The underlying tree operation failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors from reading or encoding proof artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// The artifact does not have the expected shape.
    #[error("malformed {artifact} artifact: {reason}")]
    Malformed {
        /// Which artifact (`proof`, `public signals`, ...).
        artifact: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A field value could not be encoded for the contract call.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The artifact JSON could not be parsed.
    #[error("artifact JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_full_names_the_capacity() {
        let msg = WitnessError::RegistryFull { capacity: 256 }.to_string();
        assert!(msg.contains("256"));
        assert!(msg.contains("more levels"));
    }

    #[test]
    fn malformed_names_the_artifact() {
        let err = ArtifactError::Malformed {
            artifact: "proof",
            reason: "pi_a has 1 entry".into(),
        };
        assert_eq!(err.to_string(), "malformed proof artifact: pi_a has 1 entry");
    }
}

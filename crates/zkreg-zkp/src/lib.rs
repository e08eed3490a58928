//! # zkreg-zkp: Non-Membership Proof Lifecycle Types
//!
//! Everything between a built registry tree and a contract call.
//!
//! ## Architecture
//!
//! - **Witness** (`witness.rs`): anchors a non-membership claim at the
//!   lowest empty slot of a built tree and shapes it as circuit input.
//!
//! - **Artifacts** (`artifact.rs`): compiled circuit, trusted-setup keys,
//!   and the Groth16 proof with its three public signals, in the JSON form
//!   snarkjs reads and writes.
//!
//! - **Encoder** (`encoder.rs`): maps a proof artifact to the eleven
//!   fixed-width hex parameters of `verify_non_membership`, and public
//!   signals to the two parameters of `register_agent`.
//!
//! - **Deployment** (`deployment.rs`): the deployed contract's identity
//!   and the records the submit and register stages persist.
//!
//! - **Traits** (`traits.rs`): the `ProofBackend` strategy, one method per
//!   stage that needs circom, snarkjs, or the chain.
//!
//! - **Mock** (`mock.rs`, feature `mock`): a deterministic backend for
//!   tests. Provides no zero-knowledge or soundness guarantees.
//!
//! ## Crate Policy
//!
//! - Depends on `zkreg-core` and `zkreg-crypto` internally.
//! - No process spawning here; external tools live behind `ProofBackend`.

pub mod artifact;
pub mod deployment;
pub mod encoder;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;
pub mod witness;

pub use artifact::{CircuitArtifact, Groth16Proof, ProofArtifact, PublicSignals, SetupArtifact};
pub use deployment::{
    DeploymentConfig, RegistrationRecord, SubmissionRecord, SubmittedSignals, VerificationRecord,
};
pub use encoder::{encode_registration, encode_submission, ContractCallParams, RegistrationParams};
pub use error::{ArtifactError, WitnessError};
#[cfg(feature = "mock")]
pub use mock::MockBackend;
pub use traits::{BackendError, ProofBackend};
pub use witness::{build_non_membership_witness, seed_registry, Witness};

//! # Proof Backend Trait
//!
//! The strategy interface behind every lifecycle stage that needs heavy
//! cryptography or the chain: circuit compilation, trusted setup, proving,
//! local verification, on-chain verification, and registration.
//!
//! The production implementation shells out to `circom`, `snarkjs`, and
//! the `stellar` CLI. [`MockBackend`](crate::mock::MockBackend) returns
//! deterministic artifacts without any of them.
//!
//! ## Contract
//!
//! - Methods block until the collaborator returns. No retries.
//! - A collaborator that exits non-zero surfaces as
//!   [`BackendError::ExternalToolFailure`] with its captured output.
//! - `verify` and `submit` report a verdict as `Ok(bool)`; only a failure
//!   to obtain a verdict is an error.

use thiserror::Error;

use crate::artifact::{CircuitArtifact, ProofArtifact, SetupArtifact};
use crate::deployment::DeploymentConfig;
use crate::encoder::{ContractCallParams, RegistrationParams};
use crate::error::ArtifactError;
use crate::witness::Witness;

/// Error from a proof backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// An external tool exited unsuccessfully.
    #[error("`{tool}` failed ({status}); stderr: {stderr}")]
    ExternalToolFailure {
        /// The command line that was run.
        tool: String,
        /// Exit status description.
        status: String,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// A tool succeeded but its output could not be interpreted.
    #[error("unexpected output from {tool}: {reason}")]
    MalformedOutput {
        /// The tool whose output was rejected.
        tool: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A produced artifact was unreadable.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Filesystem or process spawn failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One method per lifecycle stage that needs an external collaborator.
pub trait ProofBackend: Send + Sync {
    /// Compile the circuit into a constraint system and witness calculator.
    fn compile(&self) -> Result<CircuitArtifact, BackendError>;

    /// Run the trusted setup for a compiled circuit.
    fn setup(&self, circuit: &CircuitArtifact) -> Result<SetupArtifact, BackendError>;

    /// Prove a witness with the setup's proving key.
    fn prove(
        &self,
        circuit: &CircuitArtifact,
        setup: &SetupArtifact,
        witness: &Witness,
    ) -> Result<ProofArtifact, BackendError>;

    /// Check a proof against the setup's verification key.
    fn verify(&self, setup: &SetupArtifact, proof: &ProofArtifact) -> Result<bool, BackendError>;

    /// Ask the deployed contract to verify encoded proof parameters.
    fn submit(
        &self,
        deployment: &DeploymentConfig,
        params: &ContractCallParams,
    ) -> Result<bool, BackendError>;

    /// Append a verified agent to the contract's registry. Returns the new
    /// root as reported by the contract.
    fn register(
        &self,
        deployment: &DeploymentConfig,
        params: &RegistrationParams,
    ) -> Result<String, BackendError>;
}

impl<T: ProofBackend + ?Sized> ProofBackend for &T {
    fn compile(&self) -> Result<CircuitArtifact, BackendError> {
        (**self).compile()
    }

    fn setup(&self, circuit: &CircuitArtifact) -> Result<SetupArtifact, BackendError> {
        (**self).setup(circuit)
    }

    fn prove(
        &self,
        circuit: &CircuitArtifact,
        setup: &SetupArtifact,
        witness: &Witness,
    ) -> Result<ProofArtifact, BackendError> {
        (**self).prove(circuit, setup, witness)
    }

    fn verify(&self, setup: &SetupArtifact, proof: &ProofArtifact) -> Result<bool, BackendError> {
        (**self).verify(setup, proof)
    }

    fn submit(
        &self,
        deployment: &DeploymentConfig,
        params: &ContractCallParams,
    ) -> Result<bool, BackendError> {
        (**self).submit(deployment, params)
    }

    fn register(
        &self,
        deployment: &DeploymentConfig,
        params: &RegistrationParams,
    ) -> Result<String, BackendError> {
        (**self).register(deployment, params)
    }
}

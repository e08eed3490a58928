//! # Pipeline Errors
//!
//! Every variant's message tells the operator what to run next.

use std::path::PathBuf;

use thiserror::Error;
use zkreg_zkp::{ArtifactError, BackendError, WitnessError};

use crate::stage::{ArtifactKey, Stage};

/// Errors from an artifact store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the artifact file failed.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stored artifact does not parse as its expected type.
    #[error("{key} is unreadable ({source}); re-run `zkreg {}`", key.producer().command())]
    Corrupt {
        key: ArtifactKey,
        #[source]
        source: serde_json::Error,
    },

    /// An artifact could not be serialized.
    #[error("cannot serialize {key}: {source}")]
    Serialize {
        key: ArtifactKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from running a lifecycle stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A stage was invoked before an earlier stage's artifacts exist.
    #[error(
        "cannot reach {stage}: {missing} artifacts are missing; run `zkreg {}` first",
        missing.command()
    )]
    MissingPrerequisiteArtifact {
        /// The stage that was invoked.
        stage: Stage,
        /// The earliest stage that has not been run.
        missing: Stage,
    },

    /// A verifier returned false. Nothing past this stage was attempted.
    #[error("{stage} verification returned false; {}", stage.recovery_hint())]
    VerificationFailed {
        /// `LocallyVerified` or `Submitted`.
        stage: Stage,
    },

    /// Submission or registration was requested without a deployed
    /// contract.
    #[error("no deployment config; deploy the verifier contract and write `deployment.json` before `zkreg submit`")]
    MissingDeploymentConfig,

    /// Building the witness failed.
    #[error(transparent)]
    Witness(#[from] WitnessError),

    /// The proof backend failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A proof artifact could not be encoded.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// The artifact store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

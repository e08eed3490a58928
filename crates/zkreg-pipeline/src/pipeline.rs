//! # Proof Lifecycle Pipeline
//!
//! Runs the stages of [`Stage`] against a [`ProofBackend`] and persists
//! each stage's output in an [`ArtifactStore`].
//!
//! ## Gating
//!
//! Before a stage runs, every earlier stage's artifacts must be present.
//! The earliest missing one is reported as
//! [`PipelineError::MissingPrerequisiteArtifact`] and nothing is written.
//! Once its gate passes, a stage discards its own artifacts and every
//! later stage's before running, so a record on file always describes
//! the proof currently on file.
//!
//! Submit and register also check that the record they rely on names the
//! same root and candidate hash as `public.json`. A mismatch is reported
//! as the earlier stage's artifact missing.
//!
//! ## Failure
//!
//! There are no retries. A stage persists its artifacts only on success,
//! with one exception: a submission persists its record whether the
//! contract accepted the proof or not. A false local verification halts
//! the run before anything is submitted.

use tracing::{debug, info, warn};
use zkreg_core::Timestamp;
use zkreg_crypto::{HashProvider, MerkleTree};
use zkreg_zkp::{
    build_non_membership_witness, encode_registration, encode_submission, CircuitArtifact,
    DeploymentConfig, Groth16Proof, ProofArtifact, ProofBackend, PublicSignals,
    RegistrationRecord, SetupArtifact, SubmissionRecord, VerificationRecord, Witness,
};

use crate::error::PipelineError;
use crate::stage::Stage;
use crate::store::{Artifact, ArtifactStore, ArtifactStoreExt};

/// Completion state of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStatus {
    pub stage: Stage,
    pub done: bool,
}

/// The lifecycle pipeline over a backend and a store.
#[derive(Debug)]
pub struct Pipeline<B, S> {
    backend: B,
    store: S,
    deployment: Option<DeploymentConfig>,
}

impl<B: ProofBackend, S: ArtifactStore> Pipeline<B, S> {
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            store,
            deployment: None,
        }
    }

    /// Attach the deployed contract used by `submit` and `register`.
    pub fn with_deployment(mut self, deployment: DeploymentConfig) -> Self {
        self.deployment = Some(deployment);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─── Gating ──────────────────────────────────────────────────────

    /// Whether every artifact of `stage` is present.
    pub fn is_done(&self, stage: Stage) -> Result<bool, PipelineError> {
        for key in stage.artifacts() {
            if !self.store.contains(*key)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fail unless every stage before `stage` is done.
    pub fn require(&self, stage: Stage) -> Result<(), PipelineError> {
        for prerequisite in stage.prerequisites() {
            if !self.is_done(*prerequisite)? {
                warn!(%stage, missing = %prerequisite, "prerequisite artifact missing");
                return Err(PipelineError::MissingPrerequisiteArtifact {
                    stage,
                    missing: *prerequisite,
                });
            }
        }
        Ok(())
    }

    /// Per-stage completion, in order.
    pub fn status(&self) -> Result<Vec<StageStatus>, PipelineError> {
        Stage::ALL
            .iter()
            .map(|&stage| {
                Ok(StageStatus {
                    stage,
                    done: self.is_done(stage)?,
                })
            })
            .collect()
    }

    /// The first stage not yet done, or `None` when registration is done.
    pub fn next_stage(&self) -> Result<Option<Stage>, PipelineError> {
        for stage in Stage::ALL {
            if !self.is_done(stage)? {
                return Ok(Some(stage));
            }
        }
        Ok(None)
    }

    /// Discard the artifacts of `stage` and every later stage.
    fn invalidate_from(&self, stage: Stage) -> Result<(), PipelineError> {
        for later in stage.and_later() {
            for key in later.artifacts() {
                if self.store.contains(*key)? {
                    debug!(artifact = %key, "discarding superseded artifact");
                    self.store.remove(*key)?;
                }
            }
        }
        Ok(())
    }

    fn load<T: Artifact>(&self, stage: Stage) -> Result<T, PipelineError> {
        self.store
            .load::<T>()?
            .ok_or(PipelineError::MissingPrerequisiteArtifact {
                stage,
                missing: T::KEY.producer(),
            })
    }

    fn load_proof(&self, stage: Stage) -> Result<ProofArtifact, PipelineError> {
        Ok(ProofArtifact {
            proof: self.load::<Groth16Proof>(stage)?,
            public_signals: self.load::<PublicSignals>(stage)?,
        })
    }

    fn deployment(&self) -> Result<&DeploymentConfig, PipelineError> {
        self.deployment
            .as_ref()
            .ok_or(PipelineError::MissingDeploymentConfig)
    }

    // ─── Stages ──────────────────────────────────────────────────────

    /// Compile the circuit.
    pub fn compile(&self) -> Result<CircuitArtifact, PipelineError> {
        info!(stage = %Stage::Compiled, "compiling circuit");
        self.invalidate_from(Stage::Compiled)?;
        let circuit = self.backend.compile()?;
        self.store.save(&circuit)?;
        info!(circuit = %circuit.circuit_name, constraints = ?circuit.constraints, "circuit compiled");
        Ok(circuit)
    }

    /// Run the trusted setup for the compiled circuit.
    pub fn setup(&self) -> Result<SetupArtifact, PipelineError> {
        self.require(Stage::SetupDone)?;
        let circuit: CircuitArtifact = self.load(Stage::SetupDone)?;
        info!(stage = %Stage::SetupDone, circuit = %circuit.circuit_name, "running trusted setup");
        self.invalidate_from(Stage::SetupDone)?;
        let setup = self.backend.setup(&circuit)?;
        self.store.save(&setup)?;
        info!(vk = %setup.verification_key_digest, "trusted setup complete");
        Ok(setup)
    }

    /// Build and persist the non-membership witness for `candidate`.
    pub fn witness<H: HashProvider>(
        &self,
        tree: &MerkleTree<H>,
        candidate: &str,
    ) -> Result<Witness, PipelineError> {
        self.require(Stage::WitnessReady)?;
        self.invalidate_from(Stage::WitnessReady)?;
        let witness = build_non_membership_witness(tree, candidate)?;
        self.store.save(&witness)?;
        info!(
            stage = %Stage::WitnessReady,
            slot = witness.slot_index(),
            root = %witness.root,
            "witness ready"
        );
        Ok(witness)
    }

    /// Prove the stored witness.
    pub fn prove(&self) -> Result<ProofArtifact, PipelineError> {
        self.require(Stage::ProofGenerated)?;
        let circuit: CircuitArtifact = self.load(Stage::ProofGenerated)?;
        let setup: SetupArtifact = self.load(Stage::ProofGenerated)?;
        let witness: Witness = self.load(Stage::ProofGenerated)?;

        info!(stage = %Stage::ProofGenerated, "generating proof");
        self.invalidate_from(Stage::ProofGenerated)?;
        let artifact = self.backend.prove(&circuit, &setup, &witness)?;
        self.store.save(&artifact.proof)?;
        self.store.save(&artifact.public_signals)?;
        info!(
            is_non_member = artifact.public_signals.is_non_member(),
            "proof generated"
        );
        Ok(artifact)
    }

    /// Witness then prove, in one step.
    pub fn generate<H: HashProvider>(
        &self,
        tree: &MerkleTree<H>,
        candidate: &str,
    ) -> Result<ProofArtifact, PipelineError> {
        self.witness(tree, candidate)?;
        self.prove()
    }

    /// Verify the stored proof against the setup's verification key.
    pub fn verify(&self) -> Result<VerificationRecord, PipelineError> {
        self.require(Stage::LocallyVerified)?;
        let setup: SetupArtifact = self.load(Stage::LocallyVerified)?;
        let artifact = self.load_proof(Stage::LocallyVerified)?;

        info!(stage = %Stage::LocallyVerified, "verifying proof locally");
        self.invalidate_from(Stage::LocallyVerified)?;
        if !self.backend.verify(&setup, &artifact)? {
            warn!("proof failed local verification");
            return Err(PipelineError::VerificationFailed {
                stage: Stage::LocallyVerified,
            });
        }

        let signals = &artifact.public_signals;
        let record = VerificationRecord {
            timestamp: Timestamp::now(),
            root: signals.root.clone(),
            agent_hash: signals.candidate_hash.clone(),
            is_non_member: signals.is_non_member(),
            verification_key_digest: setup.verification_key_digest,
        };
        self.store.save(&record)?;
        info!("proof verified locally");
        Ok(record)
    }

    /// Submit the verified proof to the deployed contract.
    ///
    /// The submission record is persisted whatever the verdict; a false
    /// verdict then fails with [`PipelineError::VerificationFailed`].
    pub fn submit(&self) -> Result<SubmissionRecord, PipelineError> {
        self.require(Stage::Submitted)?;
        let deployment = self.deployment()?;
        let artifact = self.load_proof(Stage::Submitted)?;
        let verification: VerificationRecord = self.load(Stage::Submitted)?;
        let signals = &artifact.public_signals;
        if verification.root != signals.root || verification.agent_hash != signals.candidate_hash {
            warn!("verification record describes a different proof");
            return Err(PipelineError::MissingPrerequisiteArtifact {
                stage: Stage::Submitted,
                missing: Stage::LocallyVerified,
            });
        }
        let params = encode_submission(&artifact)?;

        info!(
            stage = %Stage::Submitted,
            contract = %deployment.contract_id,
            network = %deployment.network,
            "submitting proof"
        );
        self.invalidate_from(Stage::Submitted)?;
        let verified = self.backend.submit(deployment, &params)?;
        let record = SubmissionRecord::new(deployment, &params, verified);
        self.store.save(&record)?;

        if !verified {
            warn!(contract = %deployment.contract_id, "contract rejected the proof");
            return Err(PipelineError::VerificationFailed {
                stage: Stage::Submitted,
            });
        }
        info!("proof verified on-chain");
        Ok(record)
    }

    /// Register the candidate after an accepted submission.
    pub fn register(&self) -> Result<RegistrationRecord, PipelineError> {
        self.require(Stage::Registered)?;
        let deployment = self.deployment()?;
        let submission: SubmissionRecord = self.load(Stage::Registered)?;
        if !submission.verified {
            warn!("last submission was rejected; refusing to register");
            return Err(PipelineError::VerificationFailed {
                stage: Stage::Submitted,
            });
        }

        let signals: PublicSignals = self.load(Stage::Registered)?;
        let params = encode_registration(&signals)?;
        let submitted = &submission.public_signals;
        if submitted.agent_hash != params.agent_hash || submitted.root != params.merkle_root {
            warn!(
                submitted = %submitted.agent_hash,
                current = %params.agent_hash,
                "submission record describes a different proof"
            );
            return Err(PipelineError::MissingPrerequisiteArtifact {
                stage: Stage::Registered,
                missing: Stage::Submitted,
            });
        }
        info!(stage = %Stage::Registered, agent = %params.agent_hash, "registering agent");
        self.invalidate_from(Stage::Registered)?;
        let new_root = self.backend.register(deployment, &params)?;
        let record = RegistrationRecord::new(deployment, &params, new_root);
        self.store.save(&record)?;
        info!(new_root = %record.new_root, "agent registered");
        Ok(record)
    }

    /// Every stage in order, stopping at the first failure.
    pub fn run_all<H: HashProvider>(
        &self,
        tree: &MerkleTree<H>,
        candidate: &str,
    ) -> Result<RegistrationRecord, PipelineError> {
        self.compile()?;
        self.setup()?;
        self.generate(tree, candidate)?;
        self.verify()?;
        self.submit()?;
        self.register()
    }
}

//! # Mock Proof Backend
//!
//! A deterministic, transparent stand-in for circom, snarkjs, and the
//! contract CLI. Lets the lifecycle pipeline run end-to-end in memory.
//!
//! ## How It Works
//!
//! - `setup()` fingerprints the circuit name as the "verification key".
//! - `prove()` publishes `[root, candidateHash, isNonMember]`, where the
//!   flag is `1` iff the candidate differs from the anchoring slot's value,
//!   and derives each of the eight proof coordinates as
//!   `SHA256(vk_digest || index || enc(root) || enc(candidate) || enc(flag))`.
//! - `verify()` recomputes the coordinates and compares.
//! - `submit()` accepts iff the flag is `1`.
//!
//! Verdicts can be forced to `false` to exercise failure paths. Every call
//! is recorded by stage name.
//!
//! ## Security Warning
//!
//! **NOT ZERO-KNOWLEDGE AND NOT SOUND.** Anyone can recompute these
//! proofs. Test use only.

use num_bigint::BigUint;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use zkreg_core::codec::encode_element;
use zkreg_core::FieldElement;

use crate::artifact::{CircuitArtifact, Groth16Proof, ProofArtifact, PublicSignals, SetupArtifact};
use crate::deployment::DeploymentConfig;
use crate::encoder::{ContractCallParams, RegistrationParams};
use crate::error::ArtifactError;
use crate::traits::{BackendError, ProofBackend};
use crate::witness::Witness;

/// Deterministic in-memory backend.
#[derive(Debug)]
pub struct MockBackend {
    local_verdict: bool,
    chain_verdict: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// A backend whose verifiers accept honest proofs.
    pub fn new() -> Self {
        Self {
            local_verdict: true,
            chain_verdict: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Force local verification to reject every proof.
    pub fn rejecting_locally(mut self) -> Self {
        self.local_verdict = false;
        self
    }

    /// Force the contract to reject every submission.
    pub fn rejecting_on_chain(mut self) -> Self {
        self.chain_verdict = false;
        self
    }

    /// Stage names of every call so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    fn record(&self, stage: &'static str) {
        self.calls.lock().push(stage);
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn coordinates(
    vk_digest: &str,
    signals: &PublicSignals,
) -> Result<[FieldElement; 8], ArtifactError> {
    let encoded = [
        encode_element(&signals.root)?,
        encode_element(&signals.candidate_hash)?,
        encode_element(&signals.is_non_member)?,
    ];
    let mut out: [FieldElement; 8] = Default::default();
    for (index, slot) in out.iter_mut().enumerate() {
        let mut hasher = Sha256::new();
        hasher.update(vk_digest.as_bytes());
        hasher.update([index as u8]);
        for e in &encoded {
            hasher.update(e);
        }
        *slot = FieldElement::new(BigUint::from_bytes_be(&hasher.finalize()));
    }
    Ok(out)
}

fn mock_proof(vk_digest: &str, signals: &PublicSignals) -> Result<Groth16Proof, ArtifactError> {
    let [ax, ay, bx0, bx1, by0, by1, cx, cy] = coordinates(vk_digest, signals)?;
    Ok(Groth16Proof::from_affine(
        [ax, ay],
        [[bx0, bx1], [by0, by1]],
        [cx, cy],
    ))
}

impl ProofBackend for MockBackend {
    fn compile(&self) -> Result<CircuitArtifact, BackendError> {
        self.record("compile");
        Ok(CircuitArtifact {
            circuit_name: "non_membership".to_string(),
            r1cs_path: "mock/non_membership.r1cs".to_string(),
            wasm_path: "mock/non_membership_js/non_membership.wasm".to_string(),
            constraints: None,
        })
    }

    fn setup(&self, circuit: &CircuitArtifact) -> Result<SetupArtifact, BackendError> {
        self.record("setup");
        let mut hasher = Sha256::new();
        hasher.update(b"zkreg-mock-vk:");
        hasher.update(circuit.circuit_name.as_bytes());
        Ok(SetupArtifact {
            proving_key_path: format!("mock/{}_final.zkey", circuit.circuit_name),
            verification_key_path: "mock/verification_key.json".to_string(),
            ptau_power: 14,
            verification_key_digest: hex(&hasher.finalize()),
        })
    }

    fn prove(
        &self,
        _circuit: &CircuitArtifact,
        setup: &SetupArtifact,
        witness: &Witness,
    ) -> Result<ProofArtifact, BackendError> {
        self.record("prove");
        let public_signals = PublicSignals {
            root: witness.root.clone(),
            candidate_hash: witness.candidate_hash.clone(),
            is_non_member: FieldElement::from_u64(u64::from(witness.claims_non_membership())),
        };
        let proof = mock_proof(&setup.verification_key_digest, &public_signals)?;
        Ok(ProofArtifact {
            proof,
            public_signals,
        })
    }

    fn verify(&self, setup: &SetupArtifact, proof: &ProofArtifact) -> Result<bool, BackendError> {
        self.record("verify");
        let expected = mock_proof(&setup.verification_key_digest, &proof.public_signals)?;
        let matches = expected.pi_a == proof.proof.pi_a.get(..2).unwrap_or_default()
            && expected.pi_b.as_slice() == proof.proof.pi_b.get(..2).unwrap_or_default()
            && expected.pi_c == proof.proof.pi_c.get(..2).unwrap_or_default();
        Ok(self.local_verdict && matches)
    }

    fn submit(
        &self,
        _deployment: &DeploymentConfig,
        params: &ContractCallParams,
    ) -> Result<bool, BackendError> {
        self.record("submit");
        Ok(self.chain_verdict && params.public_is_non_member == "1")
    }

    fn register(
        &self,
        _deployment: &DeploymentConfig,
        params: &RegistrationParams,
    ) -> Result<String, BackendError> {
        self.record("register");
        let mut hasher = Sha256::new();
        hasher.update(params.merkle_root.as_bytes());
        hasher.update(params.agent_hash.as_bytes());
        Ok(format!("0x{}", hex(&hasher.finalize())))
    }
}

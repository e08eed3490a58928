//! # Lifecycle Stages
//!
//! The seven stages a non-membership proof passes through, in strict
//! order:
//!
//! ```text
//! Compiled ─▶ SetupDone ─▶ WitnessReady ─▶ ProofGenerated
//!     ─▶ LocallyVerified ─▶ Submitted ─▶ Registered
//! ```
//!
//! Each stage runs as its own process invocation and is considered done
//! when its artifacts exist in the store. A stage may run only when every
//! earlier stage is done. Re-running a stage discards its own output and
//! every later stage's, since those were derived from what it replaces.

use serde::{Deserialize, Serialize};

// ─── Stages ──────────────────────────────────────────────────────────

static ORDER: [Stage; 7] = Stage::ALL;

/// A lifecycle stage, named by the state reached when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Stage {
    /// Constraint system and witness calculator exist.
    Compiled = 1,
    /// Proving and verification keys exist.
    SetupDone = 2,
    /// Circuit input for one candidate exists.
    WitnessReady = 3,
    /// Proof and public signals exist.
    ProofGenerated = 4,
    /// The proof passed local verification.
    LocallyVerified = 5,
    /// The contract returned a verdict on the proof.
    Submitted = 6,
    /// The candidate was appended to the on-chain registry.
    Registered = 7,
}

impl Stage {
    /// Every stage, in order.
    pub const ALL: [Stage; 7] = [
        Stage::Compiled,
        Stage::SetupDone,
        Stage::WitnessReady,
        Stage::ProofGenerated,
        Stage::LocallyVerified,
        Stage::Submitted,
        Stage::Registered,
    ];

    /// Position in the lifecycle, 1-based.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// This stage and every stage after it.
    pub fn and_later(&self) -> &'static [Stage] {
        &ORDER[usize::from(self.number()) - 1..]
    }

    /// The stage after this one, if any.
    pub fn next(&self) -> Option<Stage> {
        Self::ALL.get(self.number() as usize).copied()
    }

    /// Every stage that must be done before this one can run, earliest
    /// first.
    pub fn prerequisites(&self) -> &'static [Stage] {
        &ORDER[..(self.number() - 1) as usize]
    }

    /// The `zkreg` subcommand that produces this stage's artifacts.
    pub fn command(&self) -> &'static str {
        match self {
            Self::Compiled => "compile",
            Self::SetupDone => "setup",
            Self::WitnessReady => "witness",
            Self::ProofGenerated => "prove",
            Self::LocallyVerified => "verify",
            Self::Submitted => "submit",
            Self::Registered => "register",
        }
    }

    /// Artifacts whose presence marks this stage done.
    pub fn artifacts(&self) -> &'static [ArtifactKey] {
        match self {
            Self::Compiled => &[ArtifactKey::Circuit],
            Self::SetupDone => &[ArtifactKey::Setup],
            Self::WitnessReady => &[ArtifactKey::Witness],
            Self::ProofGenerated => &[ArtifactKey::Proof, ArtifactKey::PublicSignals],
            Self::LocallyVerified => &[ArtifactKey::Verification],
            Self::Submitted => &[ArtifactKey::Submission],
            Self::Registered => &[ArtifactKey::Registration],
        }
    }

    /// What to run after this stage fails with a false verdict.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::LocallyVerified => {
                "regenerate the proof with `zkreg generate` (or re-run `zkreg setup` if the keys changed)"
            }
            Self::Submitted => {
                "check that the deployed contract uses the current verification key, then re-run `zkreg submit`"
            }
            _ => "re-run the stage",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Compiled => "COMPILED",
            Self::SetupDone => "SETUP_DONE",
            Self::WitnessReady => "WITNESS_READY",
            Self::ProofGenerated => "PROOF_GENERATED",
            Self::LocallyVerified => "LOCALLY_VERIFIED",
            Self::Submitted => "SUBMITTED",
            Self::Registered => "REGISTERED",
        };
        f.write_str(s)
    }
}

// ─── Artifact Keys ───────────────────────────────────────────────────

/// A persisted artifact. Each maps to one JSON file in the build
/// directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArtifactKey {
    Circuit,
    Setup,
    Witness,
    Proof,
    PublicSignals,
    Verification,
    Submission,
    Registration,
}

impl ArtifactKey {
    /// File name under the build directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Circuit => "circuit.json",
            Self::Setup => "setup.json",
            Self::Witness => "input.json",
            Self::Proof => "proof.json",
            Self::PublicSignals => "public.json",
            Self::Verification => "verification.json",
            Self::Submission => "submission_record.json",
            Self::Registration => "registration.json",
        }
    }

    /// The stage that writes this artifact.
    pub fn producer(&self) -> Stage {
        match self {
            Self::Circuit => Stage::Compiled,
            Self::Setup => Stage::SetupDone,
            Self::Witness => Stage::WitnessReady,
            Self::Proof | Self::PublicSignals => Stage::ProofGenerated,
            Self::Verification => Stage::LocallyVerified,
            Self::Submission => Stage::Submitted,
            Self::Registration => Stage::Registered,
        }
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

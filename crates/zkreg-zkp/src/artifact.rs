//! # Pipeline Artifacts
//!
//! The typed values handed between lifecycle stages.
//!
//! - [`CircuitArtifact`]: where the compiled constraint system and witness
//!   calculator live.
//! - [`SetupArtifact`]: where the proving and verification keys live, plus
//!   a fingerprint of the verification key.
//! - [`ProofArtifact`]: a Groth16 proof and its three public signals.
//!
//! ## Proof Wire Form
//!
//! `proof.json` is the snarkjs object: `pi_a`, `pi_b`, `pi_c` (decimal
//! strings), `protocol`, `curve`. snarkjs writes projective coordinates
//! (`pi_a`/`pi_c` of length 3, `pi_b` of 3 rows of 2); only the affine
//! prefix is consumed. `public.json` is a JSON array of exactly three
//! decimal strings `[root, candidateHash, isNonMember]`.

use serde::{Deserialize, Serialize};
use zkreg_core::FieldElement;

use crate::error::ArtifactError;

/// Output of the compile stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitArtifact {
    /// Circuit name (stem of the generated files).
    pub circuit_name: String,
    /// Path of the compiled R1CS constraint system.
    pub r1cs_path: String,
    /// Path of the WASM witness calculator.
    pub wasm_path: String,
    /// Constraint count, when the compiler reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<u64>,
}

/// Output of the trusted-setup stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupArtifact {
    /// Path of the final proving key (`.zkey`).
    pub proving_key_path: String,
    /// Path of the exported verification key (JSON).
    pub verification_key_path: String,
    /// Powers-of-tau exponent the ceremony ran with.
    pub ptau_power: u32,
    /// Hex SHA-256 of the verification key contents.
    pub verification_key_digest: String,
}

/// A Groth16 proof as written by snarkjs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    /// Point A (G1).
    pub pi_a: Vec<FieldElement>,
    /// Point B (G2): rows of coordinate pairs.
    pub pi_b: Vec<Vec<FieldElement>>,
    /// Point C (G1).
    pub pi_c: Vec<FieldElement>,
    /// Proof system tag, `groth16`.
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Curve tag, `bn128`.
    #[serde(default = "default_curve")]
    pub curve: String,
}

fn default_protocol() -> String {
    "groth16".to_string()
}

fn default_curve() -> String {
    "bn128".to_string()
}

impl Groth16Proof {
    /// A proof from affine coordinates with the default tags.
    pub fn from_affine(
        a: [FieldElement; 2],
        b: [[FieldElement; 2]; 2],
        c: [FieldElement; 2],
    ) -> Self {
        Self {
            pi_a: a.into(),
            pi_b: b.into_iter().map(Vec::from).collect(),
            pi_c: c.into(),
            protocol: default_protocol(),
            curve: default_curve(),
        }
    }

    /// Affine `(x, y)` of point A.
    pub fn a(&self) -> Result<(&FieldElement, &FieldElement), ArtifactError> {
        affine_pair("pi_a", &self.pi_a)
    }

    /// Affine `((x0, x1), (y0, y1))` of point B.
    #[allow(clippy::type_complexity)]
    pub fn b(
        &self,
    ) -> Result<((&FieldElement, &FieldElement), (&FieldElement, &FieldElement)), ArtifactError>
    {
        match self.pi_b.as_slice() {
            [x, y, ..] => Ok((affine_pair("pi_b[0]", x)?, affine_pair("pi_b[1]", y)?)),
            rows => Err(ArtifactError::Malformed {
                artifact: "proof",
                reason: format!("pi_b has {} rows, expected at least 2", rows.len()),
            }),
        }
    }

    /// Affine `(x, y)` of point C.
    pub fn c(&self) -> Result<(&FieldElement, &FieldElement), ArtifactError> {
        affine_pair("pi_c", &self.pi_c)
    }
}

fn affine_pair<'a>(
    name: &str,
    coords: &'a [FieldElement],
) -> Result<(&'a FieldElement, &'a FieldElement), ArtifactError> {
    match coords {
        [x, y, ..] => Ok((x, y)),
        _ => Err(ArtifactError::Malformed {
            artifact: "proof",
            reason: format!("{name} has {} entries, expected at least 2", coords.len()),
        }),
    }
}

/// The three public signals, in circuit output order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldElement>", into = "Vec<FieldElement>")]
pub struct PublicSignals {
    /// Registry root the proof was made against.
    pub root: FieldElement,
    /// Leaf hash of the candidate.
    pub candidate_hash: FieldElement,
    /// `1` if the circuit found the candidate absent, else `0`.
    pub is_non_member: FieldElement,
}

impl PublicSignals {
    /// Whether the non-membership flag is set.
    pub fn is_non_member(&self) -> bool {
        self.is_non_member == FieldElement::from_u64(1)
    }

    /// Parse from the decimal strings found in `public.json`.
    pub fn from_decimals<S: AsRef<str>>(values: &[S]) -> Result<Self, ArtifactError> {
        let elements = values
            .iter()
            .map(|v| FieldElement::from_decimal(v.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::try_from(elements)
    }
}

impl TryFrom<Vec<FieldElement>> for PublicSignals {
    type Error = ArtifactError;

    fn try_from(values: Vec<FieldElement>) -> Result<Self, Self::Error> {
        let len = values.len();
        match <[FieldElement; 3]>::try_from(values) {
            Ok([root, candidate_hash, is_non_member]) => Ok(Self {
                root,
                candidate_hash,
                is_non_member,
            }),
            Err(_) => Err(ArtifactError::Malformed {
                artifact: "public signals",
                reason: format!("expected exactly 3 signals, got {len}"),
            }),
        }
    }
}

impl From<PublicSignals> for Vec<FieldElement> {
    fn from(signals: PublicSignals) -> Self {
        vec![signals.root, signals.candidate_hash, signals.is_non_member]
    }
}

/// Output of the prove stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifact {
    /// The Groth16 proof.
    pub proof: Groth16Proof,
    /// Its public signals.
    pub public_signals: PublicSignals,
}

impl ProofArtifact {
    /// Parse from the two snarkjs output files.
    pub fn from_snarkjs_json(proof_json: &str, public_json: &str) -> Result<Self, ArtifactError> {
        let proof: Groth16Proof = serde_json::from_str(proof_json)?;
        let public_signals: PublicSignals = serde_json::from_str(public_json)?;
        // Fail on short coordinates here rather than at submission.
        proof.a()?;
        proof.b()?;
        proof.c()?;
        Ok(Self {
            proof,
            public_signals,
        })
    }
}

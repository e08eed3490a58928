//! # Deployment Config and Stage Records
//!
//! JSON documents the submit and register stages read and write.
//!
//! - [`DeploymentConfig`]: identifies the on-chain verifier. Written once
//!   by the deploy step, read by submit and register.
//! - [`VerificationRecord`]: outcome of a successful local verification.
//! - [`SubmissionRecord`]: outcome of one on-chain verification attempt,
//!   written whether the contract accepted the proof or not.
//! - [`RegistrationRecord`]: outcome of `register_agent`.
//!
//! All keys are camelCase; timestamps are ISO-8601 UTC.

use serde::{Deserialize, Serialize};
use zkreg_core::{FieldElement, Timestamp};

use crate::encoder::{ContractCallParams, RegistrationParams};

/// Identity of the deployed verifier contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub contract_id: String,
    pub network: String,
    pub rpc_url: String,
    pub deployed_at: Timestamp,
}

/// Public signals echoed into a submission record, in their encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedSignals {
    pub root: String,
    pub agent_hash: String,
    pub is_non_member: String,
}

/// One on-chain verification attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub timestamp: Timestamp,
    pub contract_id: String,
    /// Encoded candidate hash the proof was about.
    pub proof_hash: String,
    /// The contract's verdict.
    pub verified: bool,
    pub public_signals: SubmittedSignals,
}

impl SubmissionRecord {
    /// Record the contract's verdict on `params`, stamped now.
    pub fn new(deployment: &DeploymentConfig, params: &ContractCallParams, verified: bool) -> Self {
        Self {
            timestamp: Timestamp::now(),
            contract_id: deployment.contract_id.clone(),
            proof_hash: params.public_agent_hash.clone(),
            verified,
            public_signals: SubmittedSignals {
                root: params.public_root.clone(),
                agent_hash: params.public_agent_hash.clone(),
                is_non_member: params.public_is_non_member.clone(),
            },
        }
    }
}

/// A passed local verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub timestamp: Timestamp,
    pub root: FieldElement,
    pub agent_hash: FieldElement,
    pub is_non_member: bool,
    /// Digest of the verification key the proof was checked against.
    pub verification_key_digest: String,
}

/// A completed `register_agent` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    pub timestamp: Timestamp,
    pub contract_id: String,
    pub agent_hash: String,
    pub merkle_root: String,
    /// Root the contract reported after appending the agent.
    pub new_root: String,
}

impl RegistrationRecord {
    /// Record a registration, stamped now.
    pub fn new(deployment: &DeploymentConfig, params: &RegistrationParams, new_root: String) -> Self {
        Self {
            timestamp: Timestamp::now(),
            contract_id: deployment.contract_id.clone(),
            agent_hash: params.agent_hash.clone(),
            merkle_root: params.merkle_root.clone(),
            new_root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployment() -> DeploymentConfig {
        serde_json::from_str(
            r#"{
                "contractId": "CDLZFC3SYJYDZT7K67VZ75HPJVIEUVNIXF47ZG2FB2RMQQVU2HHGCYSC",
                "network": "testnet",
                "rpcUrl": "https://soroban-testnet.stellar.org",
                "deployedAt": "2025-01-15T10:30:00Z"
            }"#,
        )
        .unwrap()
    }

    fn params() -> ContractCallParams {
        let hex = |n: u64| format!("0x{n:064x}");
        ContractCallParams {
            proof_a_x: hex(1),
            proof_a_y: hex(2),
            proof_b_x0: hex(3),
            proof_b_x1: hex(4),
            proof_b_y0: hex(5),
            proof_b_y1: hex(6),
            proof_c_x: hex(7),
            proof_c_y: hex(8),
            public_root: hex(123),
            public_agent_hash: hex(456),
            public_is_non_member: "1".into(),
        }
    }

    #[test]
    fn deployment_config_parses_camel_case() {
        let d = deployment();
        assert_eq!(d.network, "testnet");
        assert_eq!(d.deployed_at.to_iso8601(), "2025-01-15T10:30:00Z");
    }

    #[test]
    fn submission_record_echoes_signals() {
        let record = SubmissionRecord::new(&deployment(), &params(), false);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["verified"], false);
        assert_eq!(json["proofHash"], json["publicSignals"]["agentHash"]);
        assert_eq!(json["publicSignals"]["isNonMember"], "1");
        assert!(json["contractId"].as_str().unwrap().starts_with("CDLZ"));
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn registration_record_keeps_new_root() {
        let reg = RegistrationParams {
            agent_hash: "0xaa".into(),
            merkle_root: "0xbb".into(),
        };
        let record = RegistrationRecord::new(&deployment(), &reg, "0xcc".into());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["newRoot"], "0xcc");
        assert_eq!(json["merkleRoot"], "0xbb");
    }
}

//! Stage resumption across separate pipeline instances sharing one build
//! directory, the way separate `zkreg` invocations do.

use zkreg_core::Timestamp;
use zkreg_crypto::{MerkleTree, Sha256FieldHasher};
use zkreg_pipeline::{ArtifactKey, FsArtifactStore, Pipeline, PipelineError, Stage};
use zkreg_zkp::{seed_registry, DeploymentConfig, MockBackend};

const EXISTING: [&str; 3] = [
    "AI Assistant for Customer Support - Handles common queries",
    "Code Review Bot - Analyzes pull requests for best practices",
    "Data Analysis Agent - Processes CSV files and generates insights",
];
const CANDIDATE: &str = "Marketing Content Generator - Creates social media posts";

fn tree() -> MerkleTree<Sha256FieldHasher> {
    seed_registry(8, Sha256FieldHasher, &EXISTING).unwrap()
}

fn deployment() -> DeploymentConfig {
    DeploymentConfig {
        contract_id: "CMOCK".into(),
        network: "local".into(),
        rpc_url: "http://localhost:8000".into(),
        deployed_at: Timestamp::now(),
    }
}

fn invocation(dir: &std::path::Path) -> Pipeline<MockBackend, FsArtifactStore> {
    Pipeline::new(MockBackend::new(), FsArtifactStore::new(dir)).with_deployment(deployment())
}

#[test]
fn generate_without_setup_creates_no_proof_file() {
    let dir = tempfile::tempdir().unwrap();
    invocation(dir.path()).compile().unwrap();

    let err = invocation(dir.path())
        .generate(&tree(), CANDIDATE)
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingPrerequisiteArtifact {
            missing: Stage::SetupDone,
            ..
        }
    ));
    assert!(!dir.path().join(ArtifactKey::Proof.file_name()).exists());
    assert!(!dir.path().join(ArtifactKey::PublicSignals.file_name()).exists());
    assert!(!dir.path().join(ArtifactKey::Witness.file_name()).exists());
}

#[test]
fn stages_resume_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    invocation(dir.path()).compile().unwrap();
    invocation(dir.path()).setup().unwrap();
    invocation(dir.path()).generate(&tree(), CANDIDATE).unwrap();
    invocation(dir.path()).verify().unwrap();
    let submission = invocation(dir.path()).submit().unwrap();
    assert!(submission.verified);
    invocation(dir.path()).register().unwrap();

    for key in [
        "circuit.json",
        "setup.json",
        "input.json",
        "proof.json",
        "public.json",
        "verification.json",
        "submission_record.json",
        "registration.json",
    ] {
        assert!(dir.path().join(key).is_file(), "{key} missing");
    }

    let input: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("input.json")).unwrap()).unwrap();
    assert_eq!(input["pathIndices"].as_array().unwrap().len(), 8);

    let record: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("submission_record.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(record["verified"], true);
    assert_eq!(record["publicSignals"]["isNonMember"], "1");
    assert_eq!(record["contractId"], "CMOCK");

    assert_eq!(invocation(dir.path()).next_stage().unwrap(), None);
}

#[test]
fn on_chain_rejection_writes_record_then_fails() {
    let dir = tempfile::tempdir().unwrap();
    let p = invocation(dir.path());
    p.compile().unwrap();
    p.setup().unwrap();
    p.generate(&tree(), CANDIDATE).unwrap();
    p.verify().unwrap();

    let rejecting = Pipeline::new(
        MockBackend::new().rejecting_on_chain(),
        FsArtifactStore::new(dir.path()),
    )
    .with_deployment(deployment());
    assert!(rejecting.submit().is_err());

    let record: serde_json::Value = serde_json::from_slice(
        &std::fs::read(dir.path().join("submission_record.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(record["verified"], false);
}

#[test]
fn replacement_proof_must_be_verified_before_submission() {
    let dir = tempfile::tempdir().unwrap();
    invocation(dir.path()).run_all(&tree(), CANDIDATE).unwrap();
    assert!(dir.path().join("registration.json").is_file());

    let rejecting = Pipeline::new(
        MockBackend::new().rejecting_locally(),
        FsArtifactStore::new(dir.path()),
    )
    .with_deployment(deployment());
    rejecting.generate(&tree(), "Translation Agent - Localizes documentation").unwrap();
    for stale in [
        "verification.json",
        "submission_record.json",
        "registration.json",
    ] {
        assert!(!dir.path().join(stale).exists(), "{stale} survived regeneration");
    }
    assert!(rejecting.verify().is_err());
    assert!(!dir.path().join("verification.json").exists());

    for err in [
        invocation(dir.path()).submit().unwrap_err(),
        invocation(dir.path()).register().unwrap_err(),
    ] {
        assert!(matches!(
            err,
            PipelineError::MissingPrerequisiteArtifact {
                missing: Stage::LocallyVerified,
                ..
            }
        ));
    }
    assert!(!dir.path().join("submission_record.json").exists());
}

#[test]
fn submission_record_must_match_public_signals() {
    let dir = tempfile::tempdir().unwrap();
    let p = invocation(dir.path());
    p.compile().unwrap();
    p.setup().unwrap();
    p.generate(&tree(), CANDIDATE).unwrap();
    p.verify().unwrap();
    p.submit().unwrap();

    // A hand-edited public.json no longer matches what was submitted.
    std::fs::write(
        dir.path().join(ArtifactKey::PublicSignals.file_name()),
        r#"["1", "2", "1"]"#,
    )
    .unwrap();
    let err = invocation(dir.path()).register().unwrap_err();
    assert!(matches!(
        err,
        PipelineError::MissingPrerequisiteArtifact {
            stage: Stage::Registered,
            missing: Stage::Submitted,
        }
    ));
    assert!(!dir.path().join("registration.json").exists());
}

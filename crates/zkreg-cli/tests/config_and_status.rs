//! The CLI's library surface driven from a `zkreg.yaml` on disk, without
//! the external toolchain: config loading, status reporting, and the
//! witness stage (which runs entirely in-process).

use zkreg_cli::commands::{open_pipeline, registry_tree, run_status, run_witness, CandidateArgs};
use zkreg_cli::config::ZkregConfig;
use zkreg_pipeline::{ArtifactStoreExt, FsArtifactStore, PipelineError, Stage};
use zkreg_zkp::{CircuitArtifact, SetupArtifact, Witness};

const CONFIG: &str = "\
build_dir: out
config_dir: conf
levels: 3
registry:
  - AI Assistant for Customer Support - Handles common queries
  - Code Review Bot - Analyzes pull requests for best practices
  - Data Analysis Agent - Processes CSV files and generates insights
";

fn write_config(dir: &std::path::Path) -> ZkregConfig {
    let path = dir.join("zkreg.yaml");
    std::fs::write(&path, CONFIG).unwrap();
    ZkregConfig::load(Some(&path)).unwrap()
}

#[test]
fn status_reports_fresh_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    assert_eq!(config.build_dir, dir.path().join("out"));
    assert_eq!(run_status(&config).unwrap(), 0);

    let pipeline = open_pipeline(&config).unwrap();
    assert_eq!(pipeline.next_stage().unwrap(), Some(Stage::Compiled));
}

#[test]
fn witness_after_recorded_setup() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let store = FsArtifactStore::new(&config.build_dir);
    store
        .save(&CircuitArtifact {
            circuit_name: "non_membership".into(),
            r1cs_path: "out/non_membership.r1cs".into(),
            wasm_path: "out/non_membership_js/non_membership.wasm".into(),
            constraints: None,
        })
        .unwrap();
    store
        .save(&SetupArtifact {
            proving_key_path: "out/non_membership_final.zkey".into(),
            verification_key_path: "out/verification_key.json".into(),
            ptau_power: 14,
            verification_key_digest: "ab".repeat(32),
        })
        .unwrap();

    let args = CandidateArgs {
        description: "Marketing Content Generator - Creates social media posts".into(),
    };
    assert_eq!(run_witness(&args, &config).unwrap(), 0);

    let witness: Witness = store.load().unwrap().unwrap();
    assert_eq!(witness.slot_index(), 3);
    assert_eq!(witness.path_indices, vec![1, 1, 0]);
    assert_eq!(witness.root, registry_tree(&config).unwrap().root().unwrap());

    let pipeline = open_pipeline(&config).unwrap();
    assert_eq!(pipeline.next_stage().unwrap(), Some(Stage::ProofGenerated));
}

#[test]
fn submit_without_deployment_config_names_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    assert!(config.load_deployment().unwrap().is_none());

    let err = open_pipeline(&config).unwrap().submit().unwrap_err();
    assert!(matches!(err, PipelineError::MissingPrerequisiteArtifact { .. }));
}

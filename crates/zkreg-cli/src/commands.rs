//! # Stage Commands
//!
//! One handler per lifecycle stage. Each invocation opens the build
//! directory fresh, runs its stage if the earlier stages' artifacts are
//! present, and returns a process exit code.
//!
//! ## Commands
//!
//! - `zkreg compile` / `setup` / `prove` / `verify` / `submit` / `register`
//!   run a single stage.
//! - `zkreg witness --description <text>` builds the circuit input only.
//! - `zkreg generate --description <text>` builds the witness and proves it.
//! - `zkreg run --description <text>` runs every stage in order.
//! - `zkreg status` lists which stages are done and what to run next.

use anyhow::{Context, Result};
use clap::Args;

use zkreg_core::to_hex32;
use zkreg_crypto::{CircomPoseidon, MerkleTree};
use zkreg_pipeline::{FsArtifactStore, Pipeline};
use zkreg_zkp::seed_registry;

use crate::config::ZkregConfig;
use crate::external::CommandBackend;

/// The pipeline every command runs against.
pub type CliPipeline = Pipeline<CommandBackend, FsArtifactStore>;

/// Arguments for commands that take a candidate description.
#[derive(Args, Debug)]
pub struct CandidateArgs {
    /// Description of the item to prove absent from the registry.
    #[arg(long, short)]
    pub description: String,
}

/// Open the build directory named by `config`, attaching the deployment
/// config when one exists.
pub fn open_pipeline(config: &ZkregConfig) -> Result<CliPipeline> {
    let pipeline = Pipeline::new(
        CommandBackend::new(config.clone()),
        FsArtifactStore::new(&config.build_dir),
    );
    Ok(match config.load_deployment()? {
        Some(deployment) => {
            tracing::debug!(contract = %deployment.contract_id, "deployment config loaded");
            pipeline.with_deployment(deployment)
        }
        None => pipeline,
    })
}

/// The Poseidon registry tree seeded from the configured descriptions.
pub fn registry_tree(config: &ZkregConfig) -> Result<MerkleTree<CircomPoseidon>> {
    let hasher = CircomPoseidon::load().context("failed to load Poseidon parameters")?;
    let tree = seed_registry(config.levels, hasher, &config.registry)
        .context("failed to seed registry tree")?;
    tracing::debug!(
        levels = config.levels,
        occupied = config.registry.len(),
        "registry tree built"
    );
    Ok(tree)
}

// ─── Single stages ───────────────────────────────────────────────────

pub fn run_compile(config: &ZkregConfig) -> Result<u8> {
    let circuit = open_pipeline(config)?.compile()?;
    println!("circuit compiled: {}", circuit.circuit_name);
    println!("  r1cs:        {}", circuit.r1cs_path);
    println!("  wasm:        {}", circuit.wasm_path);
    if let Some(n) = circuit.constraints {
        println!("  constraints: {n}");
    }
    Ok(0)
}

pub fn run_setup(config: &ZkregConfig) -> Result<u8> {
    let setup = open_pipeline(config)?.setup()?;
    println!("trusted setup complete (2^{} powers of tau)", setup.ptau_power);
    println!("  proving key:      {}", setup.proving_key_path);
    println!("  verification key: {}", setup.verification_key_path);
    Ok(0)
}

pub fn run_witness(args: &CandidateArgs, config: &ZkregConfig) -> Result<u8> {
    let pipeline = open_pipeline(config)?;
    let tree = registry_tree(config)?;
    let witness = pipeline.witness(&tree, &args.description)?;
    println!("witness ready (slot {})", witness.slot_index());
    println!("  root:           {}", to_hex32(&witness.root)?);
    println!("  candidate hash: {}", to_hex32(&witness.candidate_hash)?);
    Ok(0)
}

pub fn run_prove(config: &ZkregConfig) -> Result<u8> {
    let artifact = open_pipeline(config)?.prove()?;
    print_proof_outcome(artifact.public_signals.is_non_member());
    Ok(0)
}

pub fn run_generate(args: &CandidateArgs, config: &ZkregConfig) -> Result<u8> {
    let pipeline = open_pipeline(config)?;
    let tree = registry_tree(config)?;
    let artifact = pipeline.generate(&tree, &args.description)?;
    print_proof_outcome(artifact.public_signals.is_non_member());
    Ok(0)
}

pub fn run_verify(config: &ZkregConfig) -> Result<u8> {
    let record = open_pipeline(config)?.verify()?;
    println!("proof verified locally");
    println!("  root:        {}", to_hex32(&record.root)?);
    println!("  agent hash:  {}", to_hex32(&record.agent_hash)?);
    println!("  non-member:  {}", record.is_non_member);
    Ok(0)
}

pub fn run_submit(config: &ZkregConfig) -> Result<u8> {
    let record = open_pipeline(config)?.submit()?;
    println!("proof accepted by contract {}", record.contract_id);
    println!("  proof hash: {}", record.proof_hash);
    Ok(0)
}

pub fn run_register(config: &ZkregConfig) -> Result<u8> {
    let record = open_pipeline(config)?.register()?;
    println!("agent registered with contract {}", record.contract_id);
    println!("  agent hash: {}", record.agent_hash);
    println!("  new root:   {}", record.new_root);
    Ok(0)
}

pub fn run_all(args: &CandidateArgs, config: &ZkregConfig) -> Result<u8> {
    let pipeline = open_pipeline(config)?;
    let tree = registry_tree(config)?;
    let record = pipeline.run_all(&tree, &args.description)?;
    println!("pipeline complete; new registry root {}", record.new_root);
    Ok(0)
}

// ─── Status ──────────────────────────────────────────────────────────

pub fn run_status(config: &ZkregConfig) -> Result<u8> {
    let pipeline = open_pipeline(config)?;
    println!("build directory: {}", config.build_dir.display());
    for status in pipeline.status()? {
        let mark = if status.done { "x" } else { " " };
        println!("  [{mark}] {}. {}", status.stage.number(), status.stage);
    }
    match pipeline.next_stage()? {
        Some(stage) => println!("next: zkreg {}", stage.command()),
        None => println!("all stages complete"),
    }
    if !config.deployment_path().is_file() {
        println!(
            "note: no deployment config at {}",
            config.deployment_path().display()
        );
    }
    Ok(0)
}

fn print_proof_outcome(is_non_member: bool) {
    if is_non_member {
        println!("proof generated: candidate is not in the registry");
    } else {
        println!("proof generated, but the circuit reports membership");
    }
}

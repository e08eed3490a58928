//! # External Command Backend
//!
//! [`ProofBackend`] over the real toolchain:
//!
//! | stage    | tool                                                       |
//! |----------|------------------------------------------------------------|
//! | compile  | `circom --r1cs --wasm --sym --c`, `snarkjs r1cs info/export` |
//! | setup    | `snarkjs powersoftau ...`, `snarkjs groth16 setup`, `snarkjs zkey ...` |
//! | prove    | `snarkjs groth16 fullprove`                                |
//! | verify   | `snarkjs groth16 verify`                                   |
//! | submit   | `stellar contract invoke -- verify_non_membership`         |
//! | register | `stellar contract invoke -- register_agent`                |
//!
//! Each tool is spawned directly (no shell) with its output captured. A
//! non-zero exit becomes [`BackendError::ExternalToolFailure`] carrying
//! the command line, status, stdout, and stderr.
//!
//! Intermediate files (`.ptau`, `.zkey`, `.r1cs`, `.wasm`) live in the
//! build directory next to the pipeline's JSON artifacts. Scratch files
//! for `fullprove` and `verify` are written under dot-prefixed names and
//! removed afterwards, so a failed run never leaves a stage's artifact
//! behind.

use std::path::{Path, PathBuf};
use std::process::Command;

use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use zkreg_zkp::{
    ArtifactError, BackendError, CircuitArtifact, ContractCallParams, DeploymentConfig, ProofArtifact,
    ProofBackend, RegistrationParams, SetupArtifact, Witness,
};

use crate::config::ZkregConfig;

/// Public beacon applied after the random contribution.
const BEACON_HASH: &str = "0102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
/// Beacon iteration exponent.
const BEACON_ITERATIONS: &str = "10";

/// Backend that shells out to circom, snarkjs, and the stellar CLI.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    config: ZkregConfig,
}

impl CommandBackend {
    pub fn new(config: ZkregConfig) -> Self {
        Self { config }
    }

    fn build_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.config.build_dir.join(name)
    }

    fn snarkjs<S: AsRef<str>>(&self, args: &[S]) -> Result<String, BackendError> {
        run_tool(&self.config.tools.snarkjs, args)
    }

    fn invoke_contract(
        &self,
        deployment: &DeploymentConfig,
        function: &str,
        args: &[(&'static str, &str)],
    ) -> Result<String, BackendError> {
        let mut argv: Vec<String> = vec![
            "contract".into(),
            "invoke".into(),
            "--id".into(),
            deployment.contract_id.clone(),
            "--source".into(),
            self.config.source_account.clone(),
            "--network".into(),
            deployment.network.clone(),
            "--".into(),
            function.into(),
        ];
        for (name, value) in args {
            argv.push(format!("--{name}"));
            argv.push((*value).to_string());
        }
        run_tool(&self.config.tools.stellar, &argv)
    }
}

/// Run `program args...`, returning stdout on success.
pub fn run_tool<S: AsRef<str>>(program: &str, args: &[S]) -> Result<String, BackendError> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    let command_line = std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!(command = %command_line, "spawning external tool");

    let output = Command::new(program).args(&args).output()?;
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(BackendError::ExternalToolFailure {
            tool: command_line,
            status: output.status.to_string(),
            stdout,
            stderr,
        });
    }
    if !stderr.trim().is_empty() {
        tracing::debug!(tool = program, stderr = %stderr.trim(), "tool wrote to stderr");
    }
    Ok(stdout)
}

/// Constraint count from `snarkjs r1cs info` output.
pub fn parse_constraint_count(info: &str) -> Option<u64> {
    info.lines().find_map(|line| {
        let (_, rest) = line.split_once("# of Constraints:")?;
        rest.trim().parse().ok()
    })
}

/// Boolean verdict from `stellar contract invoke` output.
pub fn parse_contract_bool(stdout: &str) -> Result<bool, BackendError> {
    match stdout.trim().trim_matches('"') {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(BackendError::MalformedOutput {
            tool: "stellar contract invoke".to_string(),
            reason: format!("expected true or false, got {other:?}"),
        }),
    }
}

fn sha256_file_hex(path: &Path) -> Result<String, BackendError> {
    let bytes = std::fs::read(path)?;
    Ok(Sha256::digest(&bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BackendError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(ArtifactError::from)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

/// Removes scratch files on drop.
struct Scratch(Vec<PathBuf>);

impl Drop for Scratch {
    fn drop(&mut self) {
        for path in &self.0 {
            if let Err(e) = std::fs::remove_file(path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove scratch file");
                }
            }
        }
    }
}

impl ProofBackend for CommandBackend {
    fn compile(&self) -> Result<CircuitArtifact, BackendError> {
        let build_dir = &self.config.build_dir;
        std::fs::create_dir_all(build_dir)?;
        let name = &self.config.circuit_name;

        tracing::info!(circuit = %self.config.circuit.display(), "circom: compiling to R1CS and WASM");
        run_tool(
            &self.config.tools.circom,
            &[
                path_str(&self.config.circuit),
                "--r1cs".into(),
                "--wasm".into(),
                "--sym".into(),
                "--c".into(),
                "-o".into(),
                path_str(build_dir),
            ],
        )?;

        let r1cs = self.build_path(format!("{name}.r1cs"));
        let wasm = self.build_path(format!("{name}_js/{name}.wasm"));
        let info = self.snarkjs(&["r1cs".into(), "info".into(), path_str(&r1cs)])?;
        let constraints = parse_constraint_count(&info);
        self.snarkjs(&[
            "r1cs".into(),
            "export".into(),
            "json".into(),
            path_str(&r1cs),
            path_str(&self.build_path(format!("{name}.r1cs.json"))),
        ])?;

        Ok(CircuitArtifact {
            circuit_name: name.clone(),
            r1cs_path: path_str(&r1cs),
            wasm_path: path_str(&wasm),
            constraints,
        })
    }

    fn setup(&self, circuit: &CircuitArtifact) -> Result<SetupArtifact, BackendError> {
        std::fs::create_dir_all(&self.config.build_dir)?;
        let power = self.config.ptau_power.to_string();
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        let entropy: String = seed.iter().map(|b| format!("{b:02x}")).collect();
        let contribution = format!("-e={entropy}");

        let pot0 = path_str(&self.build_path("pot_0000.ptau"));
        let pot1 = path_str(&self.build_path("pot_0001.ptau"));
        let pot_beacon = path_str(&self.build_path("pot_beacon.ptau"));
        let pot_final = path_str(&self.build_path("pot_final.ptau"));
        let zkey0 = path_str(&self.build_path("circuit_0000.zkey"));
        let zkey_final = self.build_path(format!("{}_final.zkey", circuit.circuit_name));
        let zkey_final_s = path_str(&zkey_final);
        let vkey = self.build_path("verification_key.json");
        let vkey_s = path_str(&vkey);
        let r1cs = circuit.r1cs_path.as_str();

        let steps: [(&str, Vec<&str>); 9] = [
            (
                "powers of tau (new)",
                vec!["powersoftau", "new", "bn128", power.as_str(), pot0.as_str()],
            ),
            (
                "powers of tau (contribute)",
                vec!["powersoftau", "contribute", pot0.as_str(), pot1.as_str(), contribution.as_str()],
            ),
            (
                "powers of tau (beacon)",
                vec![
                    "powersoftau",
                    "beacon",
                    pot1.as_str(),
                    pot_beacon.as_str(),
                    BEACON_HASH,
                    BEACON_ITERATIONS,
                ],
            ),
            (
                "prepare phase 2",
                vec!["powersoftau", "prepare", "phase2", pot_beacon.as_str(), pot_final.as_str()],
            ),
            (
                "verify powers of tau",
                vec!["powersoftau", "verify", pot_final.as_str()],
            ),
            (
                "groth16 setup",
                vec!["groth16", "setup", r1cs, pot_final.as_str(), zkey0.as_str()],
            ),
            (
                "zkey contribute",
                vec!["zkey", "contribute", zkey0.as_str(), zkey_final_s.as_str(), contribution.as_str()],
            ),
            (
                "export verification key",
                vec!["zkey", "export", "verificationkey", zkey_final_s.as_str(), vkey_s.as_str()],
            ),
            (
                "verify zkey",
                vec!["zkey", "verify", r1cs, pot_final.as_str(), zkey_final_s.as_str()],
            ),
        ];

        let total = steps.len();
        for (i, (label, args)) in steps.iter().enumerate() {
            tracing::info!(step = i + 1, total, power = %power, "setup: {label}");
            self.snarkjs(args.as_slice())?;
        }

        Ok(SetupArtifact {
            proving_key_path: zkey_final_s,
            verification_key_path: vkey_s,
            ptau_power: self.config.ptau_power,
            verification_key_digest: sha256_file_hex(&vkey)?,
        })
    }

    fn prove(
        &self,
        circuit: &CircuitArtifact,
        setup: &SetupArtifact,
        witness: &Witness,
    ) -> Result<ProofArtifact, BackendError> {
        std::fs::create_dir_all(&self.config.build_dir)?;
        let input = self.build_path(".fullprove.input.json");
        let proof = self.build_path(".fullprove.proof.json");
        let public = self.build_path(".fullprove.public.json");
        let _scratch = Scratch(vec![input.clone(), proof.clone(), public.clone()]);

        write_json(&input, witness)?;

        tracing::info!(wasm = %circuit.wasm_path, "snarkjs: groth16 fullprove");
        self.snarkjs(&[
            "groth16",
            "fullprove",
            path_str(&input).as_str(),
            circuit.wasm_path.as_str(),
            setup.proving_key_path.as_str(),
            path_str(&proof).as_str(),
            path_str(&public).as_str(),
        ])?;

        let proof_json = std::fs::read_to_string(&proof)?;
        let public_json = std::fs::read_to_string(&public)?;
        Ok(ProofArtifact::from_snarkjs_json(&proof_json, &public_json)?)
    }

    fn verify(&self, setup: &SetupArtifact, artifact: &ProofArtifact) -> Result<bool, BackendError> {
        let vkey = PathBuf::from(&setup.verification_key_path);
        if sha256_file_hex(&vkey)? != setup.verification_key_digest {
            tracing::warn!(vkey = %vkey.display(), "verification key changed since setup");
            return Ok(false);
        }

        std::fs::create_dir_all(&self.config.build_dir)?;
        let proof = self.build_path(".verify.proof.json");
        let public = self.build_path(".verify.public.json");
        let _scratch = Scratch(vec![proof.clone(), public.clone()]);
        write_json(&proof, &artifact.proof)?;
        write_json(&public, &artifact.public_signals)?;

        tracing::info!("snarkjs: groth16 verify");
        match self.snarkjs(&[
            "groth16",
            "verify",
            setup.verification_key_path.as_str(),
            path_str(&public).as_str(),
            path_str(&proof).as_str(),
        ]) {
            Ok(_) => Ok(true),
            Err(BackendError::ExternalToolFailure { stdout, stderr, .. })
                if stdout.contains("Invalid proof") || stderr.contains("Invalid proof") =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn submit(
        &self,
        deployment: &DeploymentConfig,
        params: &ContractCallParams,
    ) -> Result<bool, BackendError> {
        tracing::info!(contract = %deployment.contract_id, "stellar: invoking verify_non_membership");
        let stdout = self.invoke_contract(deployment, ContractCallParams::FUNCTION, &params.as_args())?;
        parse_contract_bool(&stdout)
    }

    fn register(
        &self,
        deployment: &DeploymentConfig,
        params: &RegistrationParams,
    ) -> Result<String, BackendError> {
        tracing::info!(contract = %deployment.contract_id, "stellar: invoking register_agent");
        let stdout = self.invoke_contract(deployment, RegistrationParams::FUNCTION, &params.as_args())?;
        let new_root = stdout.trim().trim_matches('"').to_string();
        if new_root.is_empty() {
            return Err(BackendError::MalformedOutput {
                tool: "stellar contract invoke".to_string(),
                reason: "register_agent returned no root".to_string(),
            });
        }
        Ok(new_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snarkjs_constraint_count() {
        let info = "[INFO]  snarkJS: Curve: bn-128\n\
                    [INFO]  snarkJS: # of Wires: 4200\n\
                    [INFO]  snarkJS: # of Constraints: 4159\n\
                    [INFO]  snarkJS: # of Private Inputs: 17\n";
        assert_eq!(parse_constraint_count(info), Some(4159));
        assert_eq!(parse_constraint_count("nothing here"), None);
    }

    #[test]
    fn parses_contract_verdicts() {
        assert!(parse_contract_bool("true\n").unwrap());
        assert!(!parse_contract_bool("false").unwrap());
        assert!(parse_contract_bool("\"true\"").unwrap());
        assert!(matches!(
            parse_contract_bool("error: simulation failed"),
            Err(BackendError::MalformedOutput { .. })
        ));
    }

    #[test]
    fn missing_tool_is_io_error() {
        let err = run_tool("zkreg-definitely-not-installed", &["--version"]).unwrap_err();
        assert!(matches!(err, BackendError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_captures_output() {
        let err = run_tool("sh", &["-c", "echo partial; echo boom >&2; exit 3"]).unwrap_err();
        match err {
            BackendError::ExternalToolFailure {
                tool,
                status,
                stdout,
                stderr,
            } => {
                assert!(tool.starts_with("sh -c"));
                assert!(status.contains('3'));
                assert_eq!(stdout.trim(), "partial");
                assert_eq!(stderr.trim(), "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn contract_invocation_passes_named_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let config = ZkregConfig {
            build_dir: dir.path().to_path_buf(),
            source_account: "alice".into(),
            tools: crate::config::ToolPaths {
                stellar: "echo".into(),
                ..Default::default()
            },
            ..ZkregConfig::default()
        };
        let backend = CommandBackend::new(config);
        let deployment: DeploymentConfig = serde_json::from_str(
            r#"{"contractId":"C1","network":"testnet","rpcUrl":"https://rpc","deployedAt":"2025-01-15T10:30:00Z"}"#,
        )
        .unwrap();
        let params = RegistrationParams {
            agent_hash: "0xaa".into(),
            merkle_root: "0xbb".into(),
        };
        let echoed = backend.register(&deployment, &params).unwrap();
        assert_eq!(
            echoed,
            "contract invoke --id C1 --source alice --network testnet -- register_agent --agent_hash 0xaa --merkle_root 0xbb"
        );
    }
}

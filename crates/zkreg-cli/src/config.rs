//! # Configuration
//!
//! `zkreg.yaml` selects the directories, circuit, tree depth, external
//! tool binaries, and the registry of already-admitted descriptions.
//! Every field is optional.
//!
//! ```yaml
//! build_dir: build
//! config_dir: config
//! levels: 8
//! circuit: circuits/non_membership.circom
//! circuit_name: non_membership
//! ptau_power: 14
//! source_account: deployer
//! tools:
//!   circom: circom
//!   snarkjs: snarkjs
//!   stellar: stellar
//! registry:
//!   - "Code Review Bot - Analyzes pull requests for best practices"
//! ```
//!
//! Relative paths resolve against the directory holding the config file
//! (or the working directory when no file is used).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use zkreg_zkp::DeploymentConfig;

/// Config file looked up in the working directory when `--config` is
/// not given.
pub const DEFAULT_CONFIG_FILE: &str = "zkreg.yaml";

/// File name of the deployment config under `config_dir`.
pub const DEPLOYMENT_FILE: &str = "deployment.json";

/// External tool binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolPaths {
    pub circom: String,
    pub snarkjs: String,
    pub stellar: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            circom: "circom".to_string(),
            snarkjs: "snarkjs".to_string(),
            stellar: "stellar".to_string(),
        }
    }
}

/// Parsed `zkreg.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZkregConfig {
    /// Artifact directory.
    pub build_dir: PathBuf,
    /// Directory holding `deployment.json`.
    pub config_dir: PathBuf,
    /// Registry tree depth.
    pub levels: usize,
    /// Circom source of the non-membership circuit.
    pub circuit: PathBuf,
    /// Stem of the compiler's output files.
    pub circuit_name: String,
    /// Powers-of-tau exponent for the trusted setup.
    pub ptau_power: u32,
    /// Stellar identity that signs contract invocations.
    pub source_account: String,
    pub tools: ToolPaths,
    /// Already-admitted descriptions, in slot order.
    pub registry: Vec<String>,
}

impl Default for ZkregConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            config_dir: PathBuf::from("config"),
            levels: 8,
            circuit: PathBuf::from("circuits/non_membership.circom"),
            circuit_name: "non_membership".to_string(),
            ptau_power: 14,
            source_account: "deployer".to_string(),
            tools: ToolPaths::default(),
            registry: Vec::new(),
        }
    }
}

impl ZkregConfig {
    /// Load from `path`, or from `./zkreg.yaml` if present, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE}; using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a config file and resolve its relative paths.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("invalid config: {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        tracing::debug!(config = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse YAML without touching the filesystem.
    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes as null, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.levels > zkreg_crypto::MAX_LEVELS {
            anyhow::bail!(
                "levels = {} exceeds the supported maximum of {}",
                self.levels,
                zkreg_crypto::MAX_LEVELS
            );
        }
        let capacity = 1usize << self.levels;
        if self.registry.len() > capacity {
            anyhow::bail!(
                "registry lists {} entries but a depth-{} tree holds {capacity}",
                self.registry.len(),
                self.levels
            );
        }
        Ok(())
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.build_dir, &mut self.config_dir, &mut self.circuit] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Path of the deployment config.
    pub fn deployment_path(&self) -> PathBuf {
        self.config_dir.join(DEPLOYMENT_FILE)
    }

    /// The deployment config, if one has been written.
    pub fn load_deployment(&self) -> Result<Option<DeploymentConfig>> {
        let path = self.deployment_path();
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let deployment = serde_json::from_str(&content)
            .with_context(|| format!("invalid deployment config: {}", path.display()))?;
        Ok(Some(deployment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let c = ZkregConfig::from_yaml("").unwrap();
        assert_eq!(c, ZkregConfig::default());
        assert_eq!(c.levels, 8);
        assert_eq!(c.ptau_power, 14);
        assert_eq!(c.tools.snarkjs, "snarkjs");
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let c = ZkregConfig::from_yaml(
            "levels: 4\ntools:\n  stellar: /opt/stellar\nregistry:\n  - a\n  - b\n",
        )
        .unwrap();
        assert_eq!(c.levels, 4);
        assert_eq!(c.tools.stellar, "/opt/stellar");
        assert_eq!(c.tools.circom, "circom");
        assert_eq!(c.registry, ["a", "b"]);
        assert_eq!(c.circuit_name, "non_membership");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(ZkregConfig::from_yaml("leves: 4\n").is_err());
    }

    #[test]
    fn oversized_registry_is_rejected() {
        let err = ZkregConfig::from_yaml("levels: 1\nregistry: [a, b, c]\n").unwrap_err();
        assert!(err.to_string().contains("holds 2"));
    }

    #[test]
    fn excessive_depth_is_rejected() {
        assert!(ZkregConfig::from_yaml("levels: 64\n").is_err());
    }

    #[test]
    fn file_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zkreg.yaml");
        std::fs::write(&path, "build_dir: out\ncircuit: /abs/c.circom\n").unwrap();
        let c = ZkregConfig::from_file(&path).unwrap();
        assert_eq!(c.build_dir, dir.path().join("out"));
        assert_eq!(c.config_dir, dir.path().join("config"));
        assert_eq!(c.circuit, PathBuf::from("/abs/c.circom"));
    }

    #[test]
    fn missing_deployment_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let c = ZkregConfig {
            config_dir: dir.path().to_path_buf(),
            ..ZkregConfig::default()
        };
        assert!(c.load_deployment().unwrap().is_none());

        std::fs::write(
            c.deployment_path(),
            r#"{"contractId":"C1","network":"testnet","rpcUrl":"https://rpc","deployedAt":"2025-01-15T10:30:00Z"}"#,
        )
        .unwrap();
        let d = c.load_deployment().unwrap().unwrap();
        assert_eq!(d.contract_id, "C1");
    }
}

//! # zkreg CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, loads
//! `zkreg.yaml`, and dispatches to the stage handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use zkreg_cli::commands::{
    run_all, run_compile, run_generate, run_prove, run_register, run_setup, run_status,
    run_submit, run_verify, run_witness, CandidateArgs,
};
use zkreg_cli::config::ZkregConfig;

/// zkreg: prove an item is absent from a Merkle registry and carry the
/// proof through to on-chain verification and registration.
#[derive(Parser, Debug)]
#[command(name = "zkreg", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file (defaults to ./zkreg.yaml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile the circuit to R1CS and WASM.
    Compile,

    /// Run the trusted setup ceremony for the compiled circuit.
    Setup,

    /// Build the non-membership witness for a candidate.
    Witness(CandidateArgs),

    /// Generate a proof from the stored witness.
    Prove,

    /// Build the witness for a candidate and prove it.
    Generate(CandidateArgs),

    /// Verify the proof against the local verification key.
    Verify,

    /// Submit the verified proof to the deployed contract.
    Submit,

    /// Register the candidate after an accepted submission.
    Register,

    /// Run every stage in order, stopping at the first failure.
    Run(CandidateArgs),

    /// Show which stages are complete and what to run next.
    Status,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("zkreg v{} starting", env!("CARGO_PKG_VERSION"));

    match dispatch(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn dispatch(cli: Cli) -> anyhow::Result<u8> {
    let config = ZkregConfig::load(cli.config.as_deref())?;
    tracing::debug!(build_dir = %config.build_dir.display(), levels = config.levels, "config resolved");

    match cli.command {
        Commands::Compile => run_compile(&config),
        Commands::Setup => run_setup(&config),
        Commands::Witness(args) => run_witness(&args, &config),
        Commands::Prove => run_prove(&config),
        Commands::Generate(args) => run_generate(&args, &config),
        Commands::Verify => run_verify(&config),
        Commands::Submit => run_submit(&config),
        Commands::Register => run_register(&config),
        Commands::Run(args) => run_all(&args, &config),
        Commands::Status => run_status(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_compile() {
        let cli = Cli::try_parse_from(["zkreg", "compile"]).unwrap();
        assert!(matches!(cli.command, Commands::Compile));
        assert_eq!(cli.verbose, 0);
        assert!(!cli.log_json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn cli_parse_generate_with_description() {
        let cli = Cli::try_parse_from([
            "zkreg",
            "generate",
            "--description",
            "Marketing Content Generator - Creates social media posts",
        ])
        .unwrap();
        if let Commands::Generate(args) = cli.command {
            assert_eq!(
                args.description,
                "Marketing Content Generator - Creates social media posts"
            );
        } else {
            panic!("expected generate");
        }
    }

    #[test]
    fn cli_parse_short_description() {
        let cli = Cli::try_parse_from(["zkreg", "witness", "-d", "bot"]).unwrap();
        assert!(matches!(cli.command, Commands::Witness(ref a) if a.description == "bot"));
    }

    #[test]
    fn cli_generate_requires_description() {
        assert!(Cli::try_parse_from(["zkreg", "generate"]).is_err());
        assert!(Cli::try_parse_from(["zkreg", "run"]).is_err());
    }

    #[test]
    fn cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zkreg",
            "status",
            "-vv",
            "--config",
            "conf/zkreg.yaml",
            "--log-json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Status));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("conf/zkreg.yaml")));
        assert!(cli.log_json);
    }

    #[test]
    fn cli_parse_every_stage_command() {
        for cmd in ["compile", "setup", "prove", "verify", "submit", "register", "status"] {
            assert!(Cli::try_parse_from(["zkreg", cmd]).is_ok(), "{cmd}");
        }
    }

    #[test]
    fn cli_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["zkreg", "deploy"]).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["zkreg", "status", "--config", "/nonexistent/zkreg.yaml"])
            .unwrap();
        assert!(dispatch(cli).is_err());
    }
}

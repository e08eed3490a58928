//! # zkreg-cli: Non-Membership Registry CLI
//!
//! Provides the `zkreg` command-line interface. Each subcommand runs one
//! stage of the proof lifecycle against a build directory, so a run can be
//! interrupted and resumed from the last stage that completed.
//!
//! ```bash
//! zkreg compile
//! zkreg setup
//! zkreg generate --description "Marketing Content Generator - Creates social media posts"
//! zkreg verify
//! zkreg submit
//! zkreg register
//! zkreg status
//! ```
//!
//! The stages shell out to `circom`, `snarkjs`, and the `stellar` CLI
//! through [`external::CommandBackend`]; paths and binaries come from
//! `zkreg.yaml` ([`config::ZkregConfig`]).

pub mod commands;
pub mod config;
pub mod external;

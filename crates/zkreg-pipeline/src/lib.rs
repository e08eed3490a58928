//! # zkreg-pipeline: Proof Lifecycle Pipeline
//!
//! Moves a non-membership proof from circuit compilation to on-chain
//! registration, one stage per invocation, resuming from whatever the
//! previous invocation persisted.
//!
//! - **Stages** (`stage.rs`): the ordered lifecycle and the artifacts that
//!   mark each stage done.
//! - **Store** (`store.rs`): typed artifact persistence, in memory or as
//!   JSON files in a build directory.
//! - **Pipeline** (`pipeline.rs`): prerequisite gating, stage execution
//!   against a `ProofBackend`, and status reporting.
//!
//! ## Concurrency
//!
//! Single-threaded and sequential. The artifact directory is the only
//! shared state and supports one pipeline runner at a time; callers must
//! serialize concurrent runs.

pub mod error;
pub mod pipeline;
pub mod stage;
pub mod store;

pub use error::{PipelineError, StoreError};
pub use pipeline::{Pipeline, StageStatus};
pub use stage::{ArtifactKey, Stage};
pub use store::{Artifact, ArtifactStore, ArtifactStoreExt, FsArtifactStore, MemoryArtifactStore};

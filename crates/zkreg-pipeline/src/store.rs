//! # Artifact Store
//!
//! Typed persistence for stage artifacts, keyed by [`ArtifactKey`].
//!
//! A stage is done exactly when its artifacts are present, so the store
//! is the only state the pipeline keeps between invocations.
//!
//! - [`MemoryArtifactStore`]: a map, for tests.
//! - [`FsArtifactStore`]: one pretty-printed JSON file per key under the
//!   build directory, using the file names the circuit toolchain expects
//!   (`input.json`, `proof.json`, `public.json`, ...).
//!
//! ## Write Discipline
//!
//! Filesystem writes go to a temporary sibling first and are renamed into
//! place, so an interrupted stage leaves either the previous artifact or
//! the new one, never a truncated file. Overwriting is allowed: re-running
//! a stage supersedes its output.
//!
//! Concurrent pipeline runs against one directory are not supported.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use zkreg_zkp::{
    CircuitArtifact, Groth16Proof, PublicSignals, RegistrationRecord, SetupArtifact,
    SubmissionRecord, VerificationRecord, Witness,
};

use crate::error::StoreError;
use crate::stage::ArtifactKey;

// ─── Typed Artifacts ─────────────────────────────────────────────────

/// A value stored under a fixed key.
pub trait Artifact: Serialize + DeserializeOwned {
    /// Where this artifact lives.
    const KEY: ArtifactKey;
}

impl Artifact for CircuitArtifact {
    const KEY: ArtifactKey = ArtifactKey::Circuit;
}

impl Artifact for SetupArtifact {
    const KEY: ArtifactKey = ArtifactKey::Setup;
}

impl Artifact for Witness {
    const KEY: ArtifactKey = ArtifactKey::Witness;
}

impl Artifact for Groth16Proof {
    const KEY: ArtifactKey = ArtifactKey::Proof;
}

impl Artifact for PublicSignals {
    const KEY: ArtifactKey = ArtifactKey::PublicSignals;
}

impl Artifact for VerificationRecord {
    const KEY: ArtifactKey = ArtifactKey::Verification;
}

impl Artifact for SubmissionRecord {
    const KEY: ArtifactKey = ArtifactKey::Submission;
}

impl Artifact for RegistrationRecord {
    const KEY: ArtifactKey = ArtifactKey::Registration;
}

// ─── Store Trait ─────────────────────────────────────────────────────

/// Byte-level artifact persistence.
pub trait ArtifactStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous value.
    fn put_bytes(&self, key: ArtifactKey, bytes: &[u8]) -> Result<(), StoreError>;

    /// Bytes stored under `key`, if any.
    fn get_bytes(&self, key: ArtifactKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Whether `key` is present.
    fn contains(&self, key: ArtifactKey) -> Result<bool, StoreError>;

    /// Drop `key`. Removing an absent key is not an error.
    fn remove(&self, key: ArtifactKey) -> Result<(), StoreError>;
}

/// Typed access over any [`ArtifactStore`].
pub trait ArtifactStoreExt: ArtifactStore {
    /// Serialize and store an artifact.
    fn save<T: Artifact>(&self, artifact: &T) -> Result<(), StoreError> {
        let mut bytes = serde_json::to_vec_pretty(artifact).map_err(|source| {
            StoreError::Serialize {
                key: T::KEY,
                source,
            }
        })?;
        bytes.push(b'\n');
        self.put_bytes(T::KEY, &bytes)?;
        tracing::debug!(artifact = %T::KEY, bytes = bytes.len(), "artifact persisted");
        Ok(())
    }

    /// Load and parse an artifact, if present.
    fn load<T: Artifact>(&self) -> Result<Option<T>, StoreError> {
        match self.get_bytes(T::KEY)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| StoreError::Corrupt {
                    key: T::KEY,
                    source,
                }),
            None => Ok(None),
        }
    }
}

impl<S: ArtifactStore + ?Sized> ArtifactStoreExt for S {}

impl<S: ArtifactStore + ?Sized> ArtifactStore for &S {
    fn put_bytes(&self, key: ArtifactKey, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).put_bytes(key, bytes)
    }

    fn get_bytes(&self, key: ArtifactKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get_bytes(key)
    }

    fn contains(&self, key: ArtifactKey) -> Result<bool, StoreError> {
        (**self).contains(key)
    }

    fn remove(&self, key: ArtifactKey) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

// ─── In-Memory Store ─────────────────────────────────────────────────

/// Artifacts held in a map.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    entries: Mutex<HashMap<ArtifactKey, Vec<u8>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently present, sorted.
    pub fn keys(&self) -> Vec<ArtifactKey> {
        let mut keys: Vec<_> = self.entries.lock().keys().copied().collect();
        keys.sort();
        keys
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn put_bytes(&self, key: ArtifactKey, bytes: &[u8]) -> Result<(), StoreError> {
        self.entries.lock().insert(key, bytes.to_vec());
        Ok(())
    }

    fn get_bytes(&self, key: ArtifactKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().get(&key).cloned())
    }

    fn contains(&self, key: ArtifactKey) -> Result<bool, StoreError> {
        Ok(self.entries.lock().contains_key(&key))
    }

    fn remove(&self, key: ArtifactKey) -> Result<(), StoreError> {
        self.entries.lock().remove(&key);
        Ok(())
    }
}

// ─── Filesystem Store ────────────────────────────────────────────────

/// Artifacts as JSON files in a build directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// A store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The build directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn path_of(&self, key: ArtifactKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put_bytes(&self, key: ArtifactKey, bytes: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).map_err(io_err(&self.root))?;

        let target = self.path_of(key);
        let tmp = self.root.join(format!(".{}.tmp", key.file_name()));
        {
            let mut file = fs::File::create(&tmp).map_err(io_err(&tmp))?;
            file.write_all(bytes).map_err(io_err(&tmp))?;
            file.sync_all().map_err(io_err(&tmp))?;
        }
        fs::rename(&tmp, &target).map_err(io_err(&target))?;
        Ok(())
    }

    fn get_bytes(&self, key: ArtifactKey) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_of(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(&path)(e)),
        }
    }

    fn contains(&self, key: ArtifactKey) -> Result<bool, StoreError> {
        Ok(self.path_of(key).is_file())
    }

    fn remove(&self, key: ArtifactKey) -> Result<(), StoreError> {
        let path = self.path_of(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err(&path)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkreg_core::FieldElement;

    fn signals() -> PublicSignals {
        PublicSignals {
            root: FieldElement::from_u64(123),
            candidate_hash: FieldElement::from_u64(456),
            is_non_member: FieldElement::from_u64(1),
        }
    }

    #[test]
    fn memory_store_round_trips_typed_artifacts() {
        let store = MemoryArtifactStore::new();
        assert!(store.load::<PublicSignals>().unwrap().is_none());
        store.save(&signals()).unwrap();
        assert_eq!(store.load::<PublicSignals>().unwrap(), Some(signals()));
        assert_eq!(store.keys(), vec![ArtifactKey::PublicSignals]);
    }

    #[test]
    fn fs_store_writes_toolchain_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path().join("build"));
        store.save(&signals()).unwrap();

        let raw = fs::read_to_string(dir.path().join("build/public.json")).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, ["123", "456", "1"]);
        assert!(store.contains(ArtifactKey::PublicSignals).unwrap());
        assert!(!store.contains(ArtifactKey::Proof).unwrap());
    }

    #[test]
    fn fs_store_overwrites_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        store.save(&signals()).unwrap();
        let mut changed = signals();
        changed.is_non_member = FieldElement::zero();
        store.save(&changed).unwrap();

        assert_eq!(store.load::<PublicSignals>().unwrap(), Some(changed));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["public.json"]);
    }

    #[test]
    fn fs_store_reports_corrupt_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        fs::write(store.path_of(ArtifactKey::PublicSignals), b"[\"1\"]").unwrap();
        let err = store.load::<PublicSignals>().unwrap_err();
        assert!(matches!(
            err,
            StoreError::Corrupt {
                key: ArtifactKey::PublicSignals,
                ..
            }
        ));
    }

    #[test]
    fn remove_drops_file_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path());
        store.save(&signals()).unwrap();
        store.remove(ArtifactKey::PublicSignals).unwrap();
        assert!(!store.contains(ArtifactKey::PublicSignals).unwrap());
        assert!(!dir.path().join("public.json").exists());
        store.remove(ArtifactKey::PublicSignals).unwrap();

        let memory = MemoryArtifactStore::new();
        memory.save(&signals()).unwrap();
        memory.remove(ArtifactKey::PublicSignals).unwrap();
        assert!(memory.keys().is_empty());
    }

    #[test]
    fn missing_directory_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsArtifactStore::new(dir.path().join("nope"));
        assert!(store.load::<PublicSignals>().unwrap().is_none());
    }
}

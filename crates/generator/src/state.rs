//! Persisted generator state.
//!
//! Dynamic-mode runs checkpoint their generator state to a JSON file at
//! shutdown and restore it at startup, so successive runs against the
//! same node do not replay the same statement stream.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current on-disk format version.
pub const STATE_VERSION: u32 = 1;

/// Errors reading or writing the state file.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("generator state I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("generator state format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Durable generator state, one file per node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorState {
    /// On-disk format version.
    pub version: u32,
    /// Base seed the run was configured with.
    pub seed: u64,
    /// Incremented once per completed run; feeds per-worker seed
    /// derivation so successive runs produce disjoint streams.
    pub epoch: u64,
    /// Total statements emitted across all completed runs.
    pub statements_emitted: u64,
    /// Timestamp of the last save.
    pub saved_at: DateTime<Utc>,
}

impl GeneratorState {
    /// Fresh state for a first run with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            version: STATE_VERSION,
            seed,
            epoch: 0,
            statements_emitted: 0,
            saved_at: Utc::now(),
        }
    }

    /// Seed for one worker's generator sub-state.
    ///
    /// Mixing in the epoch and the worker index keeps streams disjoint
    /// across workers and across runs.
    pub fn worker_seed(&self, worker_index: usize) -> u64 {
        self.seed
            .wrapping_add(self.epoch.wrapping_mul(0x9E3779B97F4A7C15))
            .wrapping_add((worker_index as u64).wrapping_mul(0xD1B54A32D192ED03))
    }

    /// Fold a completed run into the state before persisting it.
    pub fn advance(&mut self, emitted: u64) {
        self.epoch += 1;
        self.statements_emitted += emitted;
        self.saved_at = Utc::now();
    }

    /// Load state from `path`. A missing file is `Ok(None)`; an
    /// unreadable or malformed file is an error the caller decides on.
    pub fn load(path: &Path) -> Result<Option<Self>, StateError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::Io(e)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Save state to `path` as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_generator.json");

        let mut state = GeneratorState::new(99);
        state.advance(1_234);
        state.save(&path).unwrap();

        let restored = GeneratorState::load(&path).unwrap().unwrap();
        assert_eq!(restored.version, STATE_VERSION);
        assert_eq!(restored.seed, 99);
        assert_eq!(restored.epoch, 1);
        assert_eq!(restored.statements_emitted, 1_234);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = GeneratorState::load(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(GeneratorState::load(&path).is_err());
    }

    #[test]
    fn worker_seeds_are_disjoint_across_workers_and_epochs() {
        let mut state = GeneratorState::new(5);
        let a0 = state.worker_seed(0);
        let a1 = state.worker_seed(1);
        assert_ne!(a0, a1);

        state.advance(10);
        assert_ne!(a0, state.worker_seed(0));
    }
}

//! Best-score and streak persistence
//!
//! Two layers:
//! - `KeyValueBackend`: raw string storage that can fail (LocalStorage on
//!   web, a map in memory elsewhere)
//! - `RecordStore`: the typed records the engine reads and writes. It
//!   never fails; storage errors are logged and replaced by defaults.

use std::collections::HashMap;

use thiserror::Error;

use crate::highscores::ScoreKey;
use crate::streak::StreakState;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageBackend;

/// Storage key for the streak record
pub const STREAK_KEY: &str = "aim_warmup_streak";

/// Failure of the underlying key-value storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },
    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("corrupt value under `{key}`")]
    Corrupt { key: String },
}

/// Raw string key-value storage
pub trait KeyValueBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process backend
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    items: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persisted records consumed by the engine at session end
///
/// Synchronous and infallible from the caller's side.
pub trait RecordStore {
    fn best(&self, key: ScoreKey) -> u32;
    fn set_best(&mut self, key: ScoreKey, value: u32);
    fn streak(&self) -> StreakState;
    fn set_streak(&mut self, state: StreakState);
}

/// `RecordStore` on top of any key-value backend
#[derive(Debug, Clone, Default)]
pub struct KeyValueRecordStore<B> {
    backend: B,
}

/// Record store that lives only as long as the process
pub type MemoryStore = KeyValueRecordStore<MemoryBackend>;

impl MemoryStore {
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl<B: KeyValueBackend> KeyValueRecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend.get(key)
    }

    fn read_best(&self, key: ScoreKey) -> Result<u32, StorageError> {
        let storage_key = key.storage_key();
        match self.read(&storage_key)? {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| StorageError::Corrupt { key: storage_key }),
            None => Ok(0),
        }
    }

    fn read_streak(&self) -> Result<StreakState, StorageError> {
        match self.read(STREAK_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|_| StorageError::Corrupt {
                key: STREAK_KEY.to_string(),
            }),
            None => Ok(StreakState::default()),
        }
    }

    fn write_streak(&mut self, state: StreakState) -> Result<(), StorageError> {
        let json = serde_json::to_string(&state).map_err(|e| StorageError::Write {
            key: STREAK_KEY.to_string(),
            reason: e.to_string(),
        })?;
        self.backend.set(STREAK_KEY, &json)
    }
}

impl<B: KeyValueBackend> RecordStore for KeyValueRecordStore<B> {
    fn best(&self, key: ScoreKey) -> u32 {
        self.read_best(key).unwrap_or_else(|e| {
            log::warn!("Best score for {} unreadable, using 0: {}", key, e);
            0
        })
    }

    fn set_best(&mut self, key: ScoreKey, value: u32) {
        if let Err(e) = self.backend.set(&key.storage_key(), &value.to_string()) {
            log::warn!("Best score for {} not saved: {}", key, e);
        }
    }

    fn streak(&self) -> StreakState {
        self.read_streak().unwrap_or_else(|e| {
            log::warn!("Streak unreadable, starting over: {}", e);
            StreakState::default()
        })
    }

    fn set_streak(&mut self, state: StreakState) {
        if let Err(e) = self.write_streak(state) {
            log::warn!("Streak not saved: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Difficulty, ModeKind};
    use chrono::NaiveDate;

    /// Backend where every operation fails
    struct BrokenBackend;

    impl KeyValueBackend for BrokenBackend {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read {
                key: key.to_string(),
                reason: "quota".into(),
            })
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_best_defaults_to_zero() {
        let store = MemoryStore::in_memory();
        assert_eq!(store.best(ScoreKey::new(ModeKind::Endless, None)), 0);
    }

    #[test]
    fn test_best_is_per_key() {
        let mut store = MemoryStore::in_memory();
        let easy = ScoreKey::new(ModeKind::Shrink, Some(Difficulty::Easy));
        let hard = ScoreKey::new(ModeKind::Shrink, Some(Difficulty::Hard));
        store.set_best(easy, 17);
        assert_eq!(store.best(easy), 17);
        assert_eq!(store.best(hard), 0);
        assert_eq!(
            store.backend().get("aim_warmup_best_shrink_easy").unwrap(),
            Some("17".to_string())
        );
    }

    #[test]
    fn test_streak_round_trip() {
        let mut store = MemoryStore::in_memory();
        assert_eq!(store.streak(), StreakState::default());
        let state = StreakState::new(3, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        store.set_streak(state);
        assert_eq!(store.streak(), state);
    }

    #[test]
    fn test_corrupt_values_fall_back() {
        let mut backend = MemoryBackend::new();
        backend.set("aim_warmup_best_endless", "lots").unwrap();
        backend.set(STREAK_KEY, "{not json").unwrap();
        let store = KeyValueRecordStore::new(backend);
        assert_eq!(store.best(ScoreKey::new(ModeKind::Endless, None)), 0);
        assert_eq!(store.streak(), StreakState::default());
    }

    #[test]
    fn test_broken_backend_never_surfaces() {
        let mut store = KeyValueRecordStore::new(BrokenBackend);
        let key = ScoreKey::new(ModeKind::Warmup, None);
        store.set_best(key, 40);
        assert_eq!(store.best(key), 0);
        store.set_streak(StreakState::default());
        assert_eq!(store.streak(), StreakState::default());
    }

    #[test]
    fn test_error_messages() {
        let err = StorageError::Corrupt {
            key: STREAK_KEY.to_string(),
        };
        assert_eq!(err.to_string(), "corrupt value under `aim_warmup_streak`");
    }
}

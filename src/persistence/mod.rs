//! Resumable progress
//!
//! A single save slot, written on every zone completion. Records older than
//! `SAVE_TTL_MS` are treated as absent. Storage failures are logged and
//! absorbed; they never reach gameplay.

mod storage;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use storage::{MemoryStorage, Storage};

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LIVES, SAVE_TTL_MS};
use crate::error::StorageError;

/// Wall-clock source for save timestamps
pub trait Clock {
    /// Milliseconds since the Unix epoch
    fn now_ms(&self) -> u64;
}

impl<F: Fn() -> u64> Clock for F {
    fn now_ms(&self) -> u64 {
        self()
    }
}

/// Storage key of the progress record
pub const SAVE_KEY: &str = "zone-runner-progress";

fn default_lives() -> u8 {
    MAX_LIVES
}

/// Persisted progress: the zone to resume into, plus run totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    #[serde(default)]
    pub current_zone: usize,
    #[serde(default)]
    pub score: u64,
    #[serde(default = "default_lives")]
    pub lives: u8,
    /// Wall-clock milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl SaveState {
    /// Younger than the save TTL at `now`
    pub fn is_fresh(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) < SAVE_TTL_MS
    }

    /// Lives to resume with; an out-of-range count restarts at full lives
    pub fn resume_lives(&self) -> u8 {
        if (1..=MAX_LIVES).contains(&self.lives) {
            self.lives
        } else {
            MAX_LIVES
        }
    }
}

/// The progress record under one storage key
#[derive(Debug, Clone)]
pub struct SaveSlot {
    key: String,
}

impl Default for SaveSlot {
    fn default() -> Self {
        Self::new(SAVE_KEY)
    }
}

impl SaveSlot {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn read(&self, storage: &dyn Storage) -> Result<Option<SaveState>, StorageError> {
        match storage.get(&self.key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// The stored record, if present, readable, and fresh at `now`
    pub fn load(&self, storage: &dyn Storage, now: u64) -> Option<SaveState> {
        match self.read(storage) {
            Ok(Some(save)) if save.is_fresh(now) => Some(save),
            Ok(Some(_)) => {
                log::debug!("Ignoring expired save");
                None
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to load save: {}", e);
                None
            }
        }
    }

    /// Overwrite the stored record. Returns false if it could not be written.
    pub fn write(&self, storage: &mut dyn Storage, save: &SaveState) -> bool {
        let result = serde_json::to_string(save)
            .map_err(StorageError::from)
            .and_then(|json| storage.set(&self.key, &json));
        match result {
            Ok(()) => {
                log::info!(
                    "Progress saved (zone {}, score {}, lives {})",
                    save.current_zone + 1,
                    save.score,
                    save.lives
                );
                true
            }
            Err(e) => {
                log::warn!("Failed to save progress: {}", e);
                false
            }
        }
    }

    pub fn clear(&self, storage: &mut dyn Storage) {
        if let Err(e) = storage.remove(&self.key) {
            log::warn!("Failed to clear save: {}", e);
        }
    }
}

//! Player preferences
//!
//! Persisted separately from the progress save, under their own key.

use serde::{Deserialize, Serialize};

use crate::persistence::Storage;

/// Player preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0 - 100)
    pub volume: u8,
    pub muted: bool,

    // === Feedback ===
    /// Vibrate on jump, hit and zone clear
    pub haptics: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            volume: 80,
            muted: false,
            haptics: true,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "zone-runner-settings";

    /// Volume as a gain in [0, 1]
    pub fn volume_fraction(&self) -> f32 {
        self.volume.min(100) as f32 / 100.0
    }

    /// Load settings, falling back to defaults on any failure
    pub fn load(storage: &dyn Storage) -> Self {
        match storage.get(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Settings>(&json) {
                Ok(mut settings) => {
                    settings.volume = settings.volume.min(100);
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid stored settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Failed to read settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        let result = serde_json::to_string(self)
            .map_err(crate::error::StorageError::from)
            .and_then(|json| storage.set(Self::STORAGE_KEY, &json));
        match result {
            Ok(()) => log::debug!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

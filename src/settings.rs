//! Player preferences
//!
//! Persisted separately from scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SENSITIVITY, MAX_SENSITIVITY, MIN_SENSITIVITY};

/// Player settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Aiming ===
    /// Crosshair mode: hit-test at a virtual cursor instead of the pointer
    pub raw_aim: bool,
    /// Raw-aim cursor speed multiplier
    pub sensitivity: f32,

    // === Feedback ===
    pub sound: bool,
    /// Host-app vibration
    pub haptics: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Time-to-hit bar in Endless
    pub show_pace_bar: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flash)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            raw_aim: false,
            sensitivity: DEFAULT_SENSITIVITY,

            sound: true,
            haptics: true,
            master_volume: 0.8,
            show_pace_bar: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Copy with every numeric field pulled back into range
    pub fn sanitized(&self) -> Self {
        let mut s = self.clone();
        s.sensitivity = if s.sensitivity.is_finite() {
            s.sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY)
        } else {
            DEFAULT_SENSITIVITY
        };
        s.master_volume = if s.master_volume.is_finite() {
            s.master_volume.clamp(0.0, 1.0)
        } else {
            Self::default().master_volume
        };
        s
    }

    /// Effective miss shake/flash (respects reduced_motion)
    pub fn effective_miss_flash(&self) -> bool {
        !self.reduced_motion
    }

    /// Volume actually applied to cues
    pub fn effective_volume(&self) -> f32 {
        if self.sound {
            self.master_volume
        } else {
            0.0
        }
    }

    /// Parse stored JSON; unknown or missing fields take defaults
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str::<Settings>(json)
            .ok()
            .map(|s| s.sanitized())
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "aim_warmup_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                log::warn!("Stored settings unreadable, using defaults");
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                    log::warn!("Settings not saved");
                    return;
                }
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

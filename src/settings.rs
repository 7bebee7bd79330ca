//! Player preferences
//!
//! Persisted separately from the best time in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{DIRECT_FACTOR, SMOOTH_FACTOR};

/// How tightly the spaceship follows the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlMode {
    /// Eases toward the pointer (20% of the gap per sample)
    #[default]
    Smooth,
    /// Snaps to the pointer
    Direct,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Smooth => "Smooth",
            ControlMode::Direct => "Direct",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "smooth" => Some(ControlMode::Smooth),
            "direct" | "snap" => Some(ControlMode::Direct),
            _ => None,
        }
    }

    /// Interpolation factor applied to each pointer sample
    pub fn smoothing_factor(&self) -> f32 {
        match self {
            ControlMode::Smooth => SMOOTH_FACTOR,
            ControlMode::Direct => DIRECT_FACTOR,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pointer follow mode
    pub control: ControlMode,
    /// Explicit smoothing override in (0, 1]; takes precedence over `control`
    pub smoothing_override: Option<f32>,
}

impl Settings {
    /// Effective smoothing factor, clamped to (0, 1]
    pub fn smoothing_factor(&self) -> f32 {
        match self.smoothing_override {
            Some(f) if f.is_finite() && f > 0.0 => f.min(1.0),
            _ => self.control.smoothing_factor(),
        }
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "asteroid_dodge_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
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
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
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

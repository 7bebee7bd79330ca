//! Best survival time record
//!
//! Stored under the `bestTime` key as a bare integer, the same value the page
//! has always written, so existing records carry over.

use crate::error::StorageError;
use crate::persistence::Storage;

/// Best-time recorder backed by a key-value store
#[derive(Debug)]
pub struct BestTimeStore<S: Storage> {
    storage: S,
}

impl<S: Storage> BestTimeStore<S> {
    /// Storage key
    const STORAGE_KEY: &'static str = "bestTime";

    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stored best time in seconds; `None` when missing or corrupt
    pub fn get_best_time(&self) -> Option<u32> {
        let raw = self.storage.get_item(Self::STORAGE_KEY)?;
        match serde_json::from_str::<u32>(raw.trim()) {
            Ok(secs) => Some(secs),
            Err(e) => {
                log::warn!("Ignoring corrupt best time {:?}: {}", raw, e);
                None
            }
        }
    }

    /// Replace the stored best time
    pub fn set_best_time(&mut self, secs: u32) -> Result<(), StorageError> {
        let json = serde_json::to_string(&secs).map_err(|e| StorageError::WriteFailed {
            key: Self::STORAGE_KEY.to_string(),
            message: e.to_string(),
        })?;
        self.storage.set_item(Self::STORAGE_KEY, &json)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// Format seconds as `Hh Mm Ss`, dropping leading zero units
pub fn format_duration(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// HUD line for the running timer
pub fn timer_text(elapsed_secs: u32) -> String {
    format!("Time: {}", format_duration(elapsed_secs))
}

/// HUD line for the best time
pub fn best_time_text(best_secs: u32) -> String {
    format!("Best Time: {}", format_duration(best_secs))
}

//! Survival clock and best-time tracking

use serde::{Deserialize, Serialize};

/// Seconds survived in the current run, plus the best ever
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivalTimer {
    elapsed_seconds: u32,
    best_seconds: u32,
}

impl SurvivalTimer {
    /// Start from a stored record
    pub fn with_best(best_seconds: u32) -> Self {
        Self {
            elapsed_seconds: 0,
            best_seconds,
        }
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn best_seconds(&self) -> u32 {
        self.best_seconds
    }

    /// One simulated second survived. Returns the new best if it was beaten.
    pub fn tick(&mut self) -> Option<u32> {
        self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        if self.elapsed_seconds > self.best_seconds {
            self.best_seconds = self.elapsed_seconds;
            Some(self.best_seconds)
        } else {
            None
        }
    }

    /// Back to zero for a new run; the best is kept
    pub fn reset(&mut self) {
        self.elapsed_seconds = 0;
    }
}

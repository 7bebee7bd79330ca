//! Spawn cadence and obstacle speed progression
//!
//! Two independent inputs drive difficulty: the viewport width picks a band
//! (spawn-interval floor and speed range), and elapsed run time shrinks the
//! spawn interval and grows a speed multiplier.

use serde::{Deserialize, Serialize};

use crate::tuning::{DEFAULT_BANDS, SpawnBand, Tuning};

/// Snapshot of the values the spawner reads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    pub spawn_interval_ms: f32,
    pub min_spawn_interval_ms: f32,
    pub speed_range: (f32, f32),
    pub multiplier: f32,
}

#[derive(Debug, Clone)]
pub struct DifficultyController {
    bands: Vec<SpawnBand>,
    band_index: usize,
    initial_spawn_interval_ms: f32,
    spawn_interval_decrement_ms: f32,
    multiplier_increment: f32,
    spawn_interval_ms: f32,
    multiplier: f32,
}

impl DifficultyController {
    /// Starts in the narrowest band until the first `recompute`
    pub fn new(tuning: &Tuning) -> Self {
        let bands = if tuning.bands.is_empty() {
            DEFAULT_BANDS.to_vec()
        } else {
            tuning.bands.iter().map(|band| band.sanitized()).collect()
        };
        Self {
            bands,
            band_index: 0,
            initial_spawn_interval_ms: tuning.initial_spawn_interval_ms,
            spawn_interval_decrement_ms: tuning.spawn_interval_decrement_ms,
            multiplier_increment: tuning.difficulty_increment,
            spawn_interval_ms: tuning.initial_spawn_interval_ms,
            multiplier: 1.0,
        }
    }

    /// Index of the band a viewport width falls into. Negative or NaN widths
    /// land in the narrowest band.
    pub fn band_for(&self, viewport_width: f32) -> usize {
        if viewport_width.is_nan() || viewport_width < 0.0 {
            return 0;
        }
        self.bands
            .iter()
            .position(|band| match band.max_width {
                Some(max) => viewport_width <= max,
                None => true,
            })
            .unwrap_or(self.bands.len().saturating_sub(1))
    }

    /// Re-select the band for a new viewport width. Returns true if the band changed.
    pub fn recompute(&mut self, viewport_width: f32) -> bool {
        let index = self.band_for(viewport_width);
        let changed = index != self.band_index;
        self.band_index = index;
        // Keep the current interval above the new floor
        self.spawn_interval_ms = self.spawn_interval_ms.max(self.min_spawn_interval_ms());
        changed
    }

    fn band(&self) -> SpawnBand {
        self.bands[self.band_index]
    }

    pub fn band_index(&self) -> usize {
        self.band_index
    }

    pub fn min_spawn_interval_ms(&self) -> f32 {
        self.band().min_spawn_interval_ms
    }

    pub fn speed_range(&self) -> (f32, f32) {
        let band = self.band();
        (band.min_speed, band.max_speed)
    }

    pub fn spawn_interval_ms(&self) -> f32 {
        self.spawn_interval_ms
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Once per second: shrink the spawn interval toward the band floor
    pub fn decay_spawn_interval(&mut self) {
        let floor = self.min_spawn_interval_ms();
        if self.spawn_interval_ms > floor {
            self.spawn_interval_ms = (self.spawn_interval_ms - self.spawn_interval_decrement_ms).max(floor);
        }
    }

    /// Every difficulty period: speed everything up (uncapped)
    pub fn bump_multiplier(&mut self) {
        self.multiplier += self.multiplier_increment;
    }

    /// Back to run-start values (called once per respawn)
    pub fn reset_run(&mut self) {
        self.multiplier = 1.0;
        self.spawn_interval_ms = self.initial_spawn_interval_ms.max(self.min_spawn_interval_ms());
    }

    pub fn snapshot(&self) -> DifficultyState {
        DifficultyState {
            spawn_interval_ms: self.spawn_interval_ms,
            min_spawn_interval_ms: self.min_spawn_interval_ms(),
            speed_range: self.speed_range(),
            multiplier: self.multiplier,
        }
    }
}

//! Data-driven game balance
//!
//! [`Tuning`] mirrors every balance constant in [`crate::consts`]. Missing keys
//! in a JSON override fall back to the compile-time defaults, so a page can
//! ship a partial file that only touches what it cares about.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// One viewport-width band of the difficulty table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBand {
    /// Inclusive upper bound on viewport width (`None` = everything wider)
    pub max_width: Option<f32>,
    /// Floor for the spawn interval in this band
    pub min_spawn_interval_ms: f32,
    pub min_speed: f32,
    pub max_speed: f32,
}

impl SpawnBand {
    const fn new(max_width: Option<f32>, interval: f32, min_speed: f32, max_speed: f32) -> Self {
        Self {
            max_width,
            min_spawn_interval_ms: interval,
            min_speed,
            max_speed,
        }
    }

    /// Clamp to values the spawner can use: a positive speed range with
    /// `max_speed >= min_speed`, and a non-negative interval floor
    pub fn sanitized(self) -> Self {
        let min_speed = if self.min_speed.is_finite() {
            self.min_speed.max(MIN_OBSTACLE_SPEED)
        } else {
            MIN_OBSTACLE_SPEED
        };
        let max_speed = if self.max_speed.is_finite() {
            self.max_speed.max(min_speed)
        } else {
            min_speed
        };
        let min_spawn_interval_ms = if self.min_spawn_interval_ms.is_finite() {
            self.min_spawn_interval_ms.max(0.0)
        } else {
            0.0
        };
        Self {
            max_width: self.max_width,
            min_spawn_interval_ms,
            min_speed,
            max_speed,
        }
    }
}

/// Reference band table, narrowest first
pub const DEFAULT_BANDS: [SpawnBand; 6] = [
    SpawnBand::new(Some(400.0), 500.0, 2.0, 8.0),
    SpawnBand::new(Some(500.0), 400.0, 2.0, 8.0),
    SpawnBand::new(Some(600.0), 300.0, 2.0, 8.0),
    SpawnBand::new(Some(800.0), 200.0, 3.0, 9.0),
    SpawnBand::new(Some(1200.0), 150.0, 5.0, 15.0),
    SpawnBand::new(None, 50.0, 10.0, 20.0),
];

/// Runtime-tunable balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Spawning
    pub bands: Vec<SpawnBand>,
    pub initial_spawn_interval_ms: f32,
    pub spawn_interval_decrement_ms: f32,
    pub spawn_decay_period_ms: u64,

    // Difficulty
    pub difficulty_increment: f32,
    pub difficulty_period_ms: u64,

    // Timers
    pub survival_tick_ms: u64,
    pub respawn_delay_ms: u64,
    pub invincibility_ms: u64,
    pub clear_sweep_ms: u64,
    pub explosion_ms: u64,

    // Entities
    pub player_size: f32,
    pub obstacle_size: f32,

    // Input
    pub pointer_throttle_ms: u64,

    // Host clock
    pub max_frame_gap_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS.to_vec(),
            initial_spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            spawn_interval_decrement_ms: SPAWN_INTERVAL_DECREMENT_MS,
            spawn_decay_period_ms: SPAWN_DECAY_PERIOD_MS,

            difficulty_increment: DIFFICULTY_INCREMENT,
            difficulty_period_ms: DIFFICULTY_PERIOD_MS,

            survival_tick_ms: SURVIVAL_TICK_MS,
            respawn_delay_ms: RESPAWN_DELAY_MS,
            invincibility_ms: INVINCIBILITY_MS,
            clear_sweep_ms: CLEAR_SWEEP_MS,
            explosion_ms: EXPLOSION_MS,

            player_size: PLAYER_SIZE,
            obstacle_size: OBSTACLE_SIZE,

            pointer_throttle_ms: POINTER_THROTTLE_MS,

            max_frame_gap_ms: MAX_FRAME_GAP_MS,
        }
    }
}

impl Tuning {
    /// LocalStorage key for an optional override
    pub const STORAGE_KEY: &'static str = "asteroid_dodge_tuning";

    /// Parse a (possibly partial) JSON override. Falls back to defaults on
    /// malformed input, and to the default table if the override empties it.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Tuning>(json) {
            Ok(mut tuning) => {
                if tuning.bands.is_empty() {
                    log::warn!("Tuning override has no spawn bands, using defaults");
                    tuning.bands = DEFAULT_BANDS.to_vec();
                }
                for band in tuning.bands.iter_mut() {
                    let clamped = band.sanitized();
                    if clamped != *band {
                        log::warn!("Clamped spawn band {:?} to {:?}", band, clamped);
                        *band = clamped;
                    }
                }
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring malformed tuning override: {}", e);
                Self::default()
            }
        }
    }
}

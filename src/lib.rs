//! Asteroid Dodge - A browser arcade survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, respawn state machine)
//! - `renderer`: Renderer trait plus DOM and recording implementations
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `tuning`: Data-driven game balance

pub mod best_time;
pub mod error;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use best_time::{BestTimeStore, format_duration};
pub use error::{RenderError, StorageError};
pub use settings::{ControlMode, Settings};
pub use sim::{GamePhase, GameSession};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Target frame duration (~60 Hz)
    pub const FRAME_MS: u64 = 16;
    /// Longest stretch of host time a single frame may simulate
    pub const MAX_FRAME_GAP_MS: u64 = 100;

    /// Spawn cadence
    pub const INITIAL_SPAWN_INTERVAL_MS: f32 = 1000.0;
    pub const SPAWN_INTERVAL_DECREMENT_MS: f32 = 50.0;
    pub const SPAWN_DECAY_PERIOD_MS: u64 = 1000;

    /// Difficulty ramp: multiplier grows by this much every period, reset on respawn
    pub const DIFFICULTY_INCREMENT: f32 = 0.1;
    pub const DIFFICULTY_PERIOD_MS: u64 = 5000;

    /// Survival timer resolution
    pub const SURVIVAL_TICK_MS: u64 = 1000;

    /// Respawn sequence
    pub const RESPAWN_DELAY_MS: u64 = 3000;
    pub const INVINCIBILITY_MS: u64 = 3000;
    /// Clear sweep cadence while the player is down
    pub const CLEAR_SWEEP_MS: u64 = 16;
    /// Explosion visual lifetime
    pub const EXPLOSION_MS: u64 = 1000;

    /// Entity extents (pixels)
    pub const PLAYER_SIZE: f32 = 50.0;
    pub const OBSTACLE_SIZE: f32 = 50.0;
    /// Slowest an obstacle may fall (px per frame); zero would never leave the field
    pub const MIN_OBSTACLE_SPEED: f32 = 0.5;

    /// Pointer sampling throttle (~60 Hz)
    pub const POINTER_THROTTLE_MS: u64 = 16;

    /// Smoothing factors for the two control modes
    pub const SMOOTH_FACTOR: f32 = 0.2;
    pub const DIRECT_FACTOR: f32 = 1.0;
}

/// Axis-aligned rectangle in play-area coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box of `size` centred on `center`
    #[inline]
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Box of `size` whose top-left corner is `top_left`
    #[inline]
    pub fn from_top_left(top_left: Vec2, size: Vec2) -> Self {
        Self {
            min: top_left,
            max: top_left + size,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap on both axes (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Linear interpolation from `from` toward `to` by `t`
#[inline]
pub fn approach(from: Vec2, to: Vec2, t: f32) -> Vec2 {
    from + (to - from) * t
}

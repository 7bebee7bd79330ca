//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Simulated time only (the host passes `now` in)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies (renderer calls are queued)

pub mod collision;
pub mod difficulty;
pub mod obstacles;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod survival;
pub mod tick;
pub mod tracker;

pub use collision::check_all;
pub use difficulty::{DifficultyController, DifficultyState};
pub use obstacles::ObstacleManager;
pub use scheduler::{Scheduler, TimerEvent, TimerHandle};
pub use session::GameSession;
pub use state::{
    EntityId, EntityIds, Explosion, GameEvent, GamePhase, GameState, Obstacle, PLAYER_ID, Player,
};
pub use survival::SurvivalTimer;
pub use tick::{fire, frame, step};
pub use tracker::PositionTracker;

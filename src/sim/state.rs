//! Game state and core simulation types
//!
//! Everything a session mutates lives in [`GameState`]; there are no globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyController;
use super::obstacles::ObstacleManager;
use super::scheduler::{Scheduler, TimerHandle};
use super::survival::SurvivalTimer;
use crate::renderer::{PlayArea, RenderCommand};
use crate::tuning::Tuning;

/// Stable entity identifier shared with the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// The spaceship is always entity 0
pub const PLAYER_ID: EntityId = EntityId(0);

/// Monotonic id source for obstacles and explosions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    /// Allocate a new entity ID
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Current phase of the respawn cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Normal play
    Running,
    /// Collision just occurred, run is being torn down
    Dying,
    /// Waiting out the respawn delay
    Respawning,
    /// Control returned, hits are ignored
    Invincible,
}

impl GamePhase {
    /// Player is on screen and under control
    pub fn is_alive(&self) -> bool {
        matches!(self, GamePhase::Running | GamePhase::Invincible)
    }
}

/// The player's spaceship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Centre of the ship (play-area-local)
    pub pos: Vec2,
    pub size: Vec2,
    pub invincible: bool,
    pub alive: bool,
}

impl Player {
    pub fn new(pos: Vec2, size: f32) -> Self {
        Self {
            pos,
            size: Vec2::splat(size),
            invincible: false,
            alive: true,
        }
    }

    pub fn bounds(&self) -> crate::Aabb {
        crate::Aabb::from_center(self.pos, self.size)
    }
}

/// A falling asteroid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    /// Top-left corner (play-area-local)
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels per frame tick
    pub vertical_speed: f32,
    pub spawn_time_ms: u64,
}

impl Obstacle {
    pub fn bounds(&self) -> crate::Aabb {
        crate::Aabb::from_top_left(self.pos, self.size)
    }
}

/// Explosion visual left behind by a hit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    /// Centre of the blast
    pub pos: Vec2,
}

/// Notable things that happened during a frame, drained by the session
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Player was hit; run torn down
    PlayerHit { at: Vec2, obstacles: usize },
    /// Control returned after the respawn delay
    Respawned,
    InvincibilityEnded,
    /// Clear sweep drained every in-flight obstacle
    SweepFinished,
    /// Survival time beat the stored record
    NewBest(u32),
}

/// Complete state of one session
#[derive(Debug)]
pub struct GameState {
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Player,
    pub obstacles: ObstacleManager,
    pub explosions: Vec<Explosion>,
    pub difficulty: DifficultyController,
    pub survival: SurvivalTimer,
    pub scheduler: Scheduler,
    /// Last known play-area bounds
    pub play_area: PlayArea,
    /// Clear sweep is draining obstacles; per-frame advancing is suspended
    pub sweeping: bool,
    /// Survival, spawn-decay and difficulty timers of the current run
    pub(crate) run_timers: Vec<TimerHandle>,
    pub(crate) sweep_timer: Option<TimerHandle>,
    /// Pending renderer calls for this frame
    pub commands: Vec<RenderCommand>,
    /// Pending notifications for this frame
    pub events: Vec<GameEvent>,
    pub(crate) ids: EntityIds,
}

impl GameState {
    /// Create a fresh state; nothing is scheduled until the run starts
    pub fn new(seed: u64, tuning: Tuning, play_area: PlayArea, viewport_width: f32) -> Self {
        let mut difficulty = DifficultyController::new(&tuning);
        difficulty.recompute(viewport_width);

        Self {
            obstacles: ObstacleManager::new(Pcg32::seed_from_u64(seed), tuning.obstacle_size),
            player: Player::new(play_area.center_local(), tuning.player_size),
            phase: GamePhase::Running,
            explosions: Vec::new(),
            difficulty,
            survival: SurvivalTimer::default(),
            scheduler: Scheduler::new(),
            play_area,
            sweeping: false,
            run_timers: Vec::new(),
            sweep_timer: None,
            commands: Vec::new(),
            events: Vec::new(),
            ids: EntityIds::default(),
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// Spawning is allowed only while the player is up and nothing is being swept
    pub(crate) fn refresh_spawn_gate(&mut self) {
        self.obstacles.spawn_paused = !self.phase.is_alive() || self.sweeping;
    }
}

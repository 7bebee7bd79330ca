//! Asteroid spawning, movement and retirement

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::difficulty::DifficultyController;
use super::state::{EntityId, EntityIds, Obstacle};
use crate::renderer::{EntityKind, RenderCommand};

/// Owns the live obstacle set (sorted by id for deterministic iteration)
#[derive(Debug)]
pub struct ObstacleManager {
    obstacles: Vec<Obstacle>,
    /// Set during the death/clear/respawn window
    pub spawn_paused: bool,
    last_spawn_ms: Option<u64>,
    obstacle_size: f32,
    rng: Pcg32,
}

impl ObstacleManager {
    pub fn new(rng: Pcg32, obstacle_size: f32) -> Self {
        Self {
            obstacles: Vec::new(),
            spawn_paused: false,
            last_spawn_ms: None,
            obstacle_size,
            rng,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Next spawn happens on the first eligible check
    pub fn reset_spawn_clock(&mut self) {
        self.last_spawn_ms = None;
    }

    /// Spawn one obstacle if unpaused and the spawn interval has elapsed
    pub fn try_spawn(
        &mut self,
        now_ms: u64,
        difficulty: &DifficultyController,
        area_width: f32,
        ids: &mut EntityIds,
        commands: &mut Vec<RenderCommand>,
    ) -> Option<EntityId> {
        if self.spawn_paused {
            return None;
        }
        if let Some(last) = self.last_spawn_ms {
            let since = now_ms.saturating_sub(last) as f32;
            if since < difficulty.spawn_interval_ms() {
                return None;
            }
        }

        let x = if area_width > 0.0 {
            self.rng.random_range(0.0..area_width)
        } else {
            0.0
        };
        let (min_speed, max_speed) = difficulty.speed_range();
        let base_speed = if max_speed > min_speed {
            self.rng.random_range(min_speed..max_speed)
        } else {
            min_speed
        };
        let speed = base_speed * difficulty.multiplier();

        // Top edge just above the visible area
        let pos = Vec2::new(x, -self.obstacle_size);
        let id = ids.next_id();
        self.spawn_at(id, pos, speed, now_ms, commands);
        self.last_spawn_ms = Some(now_ms);

        log::debug!("Spawned obstacle {} at x={:.0} speed={:.2}", id.0, x, speed);
        Some(id)
    }

    /// Place a specific obstacle (scripted starts, tests)
    pub fn spawn_at(
        &mut self,
        id: EntityId,
        pos: Vec2,
        vertical_speed: f32,
        now_ms: u64,
        commands: &mut Vec<RenderCommand>,
    ) {
        let obstacle = Obstacle {
            id,
            pos,
            size: Vec2::splat(self.obstacle_size),
            vertical_speed,
            spawn_time_ms: now_ms,
        };
        commands.push(RenderCommand::Add {
            id,
            kind: EntityKind::Obstacle,
            pos,
        });

        // Ids are allocated monotonically, so pushing keeps the order except
        // for scripted ids; fall back to a sorted insert for those.
        match self.obstacles.last() {
            Some(last) if last.id > id => {
                let at = self.obstacles.partition_point(|o| o.id < id);
                self.obstacles.insert(at, obstacle);
            }
            _ => self.obstacles.push(obstacle),
        }
    }

    /// Move every obstacle down by its speed; retire those past the bottom edge.
    /// Returns the retired ids.
    pub fn advance_all(&mut self, area_height: f32, commands: &mut Vec<RenderCommand>) -> Vec<EntityId> {
        let mut retired = Vec::new();
        self.obstacles.retain_mut(|obstacle| {
            obstacle.pos.y += obstacle.vertical_speed;
            if obstacle.pos.y > area_height {
                commands.push(RenderCommand::Remove { id: obstacle.id });
                retired.push(obstacle.id);
                false
            } else {
                commands.push(RenderCommand::Move {
                    id: obstacle.id,
                    pos: obstacle.pos,
                });
                true
            }
        });
        retired
    }

    /// Destroy specific obstacles (collision). Returns what was removed, in id order.
    pub fn remove(&mut self, ids: &[EntityId], commands: &mut Vec<RenderCommand>) -> Vec<Obstacle> {
        let mut removed = Vec::new();
        self.obstacles.retain(|obstacle| {
            if ids.contains(&obstacle.id) {
                commands.push(RenderCommand::Remove { id: obstacle.id });
                removed.push(obstacle.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Destroy everything (session reset/dispose)
    pub fn clear(&mut self, commands: &mut Vec<RenderCommand>) {
        for obstacle in self.obstacles.drain(..) {
            commands.push(RenderCommand::Remove { id: obstacle.id });
        }
    }
}

//! Frame tick and respawn state machine
//!
//! One call to [`frame`] per rendered frame: due timers fire first, then
//! spawn-check, advance, collision-check, always in that order. Every timer
//! callback is a named transition that can be invoked directly.

use glam::Vec2;

use super::collision::check_all;
use super::scheduler::TimerEvent;
use super::state::{EntityId, Explosion, GameEvent, GamePhase, GameState, PLAYER_ID};
use crate::best_time::{best_time_text, timer_text};
use crate::renderer::{EntityKind, Marker, RenderCommand, TextSlot};

/// Advance the session to `now_ms`: fire due timers, then run one frame step
pub fn frame(state: &mut GameState, now_ms: u64) {
    while let Some((_, event)) = state.scheduler.pop_due(now_ms) {
        fire(state, event);
    }
    state.scheduler.set_now(now_ms);
    step(state, now_ms);
}

/// Dispatch a timer event to its transition
pub fn fire(state: &mut GameState, event: TimerEvent) {
    match event {
        TimerEvent::SurvivalTick => on_survival_tick(state),
        TimerEvent::SpawnDecay => on_spawn_decay(state),
        TimerEvent::DifficultyTick => on_difficulty_tick(state),
        TimerEvent::RespawnDelay => on_respawn_delay_elapsed(state),
        TimerEvent::InvincibilityEnd => on_invincibility_elapsed(state),
        TimerEvent::ClearSweep => on_clear_sweep(state),
        TimerEvent::ExplosionExpired(id) => on_explosion_expired(state, id),
    }
}

/// One frame of simulation: spawn-check, advance-all, collision-check
pub fn step(state: &mut GameState, now_ms: u64) {
    let alive = state.phase.is_alive();

    if alive {
        let width = state.play_area.width;
        state.obstacles.try_spawn(
            now_ms,
            &state.difficulty,
            width,
            &mut state.ids,
            &mut state.commands,
        );
    }

    // The clear sweep owns obstacle movement while it runs
    if !state.sweeping {
        let height = state.play_area.height;
        state.obstacles.advance_all(height, &mut state.commands);
    }

    if alive {
        let hits = check_all(&state.player, state.obstacles.obstacles());
        if !hits.is_empty() {
            on_collision(state, &hits);
        }
    }
}

/// Begin a run: survival clock at zero, run timers armed, player vulnerable.
/// Used for the first start and for every respawn.
pub fn start_run(state: &mut GameState) {
    for handle in state.run_timers.drain(..) {
        state.scheduler.cancel(handle);
    }
    state.survival.reset();
    state.obstacles.reset_spawn_clock();

    let tuning = &state.tuning;
    let timers = [
        (tuning.survival_tick_ms, TimerEvent::SurvivalTick),
        (tuning.spawn_decay_period_ms, TimerEvent::SpawnDecay),
        (tuning.difficulty_period_ms, TimerEvent::DifficultyTick),
    ];
    for (interval, event) in timers {
        let handle = state.scheduler.schedule_repeating(interval, event);
        state.run_timers.push(handle);
    }

    state.commands.push(RenderCommand::Text {
        slot: TextSlot::Timer,
        text: timer_text(0),
    });
    state.refresh_spawn_gate();
}

/// `Running` → `Dying` → `Respawning`
pub fn on_collision(state: &mut GameState, hits: &[EntityId]) {
    if state.phase != GamePhase::Running || state.player.invincible {
        return;
    }
    state.phase = GamePhase::Dying;

    let removed = state.obstacles.remove(hits, &mut state.commands);
    let at = removed
        .first()
        .map(|o| o.bounds().center())
        .unwrap_or(state.player.pos);

    // Explosion visual
    let id = state.next_entity_id();
    state.explosions.push(Explosion { id, pos: at });
    state.commands.push(RenderCommand::Add {
        id,
        kind: EntityKind::Explosion,
        pos: at,
    });
    state
        .scheduler
        .schedule_once(state.tuning.explosion_ms, TimerEvent::ExplosionExpired(id));

    // Tear down the run: no stale ticks may touch the next one
    for handle in state.run_timers.drain(..) {
        state.scheduler.cancel(handle);
    }
    state.player.alive = false;
    state.commands.push(RenderCommand::Visibility {
        id: PLAYER_ID,
        visible: false,
    });

    // Drain whatever is still falling
    if !state.obstacles.is_empty() {
        begin_sweep(state);
    }
    state.refresh_spawn_gate();

    state.events.push(GameEvent::PlayerHit {
        at,
        obstacles: removed.len(),
    });

    // Dying → Respawning is immediate
    state.phase = GamePhase::Respawning;
    state
        .scheduler
        .schedule_once(state.tuning.respawn_delay_ms, TimerEvent::RespawnDelay);
}

/// `Respawning` → `Invincible`
pub fn on_respawn_delay_elapsed(state: &mut GameState) {
    if state.phase != GamePhase::Respawning {
        return;
    }
    state.phase = GamePhase::Invincible;
    state.player.alive = true;
    state.player.invincible = true;
    state.commands.push(RenderCommand::Visibility {
        id: PLAYER_ID,
        visible: true,
    });
    state.commands.push(RenderCommand::AddMarker {
        id: PLAYER_ID,
        marker: Marker::Invincible,
    });

    state.difficulty.reset_run();
    start_run(state);

    state
        .scheduler
        .schedule_once(state.tuning.invincibility_ms, TimerEvent::InvincibilityEnd);

    state.events.push(GameEvent::Respawned);
}

/// `Invincible` → `Running`
pub fn on_invincibility_elapsed(state: &mut GameState) {
    if state.phase != GamePhase::Invincible {
        return;
    }
    state.phase = GamePhase::Running;
    state.player.invincible = false;
    state.commands.push(RenderCommand::RemoveMarker {
        id: PLAYER_ID,
        marker: Marker::Invincible,
    });
    state.events.push(GameEvent::InvincibilityEnded);
}

/// Once per second while alive
pub fn on_survival_tick(state: &mut GameState) {
    if !state.phase.is_alive() {
        return;
    }
    let new_best = state.survival.tick();
    state.commands.push(RenderCommand::Text {
        slot: TextSlot::Timer,
        text: timer_text(state.survival.elapsed_seconds()),
    });
    state.commands.push(RenderCommand::Text {
        slot: TextSlot::BestTime,
        text: best_time_text(state.survival.best_seconds()),
    });
    if let Some(best) = new_best {
        state.events.push(GameEvent::NewBest(best));
    }
}

/// Once per second while alive
pub fn on_spawn_decay(state: &mut GameState) {
    if state.phase.is_alive() {
        state.difficulty.decay_spawn_interval();
    }
}

/// Every difficulty period while alive
pub fn on_difficulty_tick(state: &mut GameState) {
    if state.phase.is_alive() {
        state.difficulty.bump_multiplier();
        log::debug!("Difficulty multiplier now {:.1}", state.difficulty.multiplier());
    }
}

/// ~60 Hz while obstacles are being drained
pub fn on_clear_sweep(state: &mut GameState) {
    let height = state.play_area.height;
    state.obstacles.advance_all(height, &mut state.commands);

    if state.obstacles.is_empty() {
        if let Some(handle) = state.sweep_timer.take() {
            state.scheduler.cancel(handle);
        }
        state.sweeping = false;
        state.refresh_spawn_gate();
        state.events.push(GameEvent::SweepFinished);
    }
}

pub fn on_explosion_expired(state: &mut GameState, id: EntityId) {
    let before = state.explosions.len();
    state.explosions.retain(|e| e.id != id);
    if state.explosions.len() != before {
        state.commands.push(RenderCommand::Remove { id });
    }
}

fn begin_sweep(state: &mut GameState) {
    if state.sweep_timer.is_some() {
        return;
    }
    let handle = state
        .scheduler
        .schedule_repeating(state.tuning.clear_sweep_ms, TimerEvent::ClearSweep);
    state.sweep_timer = Some(handle);
    state.sweeping = true;
}

/// Player position changed: tell the renderer
pub(crate) fn player_moved(state: &mut GameState, pos: Vec2) {
    state.commands.push(RenderCommand::Move { id: PLAYER_ID, pos });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PlayArea;
    use crate::tuning::Tuning;

    fn running_state() -> GameState {
        let area = PlayArea::new(0.0, 0.0, 800.0, 600.0);
        let mut state = GameState::new(12345, Tuning::default(), area, 800.0);
        start_run(&mut state);
        state
    }

    /// Drop an obstacle right on top of the ship
    fn obstacle_on_player(state: &mut GameState) -> EntityId {
        let id = state.next_entity_id();
        let pos = state.player.pos - Vec2::splat(25.0);
        let now = state.scheduler.now();
        state.obstacles.spawn_at(id, pos, 0.0, now, &mut state.commands);
        id
    }

    /// Park the ship below the play area where nothing can reach it
    fn park_player(state: &mut GameState) {
        state.player.pos = Vec2::new(400.0, 2000.0);
    }

    fn run_until(state: &mut GameState, until_ms: u64) {
        let mut now = state.scheduler.now();
        while now < until_ms {
            now = (now + 16).min(until_ms);
            frame(state, now);
        }
    }

    #[test]
    fn test_first_frame_spawns_immediately() {
        let mut state = running_state();
        park_player(&mut state);
        frame(&mut state, 16);
        assert_eq!(state.obstacles.len(), 1);
    }

    #[test]
    fn test_collision_tears_down_run() {
        let mut state = running_state();
        park_player(&mut state);
        run_until(&mut state, 1000);
        state.player.pos = Vec2::new(400.0, 300.0);
        let hit = obstacle_on_player(&mut state);
        state.commands.clear();

        frame(&mut state, 1016);

        assert_eq!(state.phase, GamePhase::Respawning);
        assert!(!state.player.alive);
        assert!(state.obstacles.spawn_paused);
        assert!(state.obstacles.obstacles().iter().all(|o| o.id != hit));
        assert!(state.run_timers.is_empty());
        assert_eq!(state.explosions.len(), 1);
        assert!(state.commands.contains(&RenderCommand::Visibility {
            id: PLAYER_ID,
            visible: false
        }));
        assert!(matches!(
            state.events.last(),
            Some(GameEvent::PlayerHit { .. })
        ));
    }

    #[test]
    fn test_multiple_hits_in_one_tick() {
        let mut state = running_state();
        let a = obstacle_on_player(&mut state);
        let b = obstacle_on_player(&mut state);
        frame(&mut state, 16);

        assert_eq!(state.phase, GamePhase::Respawning);
        let ids: Vec<EntityId> = state.obstacles.obstacles().iter().map(|o| o.id).collect();
        assert!(!ids.contains(&a) && !ids.contains(&b));
    }

    #[test]
    fn test_full_respawn_cycle() {
        let mut state = running_state();
        obstacle_on_player(&mut state);
        frame(&mut state, 16);
        assert_eq!(state.phase, GamePhase::Respawning);

        run_until(&mut state, 16 + 2999);
        assert_eq!(state.phase, GamePhase::Respawning);

        run_until(&mut state, 16 + 3000);
        assert_eq!(state.phase, GamePhase::Invincible);
        assert!(state.player.alive);
        assert!(state.player.invincible);
        assert!(state.events.contains(&GameEvent::Respawned));
        assert!(!state.events.contains(&GameEvent::InvincibilityEnded));
        assert_eq!(state.difficulty.spawn_interval_ms(), 1000.0);
        assert_eq!(state.difficulty.multiplier(), 1.0);
        assert_eq!(state.survival.elapsed_seconds(), 0);

        park_player(&mut state);
        run_until(&mut state, 16 + 6000);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(!state.player.invincible);
        assert!(state.events.contains(&GameEvent::InvincibilityEnded));
    }

    #[test]
    fn test_invincible_player_survives_overlap() {
        let mut state = running_state();
        state.phase = GamePhase::Invincible;
        state.player.invincible = true;
        obstacle_on_player(&mut state);

        frame(&mut state, 16);
        assert_eq!(state.phase, GamePhase::Invincible);
        assert!(state.player.alive);
    }

    #[test]
    fn test_no_survival_ticks_while_down() {
        let mut state = running_state();
        park_player(&mut state);
        run_until(&mut state, 5000);
        assert_eq!(state.survival.elapsed_seconds(), 5);

        state.player.pos = Vec2::new(400.0, 300.0);
        obstacle_on_player(&mut state);
        run_until(&mut state, 5016);
        run_until(&mut state, 7000);
        assert_eq!(state.survival.elapsed_seconds(), 5);
        // Direct invocation is ignored as well
        on_survival_tick(&mut state);
        assert_eq!(state.survival.elapsed_seconds(), 5);
    }

    #[test]
    fn test_clear_sweep_drains_before_spawning() {
        let mut state = running_state();
        // A slow obstacle high up that takes a long time to fall out
        let id = state.next_entity_id();
        state
            .obstacles
            .spawn_at(id, Vec2::new(10.0, 0.0), 0.1, 0, &mut state.commands);
        obstacle_on_player(&mut state);
        frame(&mut state, 16);
        assert!(state.sweeping);

        // Respawn happens while the slow one is still falling
        run_until(&mut state, 16 + 3000);
        assert_eq!(state.phase, GamePhase::Invincible);
        assert!(state.sweeping);
        assert!(state.obstacles.spawn_paused);
        assert!(state.obstacles.obstacles().iter().any(|o| o.id == id));

        // Once the last one is gone the next sweep ends the drain
        state.obstacles.clear(&mut state.commands);
        on_clear_sweep(&mut state);
        assert!(!state.sweeping);
        assert!(!state.obstacles.spawn_paused);
        assert!(state.events.contains(&GameEvent::SweepFinished));
    }

    #[test]
    fn test_sweep_drains_with_zero_speed_bands() {
        let tuning = Tuning {
            bands: vec![crate::tuning::SpawnBand {
                max_width: None,
                min_spawn_interval_ms: 100.0,
                min_speed: 0.0,
                max_speed: 0.0,
            }],
            ..Tuning::default()
        };
        let area = PlayArea::new(0.0, 0.0, 800.0, 600.0);
        let mut state = GameState::new(9, tuning, area, 800.0);
        start_run(&mut state);
        park_player(&mut state);
        frame(&mut state, 16);
        assert_eq!(state.obstacles.len(), 1);

        state.player.pos = Vec2::new(400.0, 300.0);
        obstacle_on_player(&mut state);
        frame(&mut state, 32);
        assert_eq!(state.phase, GamePhase::Respawning);
        assert!(state.sweeping);

        park_player(&mut state);
        run_until(&mut state, 30_000);
        assert!(!state.sweeping);
        assert!(!state.obstacles.spawn_paused);
        assert!(state.events.contains(&GameEvent::SweepFinished));
    }

    #[test]
    fn test_explosion_expires() {
        let mut state = running_state();
        obstacle_on_player(&mut state);
        frame(&mut state, 16);
        let explosion = state.explosions[0].id;

        run_until(&mut state, 16 + 1000);
        assert!(state.explosions.is_empty());
        assert!(state.commands.contains(&RenderCommand::Remove { id: explosion }));
    }

    #[test]
    fn test_difficulty_ramps_every_five_seconds() {
        let mut state = running_state();
        park_player(&mut state);
        run_until(&mut state, 25_000);
        assert!((state.difficulty.multiplier() - 1.5).abs() < 1e-4);
        // 25 decays of 50ms from 1000, floored at 200 for an 800px viewport
        assert_eq!(state.difficulty.spawn_interval_ms(), 200.0);
    }

    #[test]
    fn test_stale_transitions_are_ignored() {
        let mut state = running_state();
        on_respawn_delay_elapsed(&mut state);
        assert_eq!(state.phase, GamePhase::Running);
        on_invincibility_elapsed(&mut state);
        assert_eq!(state.phase, GamePhase::Running);
    }
}

//! Session lifecycle: the one owner of all game state and collaborators
//!
//! The host creates a session with its renderer and storage, calls
//! [`GameSession::start`], then feeds it animation frames, pointer samples and
//! resize events. Simulation state is committed before anything is rendered,
//! so a failing render call only costs that frame's visuals.

use glam::Vec2;

use super::state::{GameEvent, GamePhase, GameState, PLAYER_ID};
use super::survival::SurvivalTimer;
use super::tick;
use super::tracker::PositionTracker;
use crate::best_time::{BestTimeStore, best_time_text};
use crate::error::RenderError;
use crate::persistence::Storage;
use crate::renderer::{self, EntityKind, Marker, RenderCommand, Renderer};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// A running game bound to its renderer and storage
pub struct GameSession<R: Renderer, S: Storage> {
    state: GameState,
    renderer: R,
    best_time: BestTimeStore<S>,
    tracker: PositionTracker,
    started: bool,
    /// Host timestamp of the previous frame
    last_host_ms: Option<u64>,
}

impl<R: Renderer, S: Storage> GameSession<R, S> {
    /// Build a session. Reads the stored best time once; a missing or corrupt
    /// record counts as 0.
    pub fn create(
        renderer: R,
        storage: S,
        settings: &Settings,
        tuning: Tuning,
        seed: u64,
        viewport_width: f32,
    ) -> Self {
        let best_time = BestTimeStore::new(storage);
        let best = best_time.get_best_time().unwrap_or(0);
        let tracker = PositionTracker::new(settings.smoothing_factor(), tuning.pointer_throttle_ms);

        let mut state = GameState::new(seed, tuning, renderer.play_area(), viewport_width);
        state.survival = SurvivalTimer::with_best(best);

        log::info!(
            "Session created (seed {}, best {}s, band {}, smoothing {:.1})",
            seed,
            best,
            state.difficulty.band_index(),
            tracker.smoothing_factor()
        );

        Self {
            state,
            renderer,
            best_time,
            tracker,
            started: false,
            last_host_ms: None,
        }
    }

    /// Show the ship and begin the first run. Calling it again is a no-op.
    pub fn start(&mut self, now_ms: u64) -> Result<(), RenderError> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.last_host_ms = Some(now_ms);
        self.state.scheduler.set_now(now_ms);

        let pos = self.state.player.pos;
        self.state.commands.push(RenderCommand::Add {
            id: PLAYER_ID,
            kind: EntityKind::Player,
            pos,
        });
        self.state.commands.push(RenderCommand::Text {
            slot: renderer::TextSlot::BestTime,
            text: best_time_text(self.state.survival.best_seconds()),
        });
        tick::start_run(&mut self.state);

        log::info!("Run started at {}ms", now_ms);
        self.flush()
    }

    /// Throw away the current run and start over immediately, keeping the best time
    pub fn reset(&mut self, now_ms: u64) -> Result<(), RenderError> {
        if !self.started {
            return self.start(now_ms);
        }
        self.teardown();
        let now = self.advance_clock(now_ms);
        self.state.scheduler.set_now(now);

        let state = &mut self.state;
        state.phase = GamePhase::Running;
        state.player.pos = state.play_area.center_local();
        state.player.alive = true;
        state.player.invincible = false;
        state.commands.push(RenderCommand::Move {
            id: PLAYER_ID,
            pos: state.player.pos,
        });
        state.commands.push(RenderCommand::Visibility {
            id: PLAYER_ID,
            visible: true,
        });
        state.commands.push(RenderCommand::RemoveMarker {
            id: PLAYER_ID,
            marker: Marker::Invincible,
        });
        state.difficulty.reset_run();
        tick::start_run(state);

        log::info!("Session reset at {}ms", now_ms);
        self.flush()
    }

    /// Stop everything, remove every visual, and hand back the collaborators
    pub fn dispose(mut self) -> (R, S) {
        if self.started {
            self.teardown();
            self.state.commands.push(RenderCommand::Remove { id: PLAYER_ID });
            if let Err(e) = self.flush() {
                log::warn!("Render error while disposing session: {}", e);
            }
        }
        log::info!("Session disposed");
        let GameSession {
            renderer, best_time, ..
        } = self;
        (renderer, best_time.into_storage())
    }

    /// One animation frame at host time `now_ms` (a monotonic clock such as the
    /// `requestAnimationFrame` timestamp). The next frame must be requested
    /// regardless of the result.
    pub fn frame(&mut self, now_ms: u64) -> Result<(), RenderError> {
        if !self.started {
            return Ok(());
        }
        self.state.play_area = self.renderer.play_area();
        let now = self.advance_clock(now_ms);
        tick::frame(&mut self.state, now);
        self.handle_events();
        self.flush()
    }

    /// Pointer (mouse or touch) moved to client coordinates (x, y)
    pub fn on_pointer_sample(&mut self, x: f32, y: f32, timestamp_ms: u64) -> Result<(), RenderError> {
        let area = self.renderer.play_area();
        let moved = self.tracker.on_pointer_sample(
            &mut self.state.player,
            Vec2::new(x, y),
            timestamp_ms,
            &area,
        );
        match moved {
            Some(pos) if self.started => {
                tick::player_moved(&mut self.state, pos);
                self.flush()
            }
            _ => Ok(()),
        }
    }

    /// Viewport resized: pick the difficulty band for the new width
    pub fn on_resize(&mut self, viewport_width: f32) -> Result<(), RenderError> {
        self.state.play_area = self.renderer.play_area();
        if self.state.difficulty.recompute(viewport_width) {
            let d = self.state.difficulty.snapshot();
            log::info!(
                "Viewport {}px: min spawn interval {}ms, speed {:?}",
                viewport_width,
                d.min_spawn_interval_ms,
                d.speed_range
            );
        }
        Ok(())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct state access for hosts that script a run (and for tests)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn storage(&self) -> &S {
        self.best_time.storage()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.state.survival.elapsed_seconds()
    }

    pub fn best_seconds(&self) -> u32 {
        self.state.survival.best_seconds()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Map a host timestamp onto the simulated clock. Host time that runs
    /// backwards counts as zero, and a long gap (hidden tab, suspended machine)
    /// is capped at `max_frame_gap_ms`.
    fn advance_clock(&mut self, host_ms: u64) -> u64 {
        let sim_now = self.state.scheduler.now();
        let gap = match self.last_host_ms {
            Some(last) => host_ms.saturating_sub(last),
            None => 0,
        };
        self.last_host_ms = Some(host_ms);

        let max_gap = self.state.tuning.max_frame_gap_ms;
        if gap > max_gap {
            log::debug!("Host clock jumped {}ms, simulating {}ms", gap, max_gap);
        }
        sim_now + gap.min(max_gap)
    }

    /// Cancel every timer and remove every obstacle/explosion
    fn teardown(&mut self) {
        let state = &mut self.state;
        state.scheduler.cancel_all();
        state.run_timers.clear();
        state.sweep_timer = None;
        state.sweeping = false;
        state.obstacles.clear(&mut state.commands);
        for explosion in state.explosions.drain(..) {
            state.commands.push(RenderCommand::Remove { id: explosion.id });
        }
        state.events.clear();
    }

    fn handle_events(&mut self) {
        let state = &mut self.state;
        for event in state.events.drain(..) {
            match event {
                GameEvent::PlayerHit { at, obstacles } => {
                    log::info!(
                        "Hit by {} obstacle(s) after {}s at ({:.0}, {:.0})",
                        obstacles,
                        state.survival.elapsed_seconds(),
                        at.x,
                        at.y
                    );
                }
                GameEvent::Respawned => {
                    log::info!("Respawned (invincible for {}ms)", state.tuning.invincibility_ms);
                }
                GameEvent::InvincibilityEnded => log::info!("Invincibility over"),
                GameEvent::SweepFinished => log::debug!("Play area cleared"),
                GameEvent::NewBest(secs) => {
                    log::debug!("New best time: {}s", secs);
                    if let Err(e) = self.best_time.set_best_time(secs) {
                        log::warn!("Could not save best time: {}", e);
                    }
                }
            }
        }
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        renderer::flush(&mut self.state.commands, &mut self.renderer)
    }
}

//! End-to-end session runs against the recording renderer and memory storage

use asteroid_dodge::persistence::{MemoryStorage, Storage};
use asteroid_dodge::renderer::{EntityKind, Marker, PlayArea, RecordingRenderer, TextSlot};
use asteroid_dodge::sim::PLAYER_ID;
use asteroid_dodge::{ControlMode, GamePhase, GameSession, RenderError, Settings, Tuning};
use glam::Vec2;

type Session = GameSession<RecordingRenderer, MemoryStorage>;

fn area() -> PlayArea {
    PlayArea::new(0.0, 0.0, 800.0, 600.0)
}

fn session_with(storage: MemoryStorage) -> Session {
    let mut session = GameSession::create(
        RecordingRenderer::new(area()),
        storage,
        &Settings::default(),
        Tuning::default(),
        7,
        800.0,
    );
    session.start(0).unwrap();
    session
}

/// Keep the ship out of reach of every falling asteroid
fn park(session: &mut Session) {
    session.state_mut().player.pos = Vec2::new(400.0, 2000.0);
}

/// Drop a motionless asteroid onto the ship's current position
fn drop_on_player(session: &mut Session) {
    let state = session.state_mut();
    state.player.pos = Vec2::new(400.0, 300.0);
    let id = state.next_entity_id();
    let now = state.scheduler.now();
    let pos = state.player.pos - Vec2::splat(25.0);
    state.obstacles.spawn_at(id, pos, 0.0, now, &mut state.commands);
}

fn run_until(session: &mut Session, until_ms: u64) {
    let mut now = session.state().scheduler.now();
    while now < until_ms {
        now = (now + 16).min(until_ms);
        session.frame(now).unwrap();
    }
}

fn obstacles_added(session: &Session) -> usize {
    session
        .renderer()
        .added
        .get(&EntityKind::Obstacle)
        .copied()
        .unwrap_or(0)
}

#[test]
fn test_survive_hit_respawn_and_recover() {
    let mut session = session_with(MemoryStorage::new());
    assert_eq!(
        session.renderer().text(TextSlot::BestTime),
        Some("Best Time: 0s")
    );

    park(&mut session);
    run_until(&mut session, 45_000);

    assert_eq!(session.phase(), GamePhase::Running);
    assert_eq!(session.elapsed_seconds(), 45);
    assert_eq!(session.best_seconds(), 45);
    assert_eq!(session.renderer().text(TextSlot::Timer), Some("Time: 45s"));
    assert_eq!(
        session.renderer().text(TextSlot::BestTime),
        Some("Best Time: 45s")
    );
    assert_eq!(session.storage().get_item("bestTime").as_deref(), Some("45"));
    assert!(obstacles_added(&session) > 0);

    // Hit
    drop_on_player(&mut session);
    run_until(&mut session, 45_016);
    assert_eq!(session.phase(), GamePhase::Respawning);
    assert!(!session.renderer().entity(PLAYER_ID).unwrap().visible);
    assert_eq!(session.renderer().count(EntityKind::Explosion), 1);

    // Nothing spawns and the clock stands still while down
    let spawned = obstacles_added(&session);
    run_until(&mut session, 47_000);
    assert_eq!(obstacles_added(&session), spawned);
    assert_eq!(session.elapsed_seconds(), 45);
    assert_eq!(session.renderer().count(EntityKind::Explosion), 0);

    // Respawn
    run_until(&mut session, 45_016 + 3000);
    assert_eq!(session.phase(), GamePhase::Invincible);
    let ship = session.renderer().entity(PLAYER_ID).unwrap();
    assert!(ship.visible);
    assert!(ship.markers.contains(&Marker::Invincible));
    assert_eq!(session.elapsed_seconds(), 0);
    assert_eq!(session.state().difficulty.spawn_interval_ms(), 1000.0);
    assert_eq!(session.state().difficulty.multiplier(), 1.0);
    assert_eq!(session.renderer().text(TextSlot::Timer), Some("Time: 0s"));

    // Shield drops
    park(&mut session);
    run_until(&mut session, 45_016 + 6000);
    assert_eq!(session.phase(), GamePhase::Running);
    let ship = session.renderer().entity(PLAYER_ID).unwrap();
    assert!(!ship.markers.contains(&Marker::Invincible));
    // Best survives the reset
    assert_eq!(session.best_seconds(), 45);
    assert_eq!(session.storage().get_item("bestTime").as_deref(), Some("45"));
}

#[test]
fn test_stored_best_is_loaded_once() {
    let session = session_with(MemoryStorage::with_item("bestTime", "120"));
    assert_eq!(session.best_seconds(), 120);
    assert_eq!(
        session.renderer().text(TextSlot::BestTime),
        Some("Best Time: 2m 0s")
    );
}

#[test]
fn test_short_run_does_not_overwrite_record() {
    let mut session = session_with(MemoryStorage::with_item("bestTime", "10"));
    park(&mut session);
    run_until(&mut session, 5_000);
    assert_eq!(session.best_seconds(), 10);
    assert_eq!(session.storage().writes, 0);
}

#[test]
fn test_corrupt_record_counts_as_zero() {
    let mut session = session_with(MemoryStorage::with_item("bestTime", "soon"));
    assert_eq!(session.best_seconds(), 0);

    park(&mut session);
    run_until(&mut session, 1_000);
    assert_eq!(session.storage().get_item("bestTime").as_deref(), Some("1"));
}

#[test]
fn test_storage_failure_keeps_the_game_running() {
    let mut storage = MemoryStorage::new();
    storage.read_only = true;
    let mut session = session_with(storage);

    park(&mut session);
    run_until(&mut session, 3_000);
    assert_eq!(session.phase(), GamePhase::Running);
    assert_eq!(session.best_seconds(), 3);
    assert_eq!(session.storage().get_item("bestTime"), None);
}

#[test]
fn test_render_failure_costs_only_that_frame() {
    let mut session = session_with(MemoryStorage::new());
    park(&mut session);
    run_until(&mut session, 984);

    // The survival tick's timer text is the first call of the 1000ms frame
    session.renderer_mut().fail_next = 1;
    let result = session.frame(1_000);
    assert!(matches!(result, Err(RenderError::Platform { .. })));
    assert_eq!(session.elapsed_seconds(), 1);
    assert_eq!(session.renderer().text(TextSlot::Timer), Some("Time: 0s"));
    assert_eq!(
        session.renderer().text(TextSlot::BestTime),
        Some("Best Time: 1s")
    );

    run_until(&mut session, 2_000);
    assert_eq!(session.renderer().text(TextSlot::Timer), Some("Time: 2s"));
}

#[test]
fn test_pointer_moves_ship_inside_play_area_only() {
    let offset = PlayArea::new(100.0, 50.0, 800.0, 600.0);
    let settings = Settings {
        control: ControlMode::Direct,
        ..Settings::default()
    };
    let mut session = GameSession::create(
        RecordingRenderer::new(offset),
        MemoryStorage::new(),
        &settings,
        Tuning::default(),
        3,
        800.0,
    );
    session.start(0).unwrap();

    session.on_pointer_sample(300.0, 250.0, 0).unwrap();
    assert_eq!(session.state().player.pos, Vec2::new(200.0, 200.0));
    assert_eq!(
        session.renderer().entity(PLAYER_ID).unwrap().pos,
        Vec2::new(200.0, 200.0)
    );

    // Throttled
    session.on_pointer_sample(310.0, 250.0, 8).unwrap();
    assert_eq!(session.state().player.pos, Vec2::new(200.0, 200.0));

    // On the edge, so outside
    session.on_pointer_sample(100.0, 250.0, 40).unwrap();
    assert_eq!(session.state().player.pos, Vec2::new(200.0, 200.0));

    session.on_pointer_sample(310.0, 250.0, 60).unwrap();
    assert_eq!(session.state().player.pos, Vec2::new(210.0, 200.0));
}

#[test]
fn test_reset_starts_a_clean_run() {
    let mut session = session_with(MemoryStorage::new());
    park(&mut session);
    run_until(&mut session, 4_000);
    assert!(!session.state().obstacles.is_empty());

    session.reset(4_000).unwrap();
    assert_eq!(session.phase(), GamePhase::Running);
    assert_eq!(session.elapsed_seconds(), 0);
    assert_eq!(session.best_seconds(), 4);
    assert!(session.state().obstacles.is_empty());
    assert_eq!(session.renderer().count(EntityKind::Obstacle), 0);
    assert_eq!(session.renderer().text(TextSlot::Timer), Some("Time: 0s"));

    park(&mut session);
    run_until(&mut session, 5_000);
    assert_eq!(session.elapsed_seconds(), 1);
}

#[test]
fn test_dispose_clears_scene_and_returns_collaborators() {
    let mut session = session_with(MemoryStorage::new());
    park(&mut session);
    run_until(&mut session, 2_000);

    let (renderer, storage) = session.dispose();
    assert_eq!(renderer.count(EntityKind::Obstacle), 0);
    assert!(renderer.entity(PLAYER_ID).is_none());
    assert_eq!(storage.get_item("bestTime").as_deref(), Some("2"));
}

#[test]
fn test_narrow_viewport_uses_narrow_band() {
    let mut session = session_with(MemoryStorage::new());
    session.on_resize(360.0).unwrap();
    assert_eq!(session.state().difficulty.band_index(), 0);
    assert_eq!(session.state().difficulty.min_spawn_interval_ms(), 500.0);
}

#[test]
fn test_host_clock_jump_forward_is_capped() {
    let mut session = session_with(MemoryStorage::new());
    park(&mut session);
    session.frame(16).unwrap();

    // An hour passes between two frames (suspended tab or stepped clock)
    session.frame(3_600_016).unwrap();
    assert_eq!(session.state().scheduler.now(), 116);
    assert_eq!(session.elapsed_seconds(), 0);
    assert_eq!(session.best_seconds(), 0);
    assert_eq!(session.storage().get_item("bestTime"), None);

    // Play carries on from where the simulation was
    let mut host = 3_600_016;
    while session.state().scheduler.now() < 1_000 {
        host += 16;
        session.frame(host).unwrap();
    }
    assert_eq!(session.elapsed_seconds(), 1);
}

#[test]
fn test_host_clock_running_backwards_does_not_freeze() {
    let mut session = session_with(MemoryStorage::new());
    park(&mut session);
    run_until(&mut session, 10_000);
    assert_eq!(session.elapsed_seconds(), 10);
    let spawned = obstacles_added(&session);

    // Host time restarts near zero
    let mut host = 0;
    session.frame(host).unwrap();
    assert_eq!(session.state().scheduler.now(), 10_000);

    while host < 2_000 {
        host += 16;
        session.frame(host).unwrap();
    }
    assert_eq!(session.elapsed_seconds(), 12);
    assert!(obstacles_added(&session) > spawned);
}

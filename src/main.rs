//! Asteroid Dodge entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{MouseEvent, TouchEvent};

    use asteroid_dodge::persistence::{LocalStorage, Storage};
    use asteroid_dodge::platform;
    use asteroid_dodge::renderer::DomRenderer;
    use asteroid_dodge::{ControlMode, GameSession, Settings, Tuning};

    type Session = GameSession<DomRenderer, LocalStorage>;

    /// `?control=direct` (or `smooth`) switches the control mode and remembers it
    fn apply_query_settings(settings: &mut Settings) {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let requested = search
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.strip_prefix("control="))
            .find_map(ControlMode::from_str);

        if let Some(mode) = requested {
            if mode != settings.control {
                settings.control = mode;
                settings.save();
                log::info!("Control mode set to {}", mode.as_str());
            }
        }
    }

    fn viewport_width() -> f32 {
        web_sys::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Asteroid Dodge starting...");

        let renderer = match DomRenderer::new() {
            Ok(r) => r,
            Err(e) => {
                log::error!("Cannot start: {}", e);
                return;
            }
        };

        let mut settings = Settings::load();
        apply_query_settings(&mut settings);

        let tuning = LocalStorage
            .get_item(Tuning::STORAGE_KEY)
            .map(|json| Tuning::from_json(&json))
            .unwrap_or_default();

        let seed = platform::seed();
        let session = Rc::new(RefCell::new(Session::create(
            renderer,
            LocalStorage,
            &settings,
            tuning,
            seed,
            viewport_width(),
        )));

        if let Err(e) = session.borrow_mut().start(platform::now_ms()) {
            log::warn!("Render error on start: {}", e);
        }

        setup_input_handlers(session.clone());

        // Start game loop
        request_animation_frame(session);

        log::info!("Asteroid Dodge running!");
    }

    fn setup_input_handlers(session: Rc<RefCell<Session>>) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };

        // Mouse move
        {
            let session = session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let result = session.borrow_mut().on_pointer_sample(
                    event.client_x() as f32,
                    event.client_y() as f32,
                    platform::now_ms(),
                );
                if let Err(e) = result {
                    log::warn!("Render error on mouse move: {}", e);
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move (first touch only)
        {
            let session = session.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    let result = session.borrow_mut().on_pointer_sample(
                        touch.client_x() as f32,
                        touch.client_y() as f32,
                        platform::now_ms(),
                    );
                    if let Err(e) = result {
                        log::warn!("Render error on touch move: {}", e);
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Err(e) = session.borrow_mut().on_resize(viewport_width()) {
                    log::warn!("Render error on resize: {}", e);
                }
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(session: Rc<RefCell<Session>>) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(session, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(session: Rc<RefCell<Session>>, time: f64) {
        if let Err(e) = session.borrow_mut().frame(time as u64) {
            log::warn!("Render error: {}", e);
        }

        request_animation_frame(session);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Asteroid Dodge (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in a browser");

    headless_demo();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Simulate a minute of play with a ship that weaves across the field
#[cfg(not(target_arch = "wasm32"))]
fn headless_demo() {
    use asteroid_dodge::consts::FRAME_MS;
    use asteroid_dodge::persistence::MemoryStorage;
    use asteroid_dodge::renderer::{EntityKind, PlayArea, RecordingRenderer};
    use asteroid_dodge::{GameSession, Settings, Tuning, platform};

    let area = PlayArea::new(0.0, 0.0, 800.0, 600.0);
    let seed = platform::seed();
    let mut session = GameSession::create(
        RecordingRenderer::new(area),
        MemoryStorage::new(),
        &Settings::load(),
        Tuning::default(),
        seed,
        area.width,
    );

    let start = 0;
    if let Err(e) = session.start(start) {
        log::warn!("Render error on start: {}", e);
    }

    let mut hits = 0;
    let mut was_alive = true;
    for frame in 1..=(60_000 / FRAME_MS) {
        let now = start + frame * FRAME_MS;
        let phase = (now as f32 / 1500.0).sin();
        let x = area.left + area.width / 2.0 + phase * (area.width / 2.0 - 40.0);
        let y = area.top + area.height - 60.0;
        if let Err(e) = session.on_pointer_sample(x, y, now) {
            log::warn!("Render error on pointer sample: {}", e);
        }
        if let Err(e) = session.frame(now) {
            log::warn!("Render error: {}", e);
        }

        let alive = session.phase().is_alive();
        if was_alive && !alive {
            hits += 1;
        }
        was_alive = alive;
    }

    let renderer = session.renderer();
    log::info!(
        "Demo finished: seed {}, {} hits, {} asteroids spawned, phase {:?}, run {}s, best {}s",
        seed,
        hits,
        renderer.added.get(&EntityKind::Obstacle).copied().unwrap_or(0),
        session.phase(),
        session.elapsed_seconds(),
        session.best_seconds()
    );

    let (_, storage) = session.dispose();
    log::info!(
        "Stored best time: {:?}",
        asteroid_dodge::BestTimeStore::new(storage).get_best_time()
    );
}

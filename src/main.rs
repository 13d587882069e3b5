//! Astro Drift entry point
//!
//! Platform glue around the simulation: canvas + HUD wiring, keyboard
//! listeners feeding the input snapshot, and the requestAnimationFrame
//! loop. The loop is gated on the Running phase - pausing withholds the
//! next scheduled callback rather than aborting a frame in progress, and
//! stop/restart always cancels the pending callback before state is reset
//! so a stale frame can never run against a fresh session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent};

    use astro_drift::Settings;
    use astro_drift::audio::{AudioManager, SoundEffect};
    use astro_drift::consts::MAX_FRAME_MS;
    use astro_drift::renderer::{CanvasSurface, draw_frame};
    use astro_drift::sim::{GamePhase, GameState, InputState, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        input: InputState,
        audio: AudioManager,
        settings: Settings,
        surface: CanvasSurface,
        last_time: f64,
        /// Pending requestAnimationFrame handle, if a frame is scheduled
        raf_handle: Option<i32>,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    type SharedGame = Rc<RefCell<Game>>;
    type FrameLoop = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

    impl Game {
        fn new(seed: u64, surface: CanvasSurface, width: f32, height: f32) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_sfx_volume(settings.sfx_volume);
            audio.set_muted(settings.muted);
            Self {
                state: GameState::new(seed, width, height),
                input: InputState::default(),
                audio,
                settings,
                surface,
                last_time: 0.0,
                raf_handle: None,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// One frame: tick, consume input edges, drive audio, draw, HUD.
        /// Returns whether the loop should schedule another frame.
        fn step(&mut self, now: f64) -> bool {
            let dt = ((now - self.last_time) as f32).clamp(0.0, MAX_FRAME_MS);
            self.last_time = now;

            let input = self.input;
            tick(&mut self.state, &input, dt, now);
            // One-shot edges are consumed by exactly one tick
            self.input.fire = false;
            self.input.pause = false;

            for event in self.state.drain_events() {
                if let Some(effect) = SoundEffect::for_event(event) {
                    self.audio.play(effect);
                }
            }

            draw_frame(&self.state, &self.surface, self.settings.starfield);
            self.track_fps(now);
            self.update_hud();
            self.state.phase == GamePhase::Running
        }

        fn track_fps(&mut self, now: f64) {
            self.frame_times[self.frame_index] = now;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest = self.frame_times[self.frame_index];
            if oldest > 0.0 && now > oldest {
                self.fps = (60_000.0 / (now - oldest)).round() as u32;
            }
        }

        /// Refresh the score/time/count readouts and the phase overlay
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            set_text(&document, "#hud-score .hud-value", &self.state.score.to_string());
            set_text(
                &document,
                "#hud-time .hud-value",
                &format!("{}s", self.state.elapsed_secs),
            );
            set_text(
                &document,
                "#hud-rocks .hud-value",
                &self.state.asteroid_count().to_string(),
            );
            if self.settings.show_fps {
                set_text(&document, "#hud-fps .hud-value", &self.fps.to_string());
            }
            let status = match self.state.phase {
                GamePhase::Idle => "press Enter to start",
                GamePhase::Running => "",
                GamePhase::Paused => "paused",
                GamePhase::GameOver => "game over - Enter to play again",
            };
            set_text(&document, "#overlay", status);
        }
    }

    fn set_text(document: &Document, selector: &str, text: &str) {
        if let Ok(Some(el)) = document.query_selector(selector) {
            el.set_text_content(Some(text));
        }
    }

    fn performance_now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Build the recurring frame closure. It reschedules itself only while
    /// the game is Running; pausing or ending the run simply stops new
    /// frames from being requested.
    fn make_frame_loop(game: SharedGame) -> FrameLoop {
        let slot: FrameLoop = Rc::new(RefCell::new(None));
        let slot_inner = slot.clone();
        *slot.borrow_mut() = Some(Closure::new(move |now: f64| {
            let keep_going = {
                let mut g = game.borrow_mut();
                g.raf_handle = None;
                g.step(now)
            };
            if keep_going {
                schedule(&game, &slot_inner);
            }
        }));
        slot
    }

    /// Request the next frame if none is pending
    fn schedule(game: &SharedGame, frame_loop: &FrameLoop) {
        let mut g = game.borrow_mut();
        if g.raf_handle.is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };
        let cb = frame_loop.borrow();
        let Some(cb) = cb.as_ref() else {
            return;
        };
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            g.raf_handle = Some(id);
        }
    }

    /// Cancel the pending frame callback. Required before any state reset:
    /// cancelAnimationFrame guarantees the discarded callback never fires.
    fn cancel_pending(game: &SharedGame) {
        if let Some(id) = game.borrow_mut().raf_handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }

    /// Start (or restart) a session: cancel first, then reset and reschedule
    fn start_session(game: &SharedGame, frame_loop: &FrameLoop) {
        cancel_pending(game);
        {
            let mut g = game.borrow_mut();
            let now = performance_now();
            g.last_time = now;
            g.input = InputState::default();
            g.state.start(now);
            g.audio.resume();
        }
        schedule(game, frame_loop);
    }

    fn hook_keyboard(game: &SharedGame, frame_loop: &FrameLoop, document: &Document) {
        {
            let game = game.clone();
            let frame_loop = frame_loop.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                let phase = game.borrow().state.phase;
                match code.as_str() {
                    "ArrowLeft" | "KeyA" => game.borrow_mut().input.left = true,
                    "ArrowRight" | "KeyD" => game.borrow_mut().input.right = true,
                    "ArrowUp" | "KeyW" => game.borrow_mut().input.thrust = true,
                    "ArrowDown" | "KeyS" => game.borrow_mut().input.reverse = true,
                    "Space" => {
                        if !event.repeat() {
                            game.borrow_mut().input.fire = true;
                        }
                    }
                    "KeyP" => {
                        if !event.repeat() {
                            game.borrow_mut().input.pause = true;
                            // The paused loop is withheld; hand it one frame
                            // so the toggle can be processed
                            if phase == GamePhase::Paused {
                                schedule(&game, &frame_loop);
                            }
                        }
                    }
                    "KeyR" => {
                        if phase != GamePhase::Idle {
                            start_session(&game, &frame_loop);
                        }
                    }
                    "Enter" => {
                        if matches!(phase, GamePhase::Idle | GamePhase::GameOver) {
                            start_session(&game, &frame_loop);
                        }
                    }
                    "KeyM" => {
                        if !event.repeat() {
                            let mut g = game.borrow_mut();
                            g.settings.muted = !g.settings.muted;
                            let muted = g.settings.muted;
                            g.audio.set_muted(muted);
                            g.settings.save();
                        }
                    }
                    // Unrecognized keys are ignored
                    _ => return,
                }
                event.prevent_default();
            });
            let _ = document
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.code().as_str() {
                    "ArrowLeft" | "KeyA" => g.input.left = false,
                    "ArrowRight" | "KeyD" => g.input.right = false,
                    "ArrowUp" | "KeyW" => g.input.thrust = false,
                    "ArrowDown" | "KeyS" => g.input.reverse = false,
                    _ => {}
                }
            });
            let _ = document
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn hook_buttons(game: &SharedGame, frame_loop: &FrameLoop, document: &Document) {
        let hook = |id: &str, f: Box<dyn Fn()>| {
            if let Some(el) = document.get_element_by_id(id) {
                let closure = Closure::<dyn FnMut()>::new(move || f());
                let _ =
                    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        };

        {
            let game = game.clone();
            let frame_loop = frame_loop.clone();
            hook(
                "btn-start",
                Box::new(move || {
                    let phase = game.borrow().state.phase;
                    if matches!(phase, GamePhase::Idle | GamePhase::GameOver) {
                        start_session(&game, &frame_loop);
                    }
                }),
            );
        }
        {
            let game = game.clone();
            let frame_loop = frame_loop.clone();
            hook(
                "btn-pause",
                Box::new(move || {
                    let phase = game.borrow().state.phase;
                    if matches!(phase, GamePhase::Running | GamePhase::Paused) {
                        game.borrow_mut().input.pause = true;
                        if phase == GamePhase::Paused {
                            schedule(&game, &frame_loop);
                        }
                    }
                }),
            );
        }
        {
            let game = game.clone();
            let frame_loop = frame_loop.clone();
            hook(
                "btn-restart",
                Box::new(move || {
                    if game.borrow().state.phase != GamePhase::Idle {
                        start_session(&game, &frame_loop);
                    }
                }),
            );
        }
    }

    /// Resize the backing store to the element size and rebuild the
    /// starfield (dimension changes regenerate, never resample)
    fn handle_resize(game: &SharedGame, canvas: &HtmlCanvasElement) {
        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let mut g = game.borrow_mut();
        g.state.regenerate_stars(width as f32, height as f32);
        // Repaint immediately when the loop is withheld
        if g.state.phase != GamePhase::Running {
            draw_frame(&g.state, &g.surface, g.settings.starfield);
        }
    }

    fn hook_auto_pause(game: &SharedGame, document: &Document) {
        let window = match web_sys::window() {
            Some(w) => w,
            None => return,
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.settings.pause_on_blur && g.state.phase == GamePhase::Running {
                        g.state.toggle_pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.pause_on_blur && g.state.phase == GamePhase::Running {
                    g.state.toggle_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        // A missing surface is fatal at startup: report once, no retry
        let Some(canvas) = document
            .get_element_by_id("game")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("canvas element #game not found - engine cannot start");
            return;
        };
        let Some(ctx) = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
        else {
            log::error!("2d drawing context unavailable - engine cannot start");
            return;
        };

        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game: SharedGame = Rc::new(RefCell::new(Game::new(
            seed,
            CanvasSurface::new(ctx),
            width as f32,
            height as f32,
        )));
        let frame_loop = make_frame_loop(game.clone());

        hook_keyboard(&game, &frame_loop, &document);
        hook_buttons(&game, &frame_loop, &document);
        hook_auto_pause(&game, &document);

        {
            let game = game.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut()>::new(move || {
                handle_resize(&game, &canvas);
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Idle splash: starfield and overlay text until the first start
        {
            let g = game.borrow();
            draw_frame(&g.state, &g.surface, g.settings.starfield);
            g.update_hud();
        }
        log::info!("Astro Drift ready ({}x{})", width, height);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use astro_drift::sim::{GamePhase, GameState, InputState, tick};

    env_logger::init();
    log::info!("Astro Drift (native) starting...");
    log::info!("Native mode is headless - build for wasm32 to play in a browser");

    // Headless smoke run: thrust and fire for ten simulated seconds
    let mut state = GameState::new(0xA57E_801D, 800.0, 600.0);
    state.start(0.0);
    let mut input = InputState {
        thrust: true,
        ..Default::default()
    };
    for frame in 0..600u32 {
        input.fire = frame % 30 == 0;
        input.right = frame % 90 < 10;
        tick(&mut state, &input, 16.0, f64::from(frame) * 16.0);
        if state.phase == GamePhase::GameOver {
            break;
        }
    }
    log::info!(
        "smoke run done: phase {:?}, score {}, {} asteroids afield",
        state.phase,
        state.score,
        state.asteroid_count()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

//! Aim Warm-up entry point
//!
//! Wires the engine to the browser page, or runs a headless bot natively.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlElement, KeyboardEvent, MouseEvent, PointerEvent};

    use aim_warmup::Settings;
    use aim_warmup::persistence::{KeyValueRecordStore, LocalStorageBackend};
    use aim_warmup::platform::route;
    use aim_warmup::platform::web::{DomPresenter, WebFeedback, telegram_close, telegram_ready};
    use aim_warmup::sim::{Difficulty, Engine, ModeKind, PointerMotion, Screen};

    type Store = KeyValueRecordStore<LocalStorageBackend>;

    /// Everything the page callbacks share
    struct App {
        engine: Engine<Store>,
        presenter: DomPresenter,
        feedback: WebFeedback,
        settings: Settings,
        last_time: Option<f64>,
        /// Last mode/difficulty picked, for replay and the home stats
        mode: ModeKind,
        difficulty: Difficulty,
    }

    impl App {
        fn new(seed: u64, document: web_sys::Document) -> Self {
            let settings = Settings::load();
            let mut engine = Engine::new(KeyValueRecordStore::new(LocalStorageBackend), seed);
            engine.apply_settings(&settings);
            let mut feedback = WebFeedback::new();
            feedback.set_volume(settings.effective_volume());
            Self {
                engine,
                presenter: DomPresenter::new(document),
                feedback,
                settings,
                last_time: None,
                mode: ModeKind::Warmup,
                difficulty: Difficulty::default(),
            }
        }

        /// Hand pending engine events to the page
        fn flush(&mut self) {
            let events = self.engine.drain_events();
            route(events, &mut self.presenter, &mut self.feedback, &self.settings);
        }

        fn sync_size(&mut self) {
            if let Some((w, h)) = self.presenter.playfield_size() {
                self.engine.on_resize(w, h);
            }
        }

        fn start(&mut self, mode: ModeKind) {
            self.mode = mode;
            self.feedback.unlock_audio();
            // The game screen must be visible before it can be measured
            self.presenter.show_screen(Screen::Game);
            self.sync_size();
            self.engine.start_session(mode, Some(self.difficulty));
            self.flush();
        }

        fn refresh_home(&self) {
            let difficulty = self.mode.is_arcade().then_some(self.difficulty);
            self.presenter
                .set_home_stats(self.engine.home_stats(self.mode, difficulty));
        }

        fn frame(&mut self, time: f64) {
            let dt = self.last_time.map(|last| time - last).unwrap_or(0.0);
            self.last_time = Some(time);
            self.engine.advance(dt);
            self.flush();

            let crosshair = (self.engine.raw_aim() && self.engine.session().is_running())
                .then(|| self.engine.aim().position());
            self.presenter.set_crosshair(crosshair);
        }

        fn toggle_raw_aim(&mut self) {
            self.settings.raw_aim = !self.settings.raw_aim;
            self.engine.apply_settings(&self.settings);
            self.settings.save();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Aim Warm-up starting...");
        telegram_ready();

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(seed, document.clone())));
        log::info!("Engine initialized with seed: {}", seed);

        setup_pointer(&document, app.clone());
        setup_buttons(&document, app.clone());
        setup_window(app.clone());

        {
            let mut a = app.borrow_mut();
            a.refresh_home();
            a.presenter.show_screen(Screen::Home);
        }
        if let Some(loader) = document.get_element_by_id("loader") {
            let _ = loader.class_list().add_1("done");
        }

        request_animation_frame(app);
        log::info!("Aim Warm-up running!");
    }

    fn on_click(document: &web_sys::Document, id: &str, mut f: impl FnMut(MouseEvent) + 'static) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| f(event));
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_pointer(document: &web_sys::Document, app: Rc<RefCell<App>>) {
        let Some(playfield) = document
            .get_element_by_id("playfield")
            .and_then(|e| e.dyn_into::<HtmlElement>().ok())
        else {
            log::warn!("No #playfield; input disabled");
            return;
        };

        // Shots
        {
            let app = app.clone();
            let field = playfield.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                let Some(point) = a
                    .presenter
                    .to_playfield(event.client_x() as f32, event.client_y() as f32)
                else {
                    return;
                };
                a.engine.on_pointer_down(point);
                a.flush();
                // Raw aim wants true relative motion
                if a.engine.raw_aim() && !a.engine.aim().is_locked() {
                    drop(a);
                    field.request_pointer_lock();
                }
            });
            let _ = playfield
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Aim
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                if !a.engine.raw_aim() {
                    return;
                }
                let motion = if a.engine.aim().is_locked() {
                    PointerMotion::locked(glam::Vec2::new(
                        event.movement_x() as f32,
                        event.movement_y() as f32,
                    ))
                } else {
                    match a
                        .presenter
                        .to_playfield(event.client_x() as f32, event.client_y() as f32)
                    {
                        Some(p) => PointerMotion::at(p),
                        None => return,
                    }
                };
                a.engine.on_pointer_move(motion);
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer lock changes
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let locked = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.pointer_lock_element())
                    .is_some();
                if locked {
                    log::info!("Pointer lock acquired");
                } else {
                    log::info!("Pointer lock released");
                }
                app.borrow_mut().engine.set_pointer_locked(locked);
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn setup_buttons(document: &web_sys::Document, app: Rc<RefCell<App>>) {
        let modes = [
            ("startWarmup", ModeKind::Warmup),
            ("startEndless", ModeKind::Endless),
            ("startShrink", ModeKind::Shrink),
            ("startFalling", ModeKind::Falling),
            ("startFallingShrink", ModeKind::FallingShrink),
        ];
        for (id, mode) in modes {
            let app = app.clone();
            on_click(document, id, move |_| app.borrow_mut().start(mode));
        }

        for (id, difficulty) in [
            ("diffEasy", Difficulty::Easy),
            ("diffMedium", Difficulty::Medium),
            ("diffHard", Difficulty::Hard),
        ] {
            let app = app.clone();
            on_click(document, id, move |_| {
                let mut a = app.borrow_mut();
                a.difficulty = difficulty;
                log::info!("Difficulty: {}", difficulty.as_key());
                a.refresh_home();
            });
        }

        {
            let app = app.clone();
            on_click(document, "quitBtn", move |_| {
                let mut a = app.borrow_mut();
                a.engine.quit_session();
                a.flush();
                a.refresh_home();
            });
        }
        {
            let app = app.clone();
            on_click(document, "replayBtn", move |_| {
                let mut a = app.borrow_mut();
                let mode = a.mode;
                a.start(mode);
            });
        }
        {
            let app = app.clone();
            on_click(document, "homeBtn", move |_| {
                let mut a = app.borrow_mut();
                a.refresh_home();
                a.presenter.show_screen(Screen::Home);
            });
        }
        {
            let app = app.clone();
            on_click(document, "closeBtn", move |_| {
                if !telegram_close() {
                    let mut a = app.borrow_mut();
                    a.refresh_home();
                    a.presenter.show_screen(Screen::Home);
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "rawAimToggle", move |_| app.borrow_mut().toggle_raw_aim());
        }
    }

    fn setup_window(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keep targets inside the field after rotation/resize
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut a = app.borrow_mut();
                a.sync_size();
                a.flush();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Escape leaves the game
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Escape" {
                    let mut a = app.borrow_mut();
                    if a.engine.session().is_running() {
                        a.engine.quit_session();
                        a.flush();
                        a.refresh_home();
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // A hidden tab stops rAF; do not replay the gap as one long frame
        if let Some(document) = window.document() {
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut a = app.borrow_mut();
                    if a.engine.session().is_running() {
                        log::info!("Page hidden, stopping session");
                        a.engine.quit_session();
                        a.flush();
                        a.refresh_home();
                    }
                    a.last_time = None;
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Aim Warm-up (native) starting...");
    log::info!("The playable build is the web version; running a headless bot instead");

    for mode in aim_warmup::ModeKind::ALL {
        headless::run_bot(mode, 7);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// A scripted player that clicks every target after a fixed delay
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use aim_warmup::persistence::MemoryStore;
    use aim_warmup::platform::{LogPresenter, NoFeedback, route};
    use aim_warmup::sim::{Difficulty, Engine, ModeKind};
    use aim_warmup::{Settings, consts::TICK_MS};

    const FRAME_MS: f64 = 16.0;
    /// Bot reaction time
    const AIM_DELAY_MS: f64 = 240.0;
    /// Give up after ten virtual minutes
    const MAX_MS: f64 = 10.0 * 60.0 * TICK_MS;

    pub fn run_bot(mode: ModeKind, seed: u64) {
        let mut engine = Engine::new(MemoryStore::in_memory(), seed);
        let mut presenter = LogPresenter::default();
        let settings = Settings::default();

        engine.start_session(mode, Some(Difficulty::Medium));
        while engine.session().is_running() && engine.now_ms() < MAX_MS {
            engine.advance(FRAME_MS);
            // Oldest live target, which is also the most urgent one
            let shot = engine
                .session()
                .targets
                .as_slice()
                .first()
                .filter(|t| engine.now_ms() - t.spawned_at_ms >= AIM_DELAY_MS)
                .map(|t| t.circle().center);
            if let Some(point) = shot {
                engine.on_pointer_down(point);
            }
            route(engine.drain_events(), &mut presenter, &mut NoFeedback, &settings);
        }
        if engine.session().is_running() {
            log::warn!("{} bot ran out of time, quitting", mode.label());
            engine.quit_session();
            route(engine.drain_events(), &mut presenter, &mut NoFeedback, &settings);
        }
    }
}

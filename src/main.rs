//! Mini Golf entry point
//!
//! On the web: binds the canvas, runs the session once per animation frame
//! and keeps the HUD in sync. Natively: plays the built-in course headlessly
//! with the demo player and records best scores.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use mini_golf::persistence::LocalScoreStore;
    use mini_golf::platform::InputRouter;
    use mini_golf::platform::web::{Listeners, SharedSession, bind_input};
    use mini_golf::renderer::{CameraRig, FrameSnapshot, HeadlessSurface, RenderSurface, detach_surface};
    use mini_golf::{Course, GameEvent, Session, Settings};

    /// Everything the page owns besides the session
    struct Game {
        session: SharedSession,
        course: Course,
        settings: Settings,
        camera: CameraRig,
        surface: HeadlessSurface,
        document: Document,
        /// Pending animation frame, cancelled on teardown
        frame_handle: Option<i32>,
        input: Option<Listeners>,
        buttons: Option<Listeners>,
        running: bool,
    }

    impl Game {
        /// One host frame: simulate, then present
        fn frame(&mut self) {
            let snapshot = {
                let mut session = self.session.borrow_mut();
                session.tick();
                for event in session.drain_events() {
                    self.on_event(&session, event);
                }
                if self.settings.follow_camera && session.is_ball_moving() {
                    self.camera.follow(session.ball().position);
                }
                FrameSnapshot::capture(&session, &self.settings)
            };

            if let Err(e) = self.surface.present(&snapshot) {
                log::warn!("Present failed: {}", e);
            }
        }

        fn on_event(&self, session: &Session, event: GameEvent) {
            match event {
                GameEvent::Stroke { strokes } | GameEvent::OutOfBounds { strokes } => {
                    self.set_text("hud-strokes", &strokes.to_string());
                }
                GameEvent::PowerChanged(power) => {
                    self.set_style("power-fill", "width", &format!("{:.0}%", power));
                }
                GameEvent::HoleComplete { strokes, .. } => {
                    let level = session.level();
                    self.set_text(
                        "hole-result",
                        &format!(
                            "{} in {} ({})",
                            level.name,
                            strokes,
                            mini_golf::highscores::par_delta(level.par, strokes)
                        ),
                    );
                    self.set_class("hole-complete", "");
                }
                GameEvent::ShotCancelled | GameEvent::BallStopped => {}
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_class(&self, id: &str, class: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute("class", class);
            }
        }

        fn set_style(&self, id: &str, property: &str, value: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                if let Some(el) = el.dyn_ref::<web_sys::HtmlElement>() {
                    let _ = el.style().set_property(property, value);
                }
            }
        }

        /// Advance to the next hole, or start over after the last one
        fn next_hole(&mut self) {
            let next = {
                let session = self.session.borrow();
                let current = session.level().id;
                self.course
                    .next_after(current)
                    .or_else(|| self.course.levels().first())
                    .cloned()
            };
            let Some(level) = next else {
                return;
            };
            let mut session = self.session.borrow_mut();
            if let Err(e) = session.reset_to(level) {
                log::warn!("Could not load next hole: {}", e);
                return;
            }
            self.camera = CameraRig::new(session.level().start_position, self.surface.size().0, self.surface.size().1);
            self.show_hole(&session);
        }

        /// Fill the HUD for a freshly started hole
        fn show_hole(&self, session: &Session) {
            self.set_text("hud-hole", &session.level().name);
            self.set_text("hud-par", &session.level().par.to_string());
            self.set_text("hud-strokes", &session.strokes().to_string());
            self.set_class("hole-complete", "hidden");
        }

        /// Stop the loop, unregister listeners and release the surface
        fn teardown(&mut self) {
            if !self.running {
                return;
            }
            self.running = false;
            if let (Some(handle), Some(window)) = (self.frame_handle.take(), web_sys::window()) {
                let _ = window.cancel_animation_frame(handle);
            }
            self.input = None;
            self.buttons = None;
            detach_surface(&mut self.surface);
            log::info!("Mini Golf stopped");
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::log_1(&format!("logger init failed: {e}").into());
        }

        log::info!("Mini Golf starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let course = Course::builtin().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let first = course
            .levels()
            .first()
            .cloned()
            .ok_or_else(|| JsValue::from_str("course has no holes"))?;
        let session = Session::new(first, settings.tuning.clone())
            .map_err(|e| JsValue::from_str(&e.to_string()))?
            .with_score_sink(Box::new(LocalScoreStore::open_browser()));
        let camera = CameraRig::new(session.level().start_position, width, height);
        let session: SharedSession = Rc::new(RefCell::new(session));

        let router = Rc::new(RefCell::new(InputRouter::new()));
        let input = bind_input(canvas.as_ref(), session.clone(), router)?;

        let game = Rc::new(RefCell::new(Game {
            session,
            course,
            settings,
            camera,
            surface: HeadlessSurface::new(width, height),
            document: document.clone(),
            frame_handle: None,
            input: Some(input),
            buttons: None,
            running: true,
        }));

        {
            let g = game.borrow();
            g.show_hole(&g.session.borrow());
        }

        let buttons = setup_buttons(&document, &window, game.clone())?;
        game.borrow_mut().buttons = Some(buttons);

        // Lives as long as the page, so it is leaked rather than guarded
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().teardown();
            });
            window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        request_animation_frame(game);
        log::info!("Mini Golf running!");
        Ok(())
    }

    fn setup_buttons(
        document: &Document,
        window: &web_sys::Window,
        game: Rc<RefCell<Game>>,
    ) -> Result<Listeners, JsValue> {
        let mut listeners = Listeners::new();

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let game = game.clone();
            listeners.add(btn.as_ref(), "click", move |_| {
                let g = game.borrow();
                g.session.borrow_mut().reset();
                g.set_text("hud-strokes", "0");
                g.set_class("hole-complete", "hidden");
            })?;
        }

        if let Some(btn) = document.get_element_by_id("pause-btn") {
            let game = game.clone();
            listeners.add(btn.as_ref(), "click", move |_| {
                let g = game.borrow();
                let mut session = g.session.borrow_mut();
                if session.is_paused() {
                    session.resume();
                    g.set_class("pause-menu", "hidden");
                } else {
                    session.pause();
                    g.set_class("pause-menu", "");
                }
            })?;
        }

        if let Some(btn) = document.get_element_by_id("next-btn") {
            let game = game.clone();
            listeners.add(btn.as_ref(), "click", move |_| {
                game.borrow_mut().next_hole();
            })?;
        }

        listeners.add(window.as_ref(), "resize", move |_| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(0.0) as u32;
            let height = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(0.0) as u32;
            let mut g = game.borrow_mut();
            g.camera.resize(width, height);
            g.surface.resize(width, height);
        })?;

        Ok(listeners)
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let next = game.clone();
        let closure = Closure::once(move |_time: f64| {
            game_loop(next);
        });
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(handle) => game.borrow_mut().frame_handle = Some(handle),
            Err(e) => log::warn!("requestAnimationFrame failed: {:?}", e),
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.frame_handle = None;
            if !g.running {
                return;
            }
            g.frame();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use mini_golf::highscores::par_delta;
    use mini_golf::persistence::LocalScoreStore;
    use mini_golf::renderer::{FrameSnapshot, HeadlessSurface, RenderSurface, detach_surface};
    use mini_golf::sim::{Autoplayer, autoplay};
    use mini_golf::{Course, Session, Settings};

    const MAX_STROKES: u32 = 10;

    env_logger::init();
    log::info!("Mini Golf (native) starting...");

    // mini-golf [seed] [scores.json] [settings.json]
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let scores_path = args.next().unwrap_or_else(|| "mini_golf_scores.json".to_string());
    let settings = args.next().map(Settings::load_from).unwrap_or_default();

    let course = match Course::builtin() {
        Ok(course) => course,
        Err(e) => {
            log::error!("Built-in course is invalid: {}", e);
            std::process::exit(1);
        }
    };
    let Some(first) = course.levels().first().cloned() else {
        log::error!("Built-in course has no holes");
        std::process::exit(1);
    };

    let mut session = match Session::new(first, settings.tuning.clone()) {
        Ok(session) => session.with_score_sink(Box::new(LocalScoreStore::open_file(&scores_path))),
        Err(e) => {
            log::error!("Could not start: {}", e);
            std::process::exit(1);
        }
    };

    let mut player = Autoplayer::new(seed);
    let mut surface = HeadlessSurface::new(800, 600);
    let mut total = 0;

    println!("Hole  Par  Strokes  Score");
    for (index, level) in course.levels().iter().enumerate() {
        if index > 0 {
            if let Err(e) = session.reset_to(level.clone()) {
                log::error!("Skipping hole {}: {}", level.id, e);
                continue;
            }
        }

        let strokes = autoplay::play_hole(&mut session, &mut player, MAX_STROKES);
        total += strokes;
        if let Err(e) = surface.present(&FrameSnapshot::capture(&session, &settings)) {
            log::warn!("Present failed: {}", e);
        }

        let holed = if session.is_hole_completed() { "" } else { " (gave up)" };
        println!(
            "{:>4}  {:>3}  {:>7}  {:>5}{}",
            level.id,
            level.par,
            strokes,
            par_delta(level.par, strokes),
            holed
        );
    }

    println!(
        "Total {} over par {} ({})",
        total,
        course.total_par(),
        par_delta(course.total_par(), total)
    );
    detach_surface(&mut surface);
    log::info!("Best scores kept in {}", scores_path);
}

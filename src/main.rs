//! Nitro Dash entry point
//!
//! In the browser this wires the canvas, keyboard and page buttons to a
//! `GameLoop`. Natively it plays a headless run with a simple autopilot and
//! prints the final stats as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use nitro_dash::audio::WebAudio;
    use nitro_dash::consts::{FIELD_HEIGHT, FIELD_WIDTH};
    use nitro_dash::platform::init_logging;
    use nitro_dash::platform::web::{CanvasSink, DomHud};
    use nitro_dash::sim::GamePhase;
    use nitro_dash::{GameLoop, InputEvent, QualityPreset, Settings, Tuning};

    /// Game instance holding the loop and its browser sinks
    struct Game {
        game: GameLoop,
        canvas: CanvasSink,
        hud: DomHud,
        audio: WebAudio,
    }

    impl Game {
        /// One animation frame: simulate, dispatch, draw
        fn frame(&mut self, time: f64) {
            self.game
                .step(time, &mut self.audio, &mut self.hud, &mut self.canvas);
        }

        fn start(&mut self) {
            self.audio.resume();
            if self.game.phase() == GamePhase::Ended {
                self.game.reseed(js_sys::Date::now() as u64);
            }
            if self.game.start() {
                self.hud.show_screen("game-screen");
            }
        }

        fn toggle_pause(&mut self) {
            if !self.game.pause() {
                self.game.resume();
            }
        }

        fn toggle_mute(&mut self) {
            let mut settings = self.game.settings().clone();
            settings.muted = !settings.muted;
            self.audio.apply_settings(&settings);
            log::info!("Audio {}", if settings.muted { "muted" } else { "unmuted" });
            self.game.set_settings(settings);
        }
    }

    /// Quality preset from a `?quality=low|medium|high` page query
    fn quality_from_query(window: &web_sys::Window) -> QualityPreset {
        let search = window.location().search().unwrap_or_default();
        search
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("quality="))
            .and_then(QualityPreset::parse)
            .unwrap_or_default()
    }

    pub fn run() -> Result<(), JsValue> {
        init_logging();
        log::info!("Nitro Dash starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(FIELD_WIDTH as u32);
        canvas.set_height(FIELD_HEIGHT as u32);
        let canvas_sink = CanvasSink::new(&canvas).ok_or("no 2d context")?;

        let quality = quality_from_query(&window);
        let settings = Settings::from_preset(quality);
        let seed = js_sys::Date::now() as u64;
        let hud = DomHud::new(document.clone());
        hud.show_screen("start-screen");

        let game = GameLoop::new(seed, Tuning::default(), settings.clone())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let game = Rc::new(RefCell::new(Game {
            game,
            canvas: canvas_sink,
            hud,
            audio: WebAudio::new(&settings),
        }));
        log::info!("Game initialized with seed: {} ({} quality)", seed, quality.as_str());

        setup_keyboard(&document, game.clone())?;
        setup_buttons(&document, game.clone())?;
        setup_auto_pause(&window, &document, game.clone())?;

        request_animation_frame(game);
        Ok(())
    }

    fn setup_keyboard(document: &web_sys::Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut g = game.borrow_mut();
                match key.as_str() {
                    "Escape" | "p" => {
                        g.toggle_pause();
                        return;
                    }
                    "m" if !event.repeat() => {
                        g.toggle_mute();
                        return;
                    }
                    _ => {}
                }
                if event.repeat() {
                    return;
                }
                if let Some(input) = InputEvent::from_key(&key, true) {
                    event.prevent_default();
                    g.game.handle_input(input);
                }
            });
            document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(input) = InputEvent::from_key(&event.key(), false) {
                game.borrow_mut().game.handle_input(input);
            }
        });
        document.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_buttons(document: &web_sys::Document, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        for id in ["start-btn", "restart-btn"] {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing #{} button", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().start();
            });
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_auto_pause(
        window: &web_sys::Window,
        document: &web_sys::Document,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden
                    && game.borrow_mut().game.pause()
                {
                    log::info!("Auto-paused (tab hidden)");
                }
            });
            document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur (click outside)
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            if game.borrow_mut().game.pause() {
                log::info!("Auto-paused (window blur)");
            }
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game.borrow_mut().frame(time);
            request_animation_frame(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
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
mod headless {
    use nitro_dash::audio::NullAudio;
    use nitro_dash::platform::{SimulatedClock, init_logging};
    use nitro_dash::renderer::{Hud, HudSink, MeshBuilder};
    use nitro_dash::sim::{Direction, GameState, ItemKind, RunStats};
    use nitro_dash::{
        GameLoop, InputEvent, InputSource, QualityPreset, Settings, StopToken, Tuning, TuningError,
    };

    /// Ten minutes of 60 Hz frames
    const FRAME_LIMIT: u64 = 60 * 60 * 10;
    /// How far ahead of the bumper the autopilot looks (px)
    const LOOKAHEAD: f32 = 220.0;

    /// Logs milestones instead of drawing a HUD
    #[derive(Default)]
    struct LogHud {
        last_thousand: u64,
    }

    impl HudSink for LogHud {
        fn update(&mut self, hud: &Hud) {
            let thousand = hud.score / 1000;
            if thousand > self.last_thousand {
                self.last_thousand = thousand;
                log::debug!(
                    "score {} | coins {} | speed {} | nitro {}%",
                    hud.score,
                    hud.currency,
                    hud.speed_text,
                    hud.nitro_percent
                );
            }
        }

        fn show_final(&mut self, stats: &RunStats) {
            log::info!("Game over: {} points, {} coins", stats.score, stats.currency);
        }
    }

    /// Steers away from hazards in the car's lane and toward pickups
    #[derive(Default)]
    struct Autopilot {
        held: Direction,
        boosting: bool,
    }

    impl InputSource for Autopilot {
        fn poll(&mut self, state: &GameState, events: &mut Vec<InputEvent>) {
            let car = state.vehicle.visual_rect();
            let ahead = |y: f32, h: f32| y + h > car.y - LOOKAHEAD && y < car.bottom();
            let in_lane = |x: f32, w: f32| x < car.right() + 10.0 && x + w > car.x - 10.0;

            let threat = state
                .spawner
                .items
                .iter()
                .filter(|i| i.kind == ItemKind::Hazard)
                .filter(|i| ahead(i.pos.y, i.size.y) && in_lane(i.pos.x, i.size.x))
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

            let want = if let Some(hazard) = threat {
                let room_left = car.x;
                let room_right = state.tuning.field_width - car.right();
                let go_left = if hazard.center().x > car.center().x {
                    room_left > 0.0
                } else {
                    room_right <= 0.0
                };
                if go_left { Direction::Left } else { Direction::Right }
            } else if let Some(pickup) = state
                .spawner
                .items
                .iter()
                .filter(|i| i.kind != ItemKind::Hazard && ahead(i.pos.y, i.size.y))
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            {
                let dx = pickup.center().x - car.center().x;
                if dx < -6.0 {
                    Direction::Left
                } else if dx > 6.0 {
                    Direction::Right
                } else {
                    Direction::None
                }
            } else {
                Direction::None
            };

            if want != self.held {
                match self.held {
                    Direction::Left => events.push(InputEvent::LeftReleased),
                    Direction::Right => events.push(InputEvent::RightReleased),
                    Direction::None => {}
                }
                match want {
                    Direction::Left => events.push(InputEvent::LeftPressed),
                    Direction::Right => events.push(InputEvent::RightPressed),
                    Direction::None => {}
                }
                self.held = want;
            }

            let danger = threat.is_some();
            if !self.boosting && !danger && state.nitro.fraction() > 0.8 {
                events.push(InputEvent::BoostPressed);
                self.boosting = true;
            } else if self.boosting && (danger || !state.nitro.active) {
                events.push(InputEvent::BoostReleased);
                self.boosting = false;
            }
        }
    }

    const USAGE: &str = "usage: nitro-dash [SEED] [TUNING.json] [--quality low|medium|high] \
                         [--settings SETTINGS.json] [--print-tuning]";

    /// Command line options
    struct Options {
        seed: u64,
        tuning: Option<String>,
        settings: Option<String>,
        quality: QualityPreset,
        print_tuning: bool,
    }

    impl Options {
        fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
            let mut options = Options {
                seed: 42,
                tuning: None,
                settings: None,
                quality: QualityPreset::Low,
                print_tuning: false,
            };
            let mut positional = 0;
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--quality" => {
                        let value = args.next().ok_or("--quality needs a value")?;
                        options.quality = QualityPreset::parse(&value)
                            .ok_or_else(|| format!("unknown quality preset '{value}'"))?;
                    }
                    "--settings" => {
                        options.settings = Some(args.next().ok_or("--settings needs a path")?);
                    }
                    "--print-tuning" => options.print_tuning = true,
                    flag if flag.starts_with("--") => return Err(format!("unknown option '{flag}'")),
                    _ => {
                        match positional {
                            0 => {
                                options.seed =
                                    arg.parse().map_err(|_| format!("seed must be a number, got '{arg}'"))?
                            }
                            1 => options.tuning = Some(arg.clone()),
                            _ => return Err(format!("unexpected argument '{arg}'")),
                        }
                        positional += 1;
                    }
                }
            }
            Ok(options)
        }
    }

    fn read_file(path: &str) -> Result<String, TuningError> {
        std::fs::read_to_string(path).map_err(|e| TuningError::Io {
            path: path.to_string(),
            source: e,
        })
    }

    fn load_tuning(path: Option<&str>) -> Result<Tuning, TuningError> {
        match path {
            Some(path) => {
                let tuning = Tuning::from_json(&read_file(path)?)?;
                log::info!("Loaded tuning from {}", path);
                Ok(tuning)
            }
            None => Ok(Tuning::default()),
        }
    }

    /// A settings file wins over `--quality`
    fn load_settings(path: Option<&str>, quality: QualityPreset) -> Result<Settings, TuningError> {
        match path {
            Some(path) => {
                let settings = Settings::from_json(&read_file(path)?)?;
                log::info!("Loaded settings from {}", path);
                Ok(settings)
            }
            None => Ok(Settings::from_preset(quality)),
        }
    }

    pub fn run() -> Result<(), TuningError> {
        init_logging();

        let options = match Options::parse(std::env::args().skip(1)) {
            Ok(options) => options,
            Err(msg) => {
                eprintln!("error: {msg}\n{USAGE}");
                std::process::exit(2);
            }
        };
        let tuning = load_tuning(options.tuning.as_deref())?;
        if options.print_tuning {
            println!("{}", tuning.to_json_pretty()?);
            return Ok(());
        }
        let settings = load_settings(options.settings.as_deref(), options.quality)?;
        log::info!(
            "Nitro Dash (headless) starting: seed {}, {} quality",
            options.seed,
            settings.quality.as_str()
        );

        let mut game = GameLoop::new(options.seed, tuning, settings)?;
        let mut clock = SimulatedClock::new(60.0, Some(FRAME_LIMIT));
        let mut mesh = MeshBuilder::new();
        let stats = game.run(
            &mut clock,
            &mut Autopilot::default(),
            &StopToken::new(),
            &mut NullAudio,
            &mut LogHud::default(),
            &mut mesh,
        );

        log::info!(
            "Finished after {} frames ({} vertices in the last frame)",
            clock.frames(),
            mesh.vertices.len()
        );
        println!("{}", serde_json::to_string_pretty(&stats)?);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = headless::run() {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

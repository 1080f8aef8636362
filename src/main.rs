//! Rune Strike entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use rune_strike::GameController;
    use rune_strike::Settings;
    use rune_strike::audio::WebAudio;
    use rune_strike::consts::SIM_DT;
    use rune_strike::renderer::SceneRenderer;
    use rune_strike::sim::{GamePhase, Rune};

    /// Game instance holding all state
    struct Game {
        controller: GameController<SceneRenderer, WebAudio>,
        canvas: HtmlCanvasElement,
        render_scale: f64,
        last_time: f64,
        last_phase: GamePhase,
    }

    impl Game {
        /// Advance and draw one animation frame
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            self.controller.frame(dt);

            let phase = self.controller.phase();
            if phase != self.last_phase {
                if phase == GamePhase::GameOver {
                    // Give the cursor back so the restart button can be clicked
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        document.exit_pointer_lock();
                    }
                }
                self.last_phase = phase;
            }
        }

        /// Match the canvas backing store to its CSS size
        fn resize(&mut self) {
            let Some(window) = web_sys::window() else { return };
            let (width, height) = canvas_size(&window, &self.canvas, self.render_scale);
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.controller.resize(width, height);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let hud = self.controller.hud();

            if let Some(el) = document.get_element_by_id("hp-display") {
                let _ = el.set_attribute("style", &format!("width: {}", hud.health_width));
            }
            if let Some(el) = document.get_element_by_id("score-display") {
                el.set_text_content(Some(&hud.score));
            }

            for (id, rune) in [("ui-red", Rune::Q), ("ui-yellow", Rune::E), ("ui-blue", Rune::R)] {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", &hud.rune_class(rune));
                }
            }

            set_visible(&document, "overlay", hud.show_overlay);
            set_visible(&document, "game-over", hud.show_game_over);
            set_visible(&document, "damage-flash", hud.damage_flash);

            if hud.show_game_over {
                if let Some(el) = document.get_element_by_id("final-score") {
                    el.set_text_content(Some(&hud.final_score));
                }
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn canvas_size(window: &web_sys::Window, canvas: &HtmlCanvasElement, scale: f64) -> (u32, u32) {
        let dpr = window.device_pixel_ratio() * scale;
        let width = (canvas.client_width() as f64 * dpr).max(1.0) as u32;
        let height = (canvas.client_height() as f64 * dpr).max(1.0) as u32;
        (width, height)
    }

    fn request_pointer_lock() {
        if let Some(canvas) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("canvas"))
        {
            canvas.request_pointer_lock();
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Rune Strike starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let settings = Settings::load();
        let render_scale = settings.render_scale as f64;
        let (width, height) = canvas_size(&window, &canvas, render_scale);
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize WebGPU, falling back to WebGL2
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let renderer = SceneRenderer::new(surface, &adapter, width, height).await;

        let seed = js_sys::Date::now() as u64;
        let audio = WebAudio::new(&settings, seed);
        let controller = GameController::new(renderer, audio, settings, seed);

        let game = Rc::new(RefCell::new(Game {
            controller,
            canvas: canvas.clone(),
            render_scale,
            last_time: 0.0,
            last_phase: GamePhase::Idle,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_window_handlers(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Rune Strike running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Pointer lock drives start/pause
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let locked = document_clone.pointer_lock_element().is_some();
                if locked {
                    log::info!("Pointer lock acquired");
                } else {
                    log::info!("Pointer lock released");
                }
                game.borrow_mut().controller.pointer_lock_changed(locked);
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockchange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Pointer lock error handler
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                log::error!("Pointer lock error!");
            });
            let _ = document.add_event_listener_with_callback(
                "pointerlockerror",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Mouse look uses relative movement
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .controller
                    .mouse_move(event.movement_x() as f32, event.movement_y() as f32);
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Fire while locked, otherwise ask for the lock
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.controller.pointer_locked() {
                    g.controller.mouse_down();
                } else if g.controller.phase() != GamePhase::GameOver {
                    drop(g);
                    request_pointer_lock();
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().controller.key_down(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().controller.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                request_pointer_lock();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().controller.restart();
                request_pointer_lock();
                log::info!("Game restarted");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keys released while unfocused never send keyup
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().controller.blur();
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ =
                window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Scripted headless session: arm a rune, shoot what comes, report
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rune_strike::audio::{RecordingAudio, SoundCue};
    use rune_strike::consts::SIM_DT;
    use rune_strike::renderer::HeadlessRenderer;
    use rune_strike::sim::GamePhase;
    use rune_strike::{GameController, Settings};

    env_logger::init();
    log::info!("Rune Strike (native) starting...");
    log::info!("Native mode runs headless - serve the wasm build for the playable version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);

    let mut game = GameController::new(
        HeadlessRenderer::new(),
        RecordingAudio::default(),
        Settings::default(),
        seed,
    );
    game.pointer_lock_changed(true);
    game.key_down("q");

    // Two minutes of play, firing twice a second
    for frame in 0..60 * 120 {
        if frame % 30 == 0 {
            game.mouse_down();
        }
        game.frame(SIM_DT);
        if game.phase() == GamePhase::GameOver {
            break;
        }
    }

    let state = game.state();
    let hud = game.hud();
    log::info!(
        "Finished after {} ticks: phase {:?}, score {}, health {}",
        state.time_ticks,
        state.phase,
        hud.score,
        hud.health_width
    );
    log::info!(
        "Shots {}, hits {}, damage taken {}, drawables live {}",
        game.audio().count(SoundCue::Fire),
        game.audio().count(SoundCue::EnemyHit),
        game.audio().count(SoundCue::PlayerDamage),
        game.renderer().live()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

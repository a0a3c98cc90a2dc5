//! Grid Glider entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use grid_glider::consts::OBSTACLE_TEXTURE_COUNT;
    use grid_glider::platform;
    use grid_glider::renderer::SceneRenderState;
    use grid_glider::renderer::texture;
    use grid_glider::sim::{GameEvent, SpawnTicket, TextureSlot};
    use grid_glider::{Session, Settings};

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<SceneRenderState>,
        /// Pending `setTimeout` of the live spawn chain
        spawn_timeout: Option<i32>,
        /// Last score text written to the DOM
        score_text: String,
    }

    impl Game {
        fn new(session: Session) -> Self {
            Self {
                session,
                render_state: None,
                spawn_timeout: None,
                score_text: String::new(),
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.session.state) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update score text and overlay in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };

            let text = self.session.state.score_text();
            if text != self.score_text {
                if let Some(el) = document.get_element_by_id("score") {
                    el.set_text_content(Some(&text));
                }
                self.score_text = text;
            }

            if let Some(el) = document.get_element_by_id("overlay") {
                let _ = if self.session.state.game_over {
                    el.class_list().remove_1("hidden")
                } else {
                    el.class_list().add_1("hidden")
                };
            }
        }

        /// Drop the pending timer of a superseded spawn chain
        fn cancel_spawn_timeout(&mut self) {
            if let Some(handle) = self.spawn_timeout.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_timeout_with_handle(handle);
                }
            }
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Grid Glider starting...");

        let settings = Settings::load();
        settings.save();

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (width, height) = viewport_size(&canvas);

        // Initialize WebGPU (WebGL2 fallback)
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

        let render_state =
            SceneRenderState::new(surface, &adapter, width, height, &settings).await;

        let seed = platform::run_seed();
        let (session, first_chain) = Session::start(seed, now_ms());
        let game = Rc::new(RefCell::new(Game::new(session)));
        game.borrow_mut().render_state = Some(render_state);

        load_obstacle_textures(game.clone(), &settings);
        setup_resize_handler(canvas, game.clone());
        setup_input_handlers(game.clone());

        // First obstacle, then the timer chain
        run_spawn_chain(game.clone(), first_chain);

        // Start game loop
        request_animation_frame(game);

        log::info!("Grid Glider running!");
    }

    /// Canvas backing size in device pixels, matched to the viewport
    fn viewport_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let Some(window) = web_sys::window() else {
            return (canvas.width(), canvas.height());
        };
        let dpr = window.device_pixel_ratio();
        let inner_w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let inner_h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let width = ((inner_w * dpr) as u32).max(1);
        let height = ((inner_h * dpr) as u32).max(1);
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    /// Fetch all obstacle textures in the background
    fn load_obstacle_textures(game: Rc<RefCell<Game>>, settings: &Settings) {
        for i in 0..OBSTACLE_TEXTURE_COUNT {
            let slot = TextureSlot(i);
            let path = settings.asset_path(&slot.file_name());
            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let loaded = platform::load_binary(&path)
                    .await
                    .and_then(|bytes| texture::decode(&bytes, &path));
                match loaded {
                    Ok(img) => {
                        if let Some(render_state) = game.borrow_mut().render_state.as_mut() {
                            render_state.install_texture(slot, &img);
                        }
                    }
                    Err(e) => log::warn!("Texture {} unavailable: {:#}", path, e),
                }
            });
        }
    }

    /// Run one spawn step and, if the chain is still live, schedule the next
    fn run_spawn_chain(game: Rc<RefCell<Game>>, ticket: SpawnTicket) {
        let step = {
            let mut g = game.borrow_mut();
            let step = g.session.spawn(ticket);
            if step.is_some() {
                // This timer just fired
                g.spawn_timeout = None;
            }
            step
        };
        let (Some(step), Some(window)) = (step, web_sys::window()) else {
            return;
        };

        let next = game.clone();
        let callback = Closure::once_into_js(move || run_spawn_chain(next, ticket));
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.unchecked_ref(),
            step.next_delay_ms as i32,
        ) {
            Ok(handle) => game.borrow_mut().spawn_timeout = Some(handle),
            Err(e) => log::error!("Failed to schedule spawn: {:?}", e),
        }
    }

    fn setup_resize_handler(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = viewport_size(&canvas);
            if let Some(render_state) = game.borrow_mut().render_state.as_mut() {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let restarted = {
                let mut g = game.borrow_mut();
                match g.session.key_down(&event.key(), &event.code(), now_ms()) {
                    Some(GameEvent::Restarted { ticket }) => {
                        g.cancel_spawn_timeout();
                        g.update_hud();
                        Some(ticket)
                    }
                    Some(GameEvent::LaneChanged { lane }) => {
                        log::debug!("Lane {}", lane);
                        None
                    }
                    _ => None,
                }
            };
            if let Some(ticket) = restarted {
                run_spawn_chain(game.clone(), ticket);
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.session.frame(time);
            g.render();
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

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Grid Glider (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let seed = grid_glider::platform::run_seed();
    let session = headless_run(seed, 120_000.0);
    println!(
        "{} after {:.1}s ({})",
        session.state.score_text(),
        session.state.score / grid_glider::consts::SCORE_RATE,
        if session.state.game_over { "crashed" } else { "survived" }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Simulate a 60 Hz session with the player idle in the center lane
#[cfg(not(target_arch = "wasm32"))]
fn headless_run(seed: u64, max_ms: f64) -> grid_glider::Session {
    const FRAME_MS: f64 = 1000.0 / 60.0;

    let (mut session, chain) = grid_glider::Session::start(seed, 0.0);
    let mut next_spawn_at = session.spawn(chain).map(|step| step.next_delay_ms);
    let mut now = 0.0;

    while !session.state.game_over && now < max_ms {
        now += FRAME_MS;
        if let Some(due) = next_spawn_at.filter(|&due| now >= due) {
            next_spawn_at = session.spawn(chain).map(|step| due + step.next_delay_ms);
        }
        session.frame(now);
    }

    session
}

//! Hand Jump entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use web_sys::{HtmlCanvasElement, HtmlElement};

    use hand_jump::audio::AudioManager;
    use hand_jump::platform::dom::{self, Hud};
    use hand_jump::platform::frame_loop::FrameLoop;
    use hand_jump::platform::FrameClock;
    use hand_jump::renderer::{RenderState, build_frame};
    use hand_jump::vision::{VisionPoller, teachable};
    use hand_jump::{Director, GestureBus, InitError, Tuning};

    thread_local! {
        // Dropping a FrameLoop stops it, so the page keeps them here
        static LOOPS: RefCell<Vec<FrameLoop>> = const { RefCell::new(Vec::new()) };
    }

    fn keep_running(frame_loop: FrameLoop) {
        LOOPS.with(|loops| loops.borrow_mut().push(frame_loop));
    }

    /// Game instance holding all per-frame state
    struct Game {
        director: Director,
        render_state: RenderState,
        hud: Hud,
        audio: AudioManager,
        clock: FrameClock,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let dt = self.clock.advance(time);
            let events = self.director.update(dt);
            self.audio.play_events(&events);
            self.render();
            self.hud.show(self.director.hud());
        }

        fn render(&mut self) {
            let vertices = build_frame(&self.director);
            match self.render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    let (w, h) = self.render_state.size;
                    self.render_state.resize(w, h);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    pub async fn run() -> Result<(), InitError> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Hand Jump starting...");

        let tuning = Tuning::load();
        let window = web_sys::window().ok_or(InitError::NoWindow)?;
        let document = dom::document()?;
        let container: HtmlElement = dom::element(&document, "game-container")?;

        // Game canvas fills the window
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(|e| InitError::Graphics(format!("{:?}", e)))?
            .dyn_into()
            .map_err(|_| InitError::Graphics("created element is not a canvas".to_string()))?;
        let css_w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let css_h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        let dpr = window.device_pixel_ratio();
        let width = (css_w * dpr) as u32;
        let height = (css_h * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        let _ = canvas.set_attribute(
            "style",
            &format!("display:block;width:{}px;height:{}px;", css_w, css_h),
        );
        container
            .append_child(&canvas)
            .map_err(|e| InitError::Graphics(format!("{:?}", e)))?;

        // Initialize WebGPU (WebGL2 fallback)
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| InitError::Graphics(format!("failed to create surface: {}", e)))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| InitError::Graphics(format!("failed to get adapter: {}", e)))?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state =
            RenderState::new(surface, &adapter, width, height, (css_w as f32, css_h as f32))
                .await?;

        let hud = Hud::new(&document, &container)?;

        let seed = js_sys::Date::now() as u64;
        let bus = GestureBus::new();
        let director = Director::new(
            bus.clone(),
            tuning.game.clone(),
            css_w as f32,
            css_h as f32,
            seed,
        );
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            director,
            render_state,
            hud,
            audio: AudioManager::new(),
            clock: FrameClock::new(),
        }));

        let game_loop = FrameLoop::start(move |time| game.borrow_mut().frame(time))
            .map_err(|e| InitError::Graphics(format!("{:?}", e)))?;
        keep_running(game_loop);

        // Camera permission can take a while; the game runs meanwhile
        let poller = Rc::new(RefCell::new(VisionPoller::new(bus, &tuning.vision)));
        wasm_bindgen_futures::spawn_local(async move {
            if let Some(vision_loop) = teachable::launch(tuning.vision.clone(), poller).await {
                keep_running(vision_loop);
            }
        });

        log::info!("Hand Jump running!");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_app::run().await {
        log::error!("Startup failed: {}", e);
        hand_jump::platform::dom::alert(&format!("Hand Jump could not start: {}", e));
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hand Jump (native) starting...");
    log::info!("The playable build is wasm - run with `trunk serve`; running a scripted demo");

    let summary = demo::run(20.0);
    println!(
        "\nScripted demo: {} gesture(s), {} run(s), final score {}",
        summary.gestures, summary.runs, summary.final_score
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run that feeds synthetic classifier output through the real
/// vision poller and director
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use hand_jump::sim::GameEvent;
    use hand_jump::vision::{Prediction, VisionPoller};
    use hand_jump::{Director, GestureBus, Tuning};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub struct Summary {
        pub gestures: u64,
        pub runs: u32,
        pub final_score: u64,
    }

    /// Open probability at `t_ms`: a short open-hand pulse every 1.5 s
    fn open_probability(t_ms: f64) -> f32 {
        let phase = t_ms % 1500.0;
        if (200.0..260.0).contains(&phase) { 0.99 } else { 0.05 }
    }

    pub fn run(seconds: f64) -> Summary {
        let tuning = Tuning::default();
        let bus = GestureBus::new();
        let mut director = Director::new(bus.clone(), tuning.game.clone(), 1280.0, 720.0, 7);
        let mut poller = VisionPoller::new(bus, &tuning.vision);

        let frames = (seconds * 1000.0 / FRAME_MS) as u64;
        for frame in 0..frames {
            let now = frame as f64 * FRAME_MS;
            let p = open_probability(now);
            let predictions = [
                Prediction::new("Closed", 1.0 - p),
                Prediction::new("Open", p),
            ];
            poller.process(&predictions, now);

            for event in director.update((FRAME_MS / 1000.0) as f32) {
                match event {
                    GameEvent::Spawned { .. } => {}
                    other => log::info!("{:>8.0} ms  {:?}", now, other),
                }
            }
        }

        Summary {
            gestures: poller.gestures_emitted(),
            runs: director.runs(),
            final_score: director.session().map_or(0, |s| s.score()),
        }
    }

}

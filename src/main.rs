//! Glyph Rain entry point
//!
//! Handles platform-specific initialization and runs the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, EventTarget, HtmlCanvasElement};

    use glyph_rain::consts::MAX_DT;
    use glyph_rain::renderer::GlyphRenderState;
    use glyph_rain::settings::{QualityPreset, RainConfig, Settings};
    use glyph_rain::sim::{OverlayState, RainState, TickInput, tick};

    /// App instance holding all state
    struct App {
        state: RainState,
        render_state: Option<GlyphRenderState>,
        input: TickInput,
        last_time: f64,
        last_overlay: Option<OverlayState>,
        /// Cleared by stop(); the loop stops rescheduling once false
        running: Rc<Cell<bool>>,
    }

    impl App {
        fn new(config: RainConfig, seed: u64, reduced_motion: bool) -> Self {
            Self {
                state: RainState::new(config, seed, reduced_motion),
                render_state: None,
                input: TickInput::default(),
                last_time: 0.0,
                last_overlay: None,
                running: Rc::new(Cell::new(true)),
            }
        }

        fn update(&mut self, dt: f32) {
            let input = self.input;
            tick(&mut self.state, &input, dt);
        }

        /// Render the current frame
        fn render(&mut self, time: f64) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.state, time) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                        self.running.set(false);
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Toggle overlay element classes when visibility changes
        fn update_overlays(&mut self) {
            let overlay = self.state.overlay;
            if self.last_overlay == Some(overlay) {
                return;
            }
            self.last_overlay = Some(overlay);

            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("reveal") {
                let _ = el.class_list().toggle_with_force("show", overlay.reveal);
            }
            if let Some(el) = document.get_element_by_id("hint") {
                let _ = el.class_list().toggle_with_force("hide", !overlay.hint);
            }
            if let Some(el) = document.get_element_by_id("actions") {
                let _ = el.class_list().toggle_with_force("show", overlay.actions);
            }
        }
    }

    /// A registered DOM listener that can be deregistered on teardown.
    /// The original page leaked these for the lifetime of the tab; keeping
    /// the closure alive here lets stop() actually remove it.
    struct ListenerHandle {
        target: EventTarget,
        name: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl ListenerHandle {
        fn attach(
            target: &EventTarget,
            name: &'static str,
            closure: Closure<dyn FnMut(web_sys::Event)>,
        ) -> Self {
            let _ = target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            Self {
                target: target.clone(),
                name,
                closure,
            }
        }
    }

    impl Drop for ListenerHandle {
        fn drop(&mut self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref());
        }
    }

    thread_local! {
        static RUNNING_APP: RefCell<Option<(Rc<RefCell<App>>, Vec<ListenerHandle>)>> =
            const { RefCell::new(None) };
    }

    /// Read the latest scroll metrics into the cached input scalars
    fn sample_scroll_metrics(app: &Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Some(root) = document.document_element() else {
            return;
        };

        let scroll_px = window.scroll_y().unwrap_or(0.0) as f32;
        let inner_h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as f32;
        let max_scroll_px = root.scroll_height() as f32 - inner_h;

        let mut a = app.borrow_mut();
        a.input.scroll_px = scroll_px;
        a.input.max_scroll_px = max_scroll_px;
    }

    /// Surface a GPU initialization failure to the page instead of dying
    /// silently in the console
    fn show_fallback(document: &Document, message: &str) {
        log::error!("{message}");
        if let Some(el) = document.get_element_by_id("fallback") {
            el.set_text_content(Some(message));
            let _ = el.class_list().remove_1("hidden");
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Glyph Rain starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("c")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Cap DPR at 2 like the page this was tuned on; 3x+ buys nothing here
        let dpr = window.device_pixel_ratio().min(2.0);
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let mut config = RainConfig::default();
        config.apply_preset(settings.quality);

        let reduced_motion = settings.reduced_motion
            || window
                .match_media("(prefers-reduced-motion: reduce)")
                .ok()
                .flatten()
                .map(|m| m.matches())
                .unwrap_or(false);

        let seed = js_sys::Date::now() as u64;
        let max_instances = config.instance_capacity();
        let app = Rc::new(RefCell::new(App::new(config, seed, reduced_motion)));
        log::info!("Initialized with seed {seed} (reduced_motion: {reduced_motion})");

        // Initialize WebGPU; failure degrades to the static fallback
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                show_fallback(&document, &format!("WebGPU surface unavailable: {e}"));
                return;
            }
        };

        let Some(adapter) = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok()
        else {
            show_fallback(&document, "WebGPU adapter unavailable in this browser");
            return;
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match GlyphRenderState::new(surface, &adapter, width, height, max_instances).await {
            Ok(mut render_state) => {
                render_state.set_start_time(js_sys::Date::now());
                render_state.glow_enabled = settings.effective_glow();
                app.borrow_mut().render_state = Some(render_state);
            }
            Err(e) => {
                show_fallback(&document, &format!("WebGPU device request failed: {e}"));
                return;
            }
        }

        let listeners = setup_event_handlers(&window, &canvas, app.clone());
        sample_scroll_metrics(&app);

        RUNNING_APP.with(|slot| {
            *slot.borrow_mut() = Some((app.clone(), listeners));
        });

        request_animation_frame(app);

        log::info!("Glyph Rain running");
    }

    fn setup_event_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) -> Vec<ListenerHandle> {
        let mut listeners = Vec::new();

        // Scroll - cache raw metrics only; the next tick picks them up
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                sample_scroll_metrics(&app);
            });
            listeners.push(ListenerHandle::attach(window.as_ref(), "scroll", closure));
        }

        // Resize - recompute surface size and scroll range
        {
            let app = app.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(window) = web_sys::window() {
                    let dpr = window.device_pixel_ratio().min(2.0);
                    let width = (canvas.client_width() as f64 * dpr) as u32;
                    let height = (canvas.client_height() as f64 * dpr) as u32;
                    canvas.set_width(width);
                    canvas.set_height(height);

                    if let Some(ref mut rs) = app.borrow_mut().render_state {
                        rs.resize(width, height);
                    }
                }
                sample_scroll_metrics(&app);
            });
            listeners.push(ListenerHandle::attach(window.as_ref(), "resize", closure));
        }

        listeners
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let running = app.borrow().running.clone();
        if !running.get() {
            return;
        }
        let window = web_sys::window().expect("no window");
        let closure = Closure::once(move |time: f64| {
            frame(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                MAX_DT
            };
            a.last_time = time;

            a.update(dt);
            a.render(time);
            a.update_overlays();
        }

        request_animation_frame(app);
    }

    /// Halt the loop and deregister all listeners. Safe to call more than
    /// once; restart requires a page reload.
    pub fn stop() {
        RUNNING_APP.with(|slot| {
            if let Some((app, listeners)) = slot.borrow_mut().take() {
                app.borrow().running.set(false);
                drop(listeners);
                log::info!("Glyph Rain stopped");
            }
        });
    }

    /// Persist a new quality preset. Pool sizes are fixed at startup, so the
    /// change takes effect on the next page load.
    pub fn set_quality(preset: &str) -> bool {
        let Some(quality) = QualityPreset::from_str(preset) else {
            log::warn!("Unknown quality preset: {preset}");
            return false;
        };
        let mut settings = Settings::load();
        settings.quality = quality;
        settings.save();
        log::info!("Quality set to {}", quality.as_str());
        true
    }

    /// Persist and apply the glow preference. Render-layer only, so it can
    /// flip live without touching the running sim.
    pub fn set_glow(enabled: bool) {
        let mut settings = Settings::load();
        settings.glow = enabled;
        settings.save();
        let effective = settings.effective_glow();
        RUNNING_APP.with(|slot| {
            if let Some((app, _)) = slot.borrow().as_ref() {
                if let Some(ref mut rs) = app.borrow_mut().render_state {
                    rs.glow_enabled = effective;
                }
            }
        });
        log::info!("Glow set to {enabled}");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

/// Exported teardown hook for the host page
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop() {
    wasm_app::stop();
}

/// Host-page settings hooks. Quality applies on the next load; glow flips
/// live on the render layer.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_quality(preset: &str) -> bool {
    wasm_app::set_quality(preset)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn set_glow(enabled: bool) {
    wasm_app::set_glow(enabled);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glyph_rain::consts::MAX_DT;
    use glyph_rain::settings::RainConfig;
    use glyph_rain::sim::{Phase, RainState, TickInput, tick};

    env_logger::init();
    log::info!("Glyph Rain (native) - headless scroll sweep");

    // Drive a full scroll sweep and report phase transitions
    let mut state = RainState::new(RainConfig::default(), 42, false);
    let mut last_phase = state.phase;
    let steps = 600;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let input = TickInput {
            scroll_px: t * 4000.0,
            max_scroll_px: 4000.0,
        };
        tick(&mut state, &input, MAX_DT);
        if state.phase != last_phase {
            println!(
                "progress {:.3}: {:?} -> {:?} ({} instances)",
                t,
                last_phase,
                state.phase,
                state.instances.len()
            );
            last_phase = state.phase;
        }
    }
    assert!(matches!(state.phase, Phase::StreamWipe { .. } | Phase::Revealed));
    println!("sweep complete: final phase {:?}", state.phase);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

//! Hexfloor entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

    use hexfloor::camera::{Camera, OrbitController};
    use hexfloor::ndc_from_client;
    use hexfloor::renderer::RenderState;
    use hexfloor::settings::Settings;
    use hexfloor::sim::{FieldState, FrameInput};

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Application state for the frame loop
    struct App {
        settings: Settings,
        field: FieldState,
        camera: Camera,
        orbit: OrbitController,
        render_state: Option<RenderState>,
        input: FrameInput,
        // Orbit drag state
        dragging: bool,
        last_drag: (f32, f32),
        viewport: (f32, f32),
        last_time: f64,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
        // Set on teardown; the frame loop stops rescheduling
        shutdown: bool,
    }

    impl App {
        fn new(settings: Settings, field: FieldState, width: f32, height: f32) -> Self {
            let camera = Camera::new(width / height);
            let orbit = OrbitController::from_camera(&camera);
            Self {
                settings,
                field,
                camera,
                orbit,
                render_state: None,
                input: FrameInput::default(),
                dragging: false,
                last_drag: (0.0, 0.0),
                viewport: (width, height),
                last_time: 0.0,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
                shutdown: false,
            }
        }

        /// Advance one frame: camera, then the field tick, then rendering
        fn update(&mut self, dt: f32, time: f64) {
            self.orbit.update(&mut self.camera, dt);

            let ctx = self.field.tick(&self.input, Some(&self.camera), dt);
            self.input.clear();

            if let Some(ref mut render_state) = self.render_state {
                let result = render_state.render(
                    &ctx,
                    &self.camera,
                    self.field.floor.size,
                    self.field.floor.y,
                    &self.settings,
                );
                match result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                        self.shutdown = true;
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn resize(&mut self, width: f32, height: f32) {
            self.viewport = (width, height);
            self.camera.set_viewport(width, height);
        }

        fn update_hud(&self) {
            if !self.settings.show_fps {
                return;
            }
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("hud-fps") {
                el.set_text_content(Some(&self.fps.to_string()));
            }
        }
    }

    /// A registered DOM listener that can be detached on teardown
    struct EventHandle {
        target: web_sys::EventTarget,
        name: &'static str,
        closure: Closure<dyn FnMut(web_sys::Event)>,
    }

    impl EventHandle {
        fn attach(
            target: &web_sys::EventTarget,
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

        fn detach(&self) {
            let _ = self
                .target
                .remove_event_listener_with_callback(self.name, self.closure.as_ref().unchecked_ref());
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Hexfloor starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Build the field
        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let mut rng = Pcg32::seed_from_u64(seed);
        let field = match FieldState::new(
            &settings.grid_config(),
            settings.displacement_radius_max,
            settings.displacement_height_max,
            settings.highlight_radius_max,
            &mut rng,
        ) {
            Ok(field) => field,
            Err(e) => {
                log::error!("Invalid grid config: {e}");
                return;
            }
        };

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
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

        let render_state = RenderState::new(surface, &adapter, width, height, &field).await;

        let app = Rc::new(RefCell::new(App::new(
            settings,
            field,
            client_w as f32,
            client_h as f32,
        )));
        app.borrow_mut().render_state = Some(render_state);

        let handles = setup_input_handlers(&canvas, app.clone());
        setup_teardown(app.clone(), handles);

        request_animation_frame(app);

        log::info!("Hexfloor running!");
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) -> Vec<EventHandle> {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        let mut handles = Vec::new();

        // Pointer move: record the NDC cursor, and feed the orbit drag
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let event: MouseEvent = event.unchecked_into();
                let mut a = app.borrow_mut();
                let (w, h) = a.viewport;
                a.input.cursor = Some(ndc_from_client(
                    event.client_x() as f32,
                    event.client_y() as f32,
                    w,
                    h,
                ));
                if a.dragging {
                    let (lx, ly) = a.last_drag;
                    let dx = event.client_x() as f32 - lx;
                    let dy = event.client_y() as f32 - ly;
                    a.orbit.rotate(dx * -0.005, dy * 0.005);
                }
                a.last_drag = (event.client_x() as f32, event.client_y() as f32);
            });
            handles.push(EventHandle::attach(&document, "pointermove", closure));
        }

        // Hover edges on the document, like the surface-wide tracking area
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().input.entered = true;
            });
            handles.push(EventHandle::attach(&document, "mouseenter", closure));
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().input.left = true;
            });
            handles.push(EventHandle::attach(&document, "mouseleave", closure));
        }

        // Orbit drag start/stop
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let event: MouseEvent = event.unchecked_into();
                let mut a = app.borrow_mut();
                a.dragging = true;
                a.last_drag = (event.client_x() as f32, event.client_y() as f32);
            });
            handles.push(EventHandle::attach(canvas, "mousedown", closure));
        }
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().dragging = false;
            });
            handles.push(EventHandle::attach(&document, "mouseup", closure));
        }

        // Zoom
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let event: WheelEvent = event.unchecked_into();
                app.borrow_mut().orbit.zoom(event.delta_y() as f32 * 0.002);
            });
            handles.push(EventHandle::attach(canvas, "wheel", closure));
        }

        // Resize
        {
            let app = app.clone();
            let canvas = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let window = web_sys::window().unwrap();
                let dpr = window.device_pixel_ratio();
                let client_w = canvas.client_width();
                let client_h = canvas.client_height();
                let width = (client_w as f64 * dpr) as u32;
                let height = (client_h as f64 * dpr) as u32;
                canvas.set_width(width);
                canvas.set_height(height);

                let mut a = app.borrow_mut();
                a.resize(client_w as f32, client_h as f32);
                if let Some(ref mut render_state) = a.render_state {
                    render_state.resize(width, height);
                }
            });
            handles.push(EventHandle::attach(&window, "resize", closure));
        }

        handles
    }

    /// Tear down synchronously when the page goes away: stop the frame loop
    /// and detach every input listener so nothing fires afterward.
    fn setup_teardown(app: Rc<RefCell<App>>, handles: Vec<EventHandle>) {
        let window = web_sys::window().unwrap();
        let handles = RefCell::new(handles);
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().shutdown = true;
            for handle in handles.borrow().iter() {
                handle.detach();
            }
            handles.borrow_mut().clear();
            log::info!("Hexfloor torn down");
        });
        let _ = window
            .add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();
            if a.shutdown {
                return;
            }

            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                1.0 / 60.0
            };
            let dt = dt.min(0.1);
            a.last_time = time;

            a.update(dt, time);
            a.update_hud();
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use hexfloor::camera::Camera;
    use hexfloor::settings::{GridPreset, Settings};
    use hexfloor::sim::{FieldState, FrameInput};

    env_logger::init();
    log::info!("Hexfloor (native) starting headless smoke run");

    let mut settings = Settings::default();
    settings.grid = GridPreset::Medium;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut rng = Pcg32::seed_from_u64(seed);

    let mut field = match FieldState::new(
        &settings.grid_config(),
        settings.displacement_radius_max,
        settings.displacement_height_max,
        settings.highlight_radius_max,
        &mut rng,
    ) {
        Ok(field) => field,
        Err(e) => {
            log::error!("Invalid grid config: {e}");
            return;
        }
    };

    let camera = Camera::new(16.0 / 9.0);
    let dt = 1.0 / 60.0;

    // Scripted pointer: enter at center, sweep right, leave
    let mut input = FrameInput {
        cursor: Some(Vec2::ZERO),
        entered: true,
        ..Default::default()
    };
    let mut last = field.tick(&input, Some(&camera), dt);
    input.clear();
    log::info!("hover edge on first frame: {:?}", last.edge);

    for frame in 1..240 {
        if frame < 120 {
            let t = frame as f32 / 120.0;
            input.cursor = Some(Vec2::new(t * 0.8, 0.0));
        } else if frame == 120 {
            input.left = true;
        }

        last = field.tick(&input, Some(&camera), dt);
        input.clear();

        if frame % 60 == 0 {
            log::info!(
                "frame {frame}: contact={:?} radius={:.3} height={:.3} highlight={:.4}",
                last.contact_point,
                last.radius,
                last.height,
                last.highlight,
            );
        }
    }

    let mut offsets = Vec::new();
    field.displacement_offsets(&last, &mut offsets);
    let peak = offsets.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    log::info!(
        "smoke run done: {} tiles, envelope {:.2}x{:.2}, peak offset {:.4}",
        field.grid.count(),
        field.bounds.extent().x,
        field.bounds.extent().z,
        peak,
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

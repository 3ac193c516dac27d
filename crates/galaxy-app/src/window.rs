//! Window creation and event handling via winit.
//!
//! [`GalaxyApp`] implements winit's [`ApplicationHandler`]: it owns the GPU
//! context, the point scene, the orbit camera and the [`GalaxyDriver`], and
//! runs one frame per `RedrawRequested`.

use std::sync::{Arc, Mutex};

use galaxy_config::{CameraConfig, Config};
use galaxy_debug::{DebugServer, DebugState, create_debug_server, get_debug_port};
use galaxy_gen::GalaxyRng;
use galaxy_input::{KeyboardState, MouseState};
use galaxy_render::{
    FrameEncoder, GpuPointScene, OrbitCamera, RenderContext, RenderPassBuilder, SurfaceError,
    SurfaceResizeEvent, SurfaceWrapper, init_render_context_blocking, pixel_ratio,
};
use glam::Vec3;
use tracing::{error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::{MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::clock::{FrameClock, FrameTiming};
use crate::driver::GalaxyDriver;
use crate::panel::{PanelEvent, ParameterPanel};

/// Seconds between title refreshes when stats are shown.
const TITLE_REFRESH_INTERVAL: f64 = 1.0;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Build the orbit camera described by `config`.
pub fn camera_from_config(config: &CameraConfig, aspect_ratio: f32) -> OrbitCamera {
    let mut camera = OrbitCamera::looking_at_origin(
        Vec3::from_array(config.position),
        config.fov_y_degrees.to_radians(),
        aspect_ratio,
    );
    camera.near = config.near;
    camera.far = config.far;
    camera.min_distance = config.min_distance;
    camera.max_distance = config.max_distance;
    camera.rotate_speed = config.rotate_speed;
    camera.zoom_speed = config.zoom_speed;
    camera.damping = config.damping;
    camera
}

fn clear_color_from_config(config: &Config) -> wgpu::Color {
    let [r, g, b] = config.render.clear_color;
    wgpu::Color { r, g, b, a: 1.0 }
}

/// The galaxy viewer application.
pub struct GalaxyApp {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<RenderContext>,
    scene: Option<GpuPointScene>,
    surface_wrapper: SurfaceWrapper,
    camera: OrbitCamera,
    driver: GalaxyDriver<GpuPointScene>,
    rng: GalaxyRng,
    panel: ParameterPanel,
    keyboard_state: KeyboardState,
    mouse_state: MouseState,
    clock: FrameClock,
    clear_color: wgpu::Color,
    title_base: String,
    last_title_refresh: f64,
    fps: f64,
    debug_server: Option<DebugServer>,
    debug_state: Arc<Mutex<DebugState>>,
}

impl GalaxyApp {
    pub fn new(config: Config) -> Self {
        let rng = match config.galaxy.seed {
            Some(seed) => {
                info!("Using galaxy seed {seed}");
                GalaxyRng::seeded(seed)
            }
            None => GalaxyRng::from_entropy(),
        };
        let debug_port = get_debug_port(config.debug.api_port);
        let debug_server = create_debug_server(debug_port, config.debug.api_enabled);
        let debug_state = Arc::new(Mutex::new(DebugState {
            params: config.galaxy.params.clone(),
            ..Default::default()
        }));
        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;

        Self {
            window: None,
            gpu: None,
            scene: None,
            surface_wrapper: SurfaceWrapper::new(config.window.width, config.window.height, 1.0),
            camera: camera_from_config(&config.camera, aspect),
            driver: GalaxyDriver::new(config.galaxy.params.clone(), 1.0),
            rng,
            panel: ParameterPanel::new(),
            keyboard_state: KeyboardState::new(),
            mouse_state: MouseState::new(),
            clock: FrameClock::new(),
            clear_color: clear_color_from_config(&config),
            title_base: config.window.title.clone(),
            last_title_refresh: 0.0,
            fps: 0.0,
            debug_server,
            debug_state,
            config,
        }
    }

    pub fn driver(&self) -> &GalaxyDriver<GpuPointScene> {
        &self.driver
    }

    /// Regenerate with the current parameters. Returns `false` (keeping the
    /// current galaxy) when the parameters are rejected or no scene exists.
    fn regenerate(&mut self) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        match self.driver.regenerate(scene, &mut self.rng) {
            Ok(_) => {
                self.refresh_title();
                true
            }
            Err(e) => {
                warn!("Galaxy generation rejected: {e}");
                false
            }
        }
    }

    fn initialize_rendering(&mut self, window: &Arc<Window>) -> bool {
        let gpu = match init_render_context_blocking(window.clone(), self.config.window.vsync) {
            Ok(ctx) => ctx,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                return false;
            }
        };
        self.scene = Some(GpuPointScene::new(
            gpu.device.clone(),
            gpu.queue.clone(),
            gpu.surface_format,
        ));
        self.gpu = Some(gpu);
        true
    }

    fn start_debug_server(&mut self) {
        let Some(server) = self.debug_server.as_mut() else {
            return;
        };
        match server.start(self.debug_state.clone()) {
            Ok(()) => {
                self.title_base = format!(
                    "{} [Debug API :{}]",
                    self.config.window.title,
                    server.actual_port()
                );
            }
            Err(e) => warn!("Failed to start debug server: {e}"),
        }
    }

    fn apply_resize(&mut self, resize: SurfaceResizeEvent) {
        let (w, h) = (resize.physical.width, resize.physical.height);
        self.camera.set_aspect_ratio(w as f32, h as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(w, h);
        }
        info!(
            "Window resized to {}x{} (scale: {:.2})",
            w, h, resize.scale_factor
        );
    }

    fn refresh_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let mut title = self.panel.title(&self.title_base, self.driver.params());
        if self.config.debug.show_stats_in_title {
            title.push_str(&format!(
                " | {} points | {:.0} fps",
                self.driver.point_count(),
                self.fps
            ));
        }
        window.set_title(&title);
    }

    /// Apply requests queued by the debug API. Returns `true` if quit was
    /// requested.
    fn drain_debug_requests(&mut self) -> bool {
        let (quit, pending, regenerate) = match self.debug_state.lock() {
            Ok(mut state) => (
                state.quit_requested,
                state.take_pending_params(),
                state.take_regenerate_request(),
            ),
            Err(_) => return false,
        };

        if let Some(params) = pending {
            info!("Applying parameters from debug API");
            let previous = self.driver.params().clone();
            self.driver.set_params(params);
            if !self.regenerate() {
                self.driver.set_params(previous);
            }
        } else if regenerate {
            self.regenerate();
        }
        quit
    }

    fn handle_panel_input(&mut self) {
        let events = self
            .panel
            .handle_input(&self.keyboard_state, self.driver.params_mut());
        if events.is_empty() {
            return;
        }
        let regenerate = events.iter().any(|event| {
            matches!(
                event,
                PanelEvent::Finished {
                    regenerate: true,
                    ..
                }
            )
        });
        if regenerate {
            self.regenerate();
        } else {
            self.refresh_title();
        }
    }

    fn update_camera(&mut self) {
        let drag = self.mouse_state.drag_delta(MouseButton::Left);
        if drag != glam::Vec2::ZERO {
            self.camera.rotate(drag.x, drag.y);
        }
        let scroll = self.mouse_state.scroll();
        if scroll != 0.0 {
            self.camera.zoom(scroll);
        }
        self.camera.update();
    }

    /// Draw the scene. Returns `false` if the loop should stop.
    fn render(&mut self) -> bool {
        let (Some(gpu), Some(scene)) = (&mut self.gpu, &self.scene) else {
            return true;
        };
        let (w, h) = gpu.size();
        scene.update_camera(&self.camera.to_uniform(w, h));

        match gpu.get_current_texture() {
            Ok(texture) => {
                let mut frame = FrameEncoder::new(&gpu.device, gpu.queue.clone(), texture);
                let builder = RenderPassBuilder::new()
                    .clear_color(self.clear_color)
                    .label("galaxy-pass");
                if let Some(mut pass) = frame.begin_render_pass(&builder) {
                    scene.draw(&mut pass);
                }
                frame.submit();
                true
            }
            Err(SurfaceError::Lost) => {
                let size = self.surface_wrapper.physical_size();
                gpu.resize(size.width, size.height);
                true
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                false
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
                true
            }
        }
    }

    fn publish_debug_state(&self, timing: &FrameTiming, shader_time: Option<f32>) {
        let size = self.surface_wrapper.physical_size();
        if let Ok(mut state) = self.debug_state.lock() {
            state.frame_count = timing.frame + 1;
            state.frame_time_ms = timing.delta * 1000.0;
            state.fps = self.fps;
            state.uptime_seconds = timing.elapsed;
            state.window_width = size.width;
            state.window_height = size.height;
            state.point_count = self.driver.point_count();
            state.shader_time = shader_time.unwrap_or(0.0);
            state.generation = self.driver.generation();
            state.params = self.driver.params().clone();
        }
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let timing = self.clock.tick();
        if timing.delta > 0.0 {
            self.fps = 1.0 / timing.delta;
        }

        if self.drain_debug_requests() {
            info!("Quit requested via debug API");
            event_loop.exit();
            return;
        }

        self.handle_panel_input();
        self.update_camera();

        let shader_time = match self.scene.as_mut() {
            Some(scene) => self.driver.tick(scene, timing.elapsed),
            None => None,
        };

        if !self.render() {
            event_loop.exit();
            return;
        }

        self.publish_debug_state(&timing, shader_time);
        if self.config.debug.show_stats_in_title
            && timing.elapsed - self.last_title_refresh >= TITLE_REFRESH_INTERVAL
        {
            self.last_title_refresh = timing.elapsed;
            self.refresh_title();
        }

        self.keyboard_state.clear_transients();
        self.mouse_state.clear_transients();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for GalaxyApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let scale_factor = window.scale_factor();
        let inner_size = window.inner_size();
        self.surface_wrapper =
            SurfaceWrapper::new(inner_size.width, inner_size.height, scale_factor);
        let size = self.surface_wrapper.physical_size();
        self.camera
            .set_aspect_ratio(size.width as f32, size.height as f32);
        info!(
            "Surface wrapper initialized: {}x{} (scale: {:.2})",
            size.width, size.height, scale_factor
        );

        if !self.initialize_rendering(&window) {
            event_loop.exit();
            return;
        }
        self.window = Some(window.clone());

        self.driver
            .set_pixel_ratio(pixel_ratio(scale_factor, self.config.render.max_pixel_ratio));
        self.start_debug_server();
        self.regenerate();
        self.refresh_title();
        window.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let inner = window.inner_size();
                    let resize = self.surface_wrapper.handle_scale_factor_changed(
                        scale_factor,
                        inner.width,
                        inner.height,
                    );
                    self.apply_resize(resize);
                    self.driver.set_pixel_ratio(pixel_ratio(
                        scale_factor,
                        self.config.render.max_pixel_ratio,
                    ));
                }
            }
            WindowEvent::Focused(false) => {
                self.keyboard_state.reset();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.keyboard_state.process_event(&event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_state.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_state.on_cursor_left();
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.mouse_state.on_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.mouse_state.on_scroll(delta);
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(server) = self.debug_server.as_mut() {
            server.stop();
        }
        info!(
            "Exiting after {} frames, {} generations",
            self.clock.frame_count(),
            self.driver.generation()
        );
    }
}

/// Creates an event loop and runs the viewer with the given config.
///
/// Blocks until the window is closed.
#[instrument(skip(config))]
pub fn run_with_config(config: Config) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = GalaxyApp::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}

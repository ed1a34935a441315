//! Viewer builder and window event loop.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::SnowfieldConfig;
use crate::error::RunError;
use crate::gpu::GpuState;
#[cfg(feature = "egui")]
use crate::gui::DebugPanel;
use crate::scene::{Scene, Viewport};
use crate::textures::TextureRegistry;
use crate::time::Clock;

/// Snowfield viewer builder.
///
/// Use method chaining to configure, then call `.run()` to open the window.
pub struct Snowfield {
    config: SnowfieldConfig,
}

impl Snowfield {
    /// Create a viewer with default settings.
    pub fn new() -> Self {
        Self::from_config(SnowfieldConfig::default())
    }

    /// Create a viewer from a loaded configuration.
    pub fn from_config(config: SnowfieldConfig) -> Self {
        Self { config }
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.config.particle_count = count;
        self
    }

    /// Seed particle placement for a reproducible field.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Choose whether sprites start textured.
    pub fn with_textures_enabled(mut self, enabled: bool) -> Self {
        self.config.textures_enabled = enabled;
        self
    }

    pub fn config(&self) -> &SnowfieldConfig {
        &self.config
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), RunError> {
        self.config.validate()?;

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, rng);
        event_loop.run_app(&mut app)?;

        match app.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for Snowfield {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    config: SnowfieldConfig,
    rng: StdRng,
    window: Option<Arc<Window>>,
    scene: Option<Scene>,
    gpu_state: Option<GpuState>,
    clock: Clock,
    #[cfg(feature = "egui")]
    panel: DebugPanel,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<RunError>,
}

impl App {
    fn new(config: SnowfieldConfig, rng: StdRng) -> Self {
        Self {
            #[cfg(feature = "egui")]
            panel: DebugPanel::new(config.textures_enabled),
            config,
            rng,
            window: None,
            scene: None,
            gpu_state: None,
            clock: Clock::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let viewport = viewport_for(&window, window.inner_size(), self.config.camera.max_pixel_ratio);
        let mut textures = TextureRegistry::new();
        let scene = Scene::new(&self.config, viewport, &mut textures, &mut self.rng)?;
        let gpu_state = pollster::block_on(GpuState::new(window.clone(), &scene, &textures))?;

        self.window = Some(window);
        self.scene = Some(scene);
        self.gpu_state = Some(gpu_state);
        self.clock = Clock::new();
        Ok(())
    }

    fn handle_resize(&mut self, size: PhysicalSize<u32>) {
        let (Some(window), Some(scene)) = (&self.window, &mut self.scene) else {
            return;
        };
        let logical: LogicalSize<u32> = size.to_logical(window.scale_factor());
        if scene.resize(logical.width, logical.height, window.scale_factor() as f32) {
            if let Some(gpu_state) = &mut self.gpu_state {
                gpu_state.resize(scene.viewport().physical_size());
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(window), Some(scene), Some(gpu_state)) =
            (&self.window, &mut self.scene, &mut self.gpu_state)
        else {
            return;
        };

        let (elapsed, delta) = self.clock.tick();
        log::trace!("frame {} at {:.3}s (+{:.4}s)", self.clock.frame(), elapsed, delta);
        scene.update(elapsed);

        #[cfg(feature = "egui")]
        {
            gpu_state.egui.begin_frame(window);
            if let Some(enabled) = self.panel.show(&gpu_state.egui.ctx) {
                scene.set_textures_enabled(enabled);
            }
            let (target_width, _) = scene.viewport().physical_size();
            let ui = gpu_state.egui.end_frame(window, target_width);
            gpu_state.queue_ui(ui);
        }

        match gpu_state.render(scene) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                gpu_state.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        window.request_redraw();
    }
}

fn viewport_for(window: &Window, size: PhysicalSize<u32>, max_pixel_ratio: f32) -> Viewport {
    let logical: LogicalSize<u32> = size.to_logical(window.scale_factor());
    Viewport::new(
        logical.width.max(1),
        logical.height.max(1),
        window.scale_factor() as f32,
        max_pixel_ratio,
    )
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("Startup failed: {}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        #[cfg(feature = "egui")]
        if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
            if gpu_state.egui.on_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.handle_resize(physical_size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = position.x - last_x;
                        let dy = position.y - last_y;

                        if let (Some(window), Some(scene)) = (&self.window, &mut self.scene) {
                            let height = window.inner_size().height as f32;
                            scene.controls_mut().rotate(dx as f32, dy as f32, height);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(scene) = &mut self.scene {
                    scene.controls_mut().zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }
}

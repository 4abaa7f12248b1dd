use std::sync::Arc;
use std::time::Instant;

use billfall::error::AppError;
use billfall::input::{InputAction, InputHandler};
use billfall::page::Page;
use billfall::particles::ParticleRenderer;
use billfall::{EngineConfig, HostSettings, ParticleEngine, SurfaceMetrics};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

fn main() -> Result<(), AppError> {
    env_logger::init();

    let settings = HostSettings::from_env()?;
    log::info!("Starting billfall ({:?}, {:?})", settings.style, settings.environment);

    let event_loop = EventLoop::new()?;
    let mut app = App { settings, state: None };
    event_loop.run_app(&mut app)?;
    Ok(())
}

struct App {
    settings: HostSettings,
    state: Option<AppState>,
}

struct AppState {
    window: Arc<Window>,
    gpu: Option<Gpu>,
    engine: Option<ParticleEngine>,
    page: Page,
    metrics: SurfaceMetrics,
    started: Instant,
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: ParticleRenderer,
}

impl Gpu {
    fn new(window: Arc<Window>, metrics: SurfaceMetrics, engine_config: &EngineConfig) -> Result<Self, AppError> {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("billfall device"),
            ..Default::default()
        }))?;

        let caps = surface.get_capabilities(&adapter);
        let fallback_format = caps
            .formats
            .first()
            .copied()
            .ok_or(AppError::UnsupportedSurface("texture format"))?;
        let format = caps.formats.iter().find(|f| f.is_srgb()).copied().unwrap_or(fallback_format);
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .ok_or(AppError::UnsupportedSurface("alpha mode"))?;
        let (width, height) = metrics.backing_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer =
            ParticleRenderer::new(&device, format, engine_config.style.palette(), engine_config.capacity);

        Ok(Self { surface, device, queue, config, renderer })
    }

    fn resize(&mut self, metrics: SurfaceMetrics) {
        let (width, height) = metrics.backing_size();
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    fn present(&mut self, metrics: SurfaceMetrics) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return;
            }
        };
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame encoder"),
        });
        self.renderer.render(&self.queue, &mut encoder, &view, metrics);
        self.queue.submit(Some(encoder.finish()));
        frame.present();
    }
}

impl AppState {
    fn new(event_loop: &ActiveEventLoop, settings: &HostSettings) -> Result<Self, AppError> {
        let window = Arc::new(event_loop.create_window(
            Window::default_attributes()
                .with_title("billfall")
                .with_inner_size(winit::dpi::LogicalSize::new(1280u32, 800u32)),
        )?);

        let size = window.inner_size();
        let metrics = SurfaceMetrics::from_physical(size.width, size.height, window.scale_factor());
        let engine_config = EngineConfig::for_device(settings.environment.device, settings.style);

        // no GPU means no surface; the engine then stays off
        let gpu = if !settings.environment.motion_allowed() {
            None
        } else {
            match Gpu::new(window.clone(), metrics, &engine_config) {
                Ok(gpu) => Some(gpu),
                Err(e) => {
                    log::warn!("drawing unavailable: {e}");
                    None
                }
            }
        };

        let surface = gpu.as_ref().map(|_| metrics);
        let mut engine = match settings.seed {
            Some(seed) => ParticleEngine::start_seeded(engine_config, &settings.environment, surface, seed),
            None => ParticleEngine::start(engine_config, &settings.environment, surface),
        };

        let page = Page::portfolio(metrics.height);
        if let Some(engine) = engine.as_mut() {
            for section in page.sections() {
                engine.watch_section(section.id.clone());
            }
        }

        let mut state = Self { window, gpu, engine, page, metrics, started: Instant::now() };
        state.notify_visibility();
        Ok(state)
    }

    fn notify_visibility(&mut self) {
        let Some(engine) = self.engine.as_mut() else { return };
        for (id, fraction) in self.page.visibilities() {
            engine.on_section_visible(id, fraction);
        }
    }

    fn scroll(&mut self, action: InputAction) {
        let before = self.page.scroll_y();
        let after = match action {
            InputAction::Scroll(delta) => self.page.scroll_by(delta),
            InputAction::ScrollToTop => self.page.scroll_to(0.0),
            InputAction::ScrollToBottom => self.page.scroll_to(f32::MAX),
            InputAction::Quit => return,
        };
        if after == before {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.on_scroll(after);
        }
        self.notify_visibility();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.metrics = SurfaceMetrics::from_physical(width, height, self.window.scale_factor());
        self.page.set_viewport_height(self.metrics.height);
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.resize(self.metrics);
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.resize(self.metrics);
        }
    }

    /// The frame loop only runs while there is an engine to drive.
    fn is_animating(&self) -> bool {
        self.engine.is_some() && self.gpu.is_some()
    }

    fn redraw(&mut self) {
        let (Some(gpu), Some(engine)) = (self.gpu.as_mut(), self.engine.as_mut()) else { return };
        let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        engine.frame(now_ms, &mut gpu.renderer);
        gpu.present(self.metrics);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        match AppState::new(event_loop, &self.settings) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                log::error!("failed to start: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else { return };

        match InputHandler::handle_window_event(&event, state.metrics.height) {
            Some(InputAction::Quit) => {
                log::info!("Shutting down 🛑");
                if let Some(engine) = state.engine.as_mut() {
                    engine.stop();
                }
                event_loop.exit();
                return;
            }
            Some(action) => {
                state.scroll(action);
                return;
            }
            None => {}
        }

        match event {
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => {
                state.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                state.redraw();
                if state.is_animating() {
                    state.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref().filter(|s| s.is_animating()) {
            state.window.request_redraw();
        }
    }
}

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;
use warpfield_common::WarpConfig;
use warpfield_input::Pointer;
use warpfield_render::Scene;
use warpfield_render_wgpu::WgpuRenderer;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "warpfield-desktop", about = "Fly through an animated starfield")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file; missing keys keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for star placement (defaults to the clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Override the star count
    #[arg(long)]
    stars: Option<usize>,
}

fn resolve_config(cli: &Cli) -> Result<WarpConfig> {
    let mut config = WarpConfig::load_or_default(cli.config.as_deref())
        .context("failed to load config")?;
    if let Some(stars) = cli.stars {
        config.stars.count = stars;
    }
    config.validate()?;
    Ok(config)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Application state that lives across GPU re-creation.
struct AppState {
    scene: Scene,
    /// Last reported cursor position; `None` until the cursor enters.
    pointer: Option<Pointer>,
    window_size: PhysicalSize<u32>,
    frames: u32,
    last_report: Instant,
}

impl AppState {
    fn new(config: &WarpConfig, seed: u64) -> Self {
        Self {
            scene: Scene::new(config, seed),
            pointer: None,
            window_size: PhysicalSize::new(1, 1),
            frames: 0,
            last_report: Instant::now(),
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.window_size = size;
        self.scene.projection.set_viewport(size.width, size.height);
    }

    fn cursor_moved(&mut self, x: f64, y: f64) {
        self.pointer = Some(Pointer::from_window_position(
            x,
            y,
            self.window_size.width,
            self.window_size.height,
        ));
    }

    fn update(&mut self) {
        self.scene.tick(self.pointer.into());

        self.frames += 1;
        let elapsed = self.last_report.elapsed();
        if elapsed.as_secs_f32() >= 1.0 {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            tracing::debug!(
                "{fps:.1} fps, recycled {} last tick, yaw {:.3} pitch {:.3}",
                self.scene.stars.field.last_recycled(),
                self.scene.camera.yaw,
                self.scene.camera.pitch
            );
            self.frames = 0;
            self.last_report = Instant::now();
        }
    }
}

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
}

impl GpuApp {
    fn new(config: &WarpConfig, seed: u64) -> Self {
        Self {
            state: AppState::new(config, seed),
            gpu: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Warpfield")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("warpfield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.resize(size);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            &self.state.scene,
            config.height,
        );

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &mut self.state.scene);

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("GPU initialization failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.state.resize(new_size);
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer.resize(gpu.config.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor_moved(position.x, position.y);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = resolve_config(&cli)?;
    let seed = cli.seed.unwrap_or_else(clock_seed);
    tracing::info!("warpfield-desktop starting (seed {seed})");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(&config, seed);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_star_count() {
        let cli = Cli::parse_from(["warpfield-desktop", "--stars", "12"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.stars.count, 12);
    }

    #[test]
    fn cli_rejects_zero_stars() {
        let cli = Cli::parse_from(["warpfield-desktop", "--stars", "0"]);
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn pointer_is_centered_until_cursor_moves() {
        let mut state = AppState::new(&WarpConfig::default(), 1);
        state.resize(PhysicalSize::new(200, 100));
        assert_eq!(state.pointer, None);
        state.update();
        assert_eq!(state.scene.camera.yaw, 0.0);

        state.cursor_moved(200.0, 0.0);
        assert_eq!(state.pointer, Some(Pointer::new(1.0, 1.0)));
        state.update();
        assert!(state.scene.camera.yaw < 0.0);
        assert!(state.scene.camera.pitch > 0.0);
        assert_eq!(state.scene.projection.aspect, 2.0);
    }
}

//! Lumen demo
//!
//! Opens an 800x600 window and spins the first vertex of twenty triangles
//! around the center, re-uploading each mesh every frame.

use std::f32::consts::PI;
use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use lumen_engine::lumen::{Engine, Renderer, RendererConfig, Result};
use lumen_engine::lumen::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
use lumen_engine::lumen::device::{AcquireOutcome, Extent2D, GraphicsDevice};
use lumen_engine::lumen::scene::{MeshData, MeshVertex, RenderableKey, Scene};
use lumen_engine::lumen::surface::Window as RenderWindow;
use lumen_engine::{engine_error, engine_info};
use lumen_engine_renderer_vulkan::lumen::VulkanGraphicsDevice;

const TRIANGLE_COUNT: usize = 20;
const ROTATION_STEP: f32 = 0.0006;
/// Phase offset between consecutive triangles, in full turns
const PHASE_STEP: f32 = 0.01;

/// Console logger dropping everything below `min_severity`
struct FilteredLogger {
    min_severity: LogSeverity,
    inner: DefaultLogger,
}

impl Logger for FilteredLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.severity >= self.min_severity {
            self.inner.log(entry);
        }
    }
}

/// Everything that lives while the OS window is open
///
/// Field order is drop order: scene objects and the render window go before
/// the OS window they present to.
struct Demo {
    scene: Scene,
    meshes: Vec<RenderableKey>,
    surface: RenderWindow,
    _renderer: Renderer,
    window: Arc<Window>,
    rotator: f32,
}

impl Demo {
    fn new(window: Arc<Window>) -> Result<Self> {
        let config = RendererConfig {
            app_name: "Lumen Demo".to_string(),
            pipeline_root: concat!(env!("CARGO_MANIFEST_DIR"), "/pipelines").into(),
            ..RendererConfig::default()
        };

        let device: Arc<dyn GraphicsDevice> = Arc::new(VulkanGraphicsDevice::new(&*window, &config)?);
        let mut renderer = Renderer::new(device, config, &["default"])?;

        let size = window.inner_size();
        let surface = renderer.open_window(
            window.clone(),
            Extent2D { width: size.width, height: size.height },
            "test",
        )?;
        let pipeline = surface.pipelines()[0].clone();

        let mut scene = renderer.create_scene();
        let root = scene.root();
        let triangle = MeshData::triangle();
        let mut meshes = Vec::with_capacity(TRIANGLE_COUNT);
        for _ in 0..TRIANGLE_COUNT {
            let key = scene.create_dynamic_mesh(root, &triangle)?;
            if let Some(object) = scene.object_mut(key) {
                object.set_surface(surface.targets().clone());
                object.set_pipeline(pipeline.clone());
            }
            meshes.push(key);
        }

        engine_info!("lumen::demo", "Scene ready with {} triangles", meshes.len());

        Ok(Self {
            scene,
            meshes,
            surface,
            _renderer: renderer,
            window,
            rotator: 0.0,
        })
    }

    fn frame(&mut self) -> Result<()> {
        self.rotator += ROTATION_STEP;

        for (i, key) in self.meshes.iter().enumerate() {
            let phase = self.rotator + i as f32 * PI * 2.0 * PHASE_STEP;
            if let Some(mesh) = self.scene.object_mut(*key).and_then(|object| object.as_dynamic_mesh_mut()) {
                mesh.set_vertex(0, MeshVertex::new(phase.cos() / 2.0, phase.sin() / 2.0, 0.5))?;
            }
        }
        self.scene.update()?;

        match self.surface.render_scene(&mut self.scene, false)? {
            AcquireOutcome::Ready(_) => Ok(()),
            AcquireOutcome::Suboptimal(_) | AcquireOutcome::OutOfDate => self.resize(),
        }
    }

    fn resize(&mut self) -> Result<()> {
        let size = self.window.inner_size();
        // Minimized
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        self.surface.resize(Extent2D { width: size.width, height: size.height })?;
        Ok(())
    }
}

#[derive(Default)]
struct App {
    demo: Option<Demo>,
    failed: bool,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, what: &str, error: lumen_engine::lumen::Error) {
        engine_error!("lumen::demo", "{}: {}", what, error);
        self.failed = true;
        self.demo = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.demo.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title("test")
            .with_inner_size(winit::dpi::PhysicalSize::new(800, 600));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                engine_error!("lumen::demo", "Failed to create window: {}", e);
                self.failed = true;
                event_loop.exit();
                return;
            }
        };

        match Demo::new(window) {
            Ok(demo) => self.demo = Some(demo),
            Err(e) => self.fail(event_loop, "Initialization failed", e),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(demo) = self.demo.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                engine_info!("lumen::demo", "Close requested, shutting down");
                self.demo = None;
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                if let Err(e) = demo.resize() {
                    self.fail(event_loop, "Resize failed", e);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = demo.frame() {
                    self.fail(event_loop, "Frame failed", e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(demo) = self.demo.as_ref() {
            demo.window.request_redraw();
        }
    }
}

fn main() {
    Engine::set_logger(FilteredLogger {
        min_severity: LogSeverity::Info,
        inner: DefaultLogger,
    });

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!("lumen::demo", "Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    if let Err(e) = event_loop.run_app(&mut app) {
        engine_error!("lumen::demo", "Event loop error: {}", e);
        std::process::exit(1);
    }
    if app.failed {
        std::process::exit(1);
    }
}

use std::sync::Arc;

use anyhow::Context;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::canvas::{LOGICAL_HEIGHT, LOGICAL_WIDTH, SCALE};
use crate::driver::{FrameDriver, SPRITE_SHEET_PATH};
use crate::input::KeyInput;
use crate::render::GpuState;

/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Frame timing
// ---------------------------------------------------------------------------

struct FrameStats {
    frame_count: u64,
    last_log_time: Instant,
    frame_time_sum: f64,
    frame_time_min: f64,
    frame_time_max: f64,
    frames_since_log: u32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frame_count: 0,
            last_log_time: Instant::now(),
            frame_time_sum: 0.0,
            frame_time_min: f64::MAX,
            frame_time_max: 0.0,
            frames_since_log: 0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frames_since_log += 1;
        self.frame_time_sum += dt;
        self.frame_time_min = self.frame_time_min.min(dt);
        self.frame_time_max = self.frame_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= FPS_LOG_INTERVAL {
            let avg_ms = (self.frame_time_sum / self.frames_since_log as f64) * 1000.0;
            let fps = self.frames_since_log as f64 / elapsed;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.frame_time_min * 1000.0,
                self.frame_time_max * 1000.0,
                self.frame_count,
            );
            self.last_log_time = Instant::now();
            self.frame_time_sum = 0.0;
            self.frame_time_min = f64::MAX;
            self.frame_time_max = 0.0;
            self.frames_since_log = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Host for the frame driver. Fields drop in declaration order, so the GPU
/// state goes before the window it renders into.
struct App {
    driver: FrameDriver,

    // Key transitions received since the last redraw
    pending: Vec<KeyInput>,

    frame_stats: FrameStats,
    last_frame_time: Option<Instant>,

    gpu: Option<GpuState>,
    window: Option<Arc<Window>>,

    // Startup failure, handed back to `run`
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new() -> Self {
        Self {
            driver: FrameDriver::new(),
            pending: Vec::with_capacity(16),
            frame_stats: FrameStats::new(),
            last_frame_time: None,
            gpu: None,
            window: None,
            fatal: None,
        }
    }

    /// Window, GPU, then the driver's own resources.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let attrs = WindowAttributes::default()
            .with_title("runcat")
            .with_inner_size(PhysicalSize::new(
                LOGICAL_WIDTH * SCALE,
                LOGICAL_HEIGHT * SCALE,
            ))
            .with_resizable(false);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let gpu = GpuState::new(window.clone(), LOGICAL_WIDTH, LOGICAL_HEIGHT)?;
        log::info!("wgpu + upscale pipeline initialized");
        self.gpu = Some(gpu);
        self.window = Some(window);

        self.driver.initialize(SPRITE_SHEET_PATH)?;

        event_loop.set_control_flow(ControlFlow::Poll);
        Ok(())
    }

    /// Release everything in reverse acquisition order.
    fn teardown(&mut self) {
        self.driver.shutdown();
        if self.gpu.take().is_some() {
            log::info!("GPU state released");
        }
        if self.window.take().is_some() {
            log::info!("Window closed");
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.fatal.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
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
                log::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.pending.push(KeyInput::from_winit(&event));
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    self.frame_stats
                        .record_frame(now.duration_since(last).as_secs_f64());
                }
                self.last_frame_time = Some(now);

                if let Some(gpu) = &mut self.gpu {
                    self.driver.step(self.pending.drain(..), gpu);
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Entry point: create the event loop and hand control to it until exit.
pub fn run() -> anyhow::Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new();
    event_loop.run_app(&mut app)?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

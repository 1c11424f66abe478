//! Windowed runner: builds the scene and drives the frame loop from redraws.

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::RiverConfig;
use crate::error::RiverError;
use crate::gpu::Renderer;
use crate::input::InputState;
use crate::river::{FrameReport, River};
use crate::time::{CancelToken, FrameClock};

/// How often frame statistics are logged at debug level.
const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Builder and runner for the windowed effect.
///
/// ```ignore
/// CosmicRiver::new(RiverConfig::default().with_particle_count(10_000))
///     .run()?;
/// ```
pub struct CosmicRiver {
    config: RiverConfig,
    token: CancelToken,
    title: String,
}

impl CosmicRiver {
    /// Create a runner for `config`.
    pub fn new(config: RiverConfig) -> Self {
        Self {
            config,
            token: CancelToken::new(),
            title: "Cosmic River".into(),
        }
    }

    /// Stop the window when `token` is cancelled.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.token = token;
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// A handle that closes the window when cancelled.
    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Open the window and run until it is closed or the token is cancelled.
    ///
    /// Fails if the config is invalid, or if the window or GPU cannot be
    /// brought up. Nothing after start-up produces an error.
    pub fn run(self) -> Result<(), RiverError> {
        let river = River::new(self.config)?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(river, self.token, self.title);
        event_loop.run_app(&mut app)?;

        match app.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
struct FrameStats {
    frames: u64,
    recycled: usize,
    since: Instant,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            frames: 0,
            recycled: 0,
            since: Instant::now(),
        }
    }

    fn record(&mut self, report: &FrameReport, fps: f32) {
        self.frames += 1;
        self.recycled += report.recycled;

        if self.since.elapsed() >= STATS_INTERVAL {
            log::debug!(
                "{:.1} fps, {} recycled over {} frames, camera z {:.1}, bloom {:.2}",
                fps,
                self.recycled,
                self.frames,
                report.camera_z,
                report.bloom_strength
            );
            *self = Self::new();
        }
    }
}

struct App {
    title: String,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    river: River,
    input: InputState,
    clock: FrameClock,
    token: CancelToken,
    stats: FrameStats,
    failure: Option<RiverError>,
}

impl App {
    fn new(river: River, token: CancelToken, title: String) -> Self {
        let config = river.config();
        let input = InputState::new(config.document_height, config.max_scroll_fraction);
        let clock = FrameClock::new(config.max_delta);

        Self {
            title,
            window: None,
            renderer: None,
            river,
            input,
            clock,
            token,
            stats: FrameStats::new(),
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RiverError> {
        let config = self.river.config();
        let window_attrs = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                config.window_width,
                config.window_height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.input.set_viewport(size.width, size.height);
        self.river.resize(size.width, size.height);

        let renderer = pollster::block_on(Renderer::new(window.clone(), &self.river))?;

        self.window = Some(window.clone());
        self.renderer = Some(renderer);
        self.clock.resync();
        window.request_redraw();
        Ok(())
    }

    fn redraw(&mut self) {
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        let delta = self.clock.tick();
        let report = self.river.step(delta, &self.input.snapshot());
        self.stats.record(&report, self.clock.fps());

        match renderer.render(&self.river) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, closing");
                self.token.cancel();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => self.token.cancel(),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.token.cancel();
            }
            // The camera aspect follows the input snapshot on the next step.
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }

        if self.token.is_cancelled() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.token.is_cancelled() {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.renderer.take().is_some() {
            log::info!("Shutting down after {} frames", self.clock.frame());
        }
        self.window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_invalid_config_fails_before_window() {
        let config = RiverConfig::default().with_speed(f32::NAN);
        let result = CosmicRiver::new(config).run();

        assert!(matches!(
            result,
            Err(RiverError::Config(ConfigError::InvalidValue { field: "speed", .. }))
        ));
    }

    #[test]
    fn test_cancel_token_is_shared() {
        let river = CosmicRiver::new(RiverConfig::default()).with_title("Test");
        river.cancel_token().cancel();
        assert!(river.token.is_cancelled());
        assert_eq!(river.title, "Test");
    }
}

#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod canvas;

pub use canvas::FrameCanvas;

use life_grid::{GridSize, World};
use log::{debug, info};
use pixels::wgpu::Color;
use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, KeyEvent, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const BACKGROUND_COLOR: Color = Color::BLACK;

#[derive(Debug, Error)]
pub enum AnimateError {
    #[error("event loop failed")]
    EventLoop(#[from] EventLoopError),
    #[error("cannot open window")]
    Window(#[from] OsError),
    #[error("cannot render frame")]
    Pixels(#[from] pixels::Error),
    #[error("cannot resize surface")]
    Texture(#[from] pixels::TextureError),
}

#[derive(Clone, Debug)]
pub struct AnimationConfig {
    pub title: String,
    pub window_size: PhysicalSize<u32>,
    pub ticks_per_second: u32,
}

impl AnimationConfig {
    fn time_step(&self) -> Duration {
        let step = Duration::from_secs(1) / self.ticks_per_second.max(1);
        // A zero step would never move `next_update` past now.
        step.max(Duration::from_nanos(1))
    }
}

pub fn window_size_to_grid_size(
    window_size: PhysicalSize<u32>,
    cell_pixel_width: u32,
) -> GridSize {
    GridSize::new(
        window_size.width.checked_div(cell_pixel_width).unwrap_or(0),
        window_size.height.checked_div(cell_pixel_width).unwrap_or(0),
    )
}

/// Opens a window and runs `world` until the window is closed.
///
/// Each tick the world is drawn into the frame buffer and then updated, at
/// `config.ticks_per_second`. The frame buffer is `config.window_size` pixels.
pub fn animate<W: World>(config: AnimationConfig, world: W) -> Result<(), AnimateError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    let mut handler = AppEventHandler::new(config, world);
    event_loop.run_app(&mut handler)?;
    match handler.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App<W: World> {
    world: W,
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer_size: PhysicalSize<u32>,
    time_step: Duration,
    next_update: Instant,
}

impl<W: World> App<W> {
    fn new(
        event_loop: &ActiveEventLoop,
        config: &AnimationConfig,
        world: W,
    ) -> Result<Self, AnimateError> {
        let window = Arc::new(Self::build_window(event_loop, config)?);
        let pixels = Self::build_pixels(&window, config.window_size)?;
        info!(
            "opened {}x{} window at {} ticks/s",
            config.window_size.width, config.window_size.height, config.ticks_per_second
        );
        Ok(Self {
            world,
            window,
            pixels,
            buffer_size: config.window_size,
            time_step: config.time_step(),
            next_update: Instant::now(),
        })
    }

    fn build_window(
        event_loop: &ActiveEventLoop,
        config: &AnimationConfig,
    ) -> Result<Window, OsError> {
        let window_attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.window_size)
            .with_resizable(false)
            .with_visible(false);
        event_loop.create_window(window_attributes)
    }

    fn build_pixels(
        window: &Arc<Window>,
        buffer_size: PhysicalSize<u32>,
    ) -> Result<Pixels<'static>, pixels::Error> {
        let window_size = window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, window.clone());
        PixelsBuilder::new(buffer_size.width, buffer_size.height, surface_texture)
            .clear_color(BACKGROUND_COLOR)
            .build()
    }

    fn on_create(&mut self) {
        self.window.request_redraw();
        self.window.set_visible(true);
    }

    fn on_time_step(&mut self) {
        let mut canvas = FrameCanvas::new(
            self.pixels.frame_mut(),
            self.buffer_size.width,
            self.buffer_size.height,
        );
        self.world.draw(&mut canvas);
        self.world.update();
        self.window.request_redraw();

        let now = Instant::now();
        while self.next_update <= now {
            self.next_update += self.time_step;
        }
    }

    fn on_redraw(&mut self) -> Result<(), pixels::Error> {
        self.pixels.render()
    }

    fn on_resize(&mut self, size: PhysicalSize<u32>) -> Result<(), pixels::TextureError> {
        // Minimized.
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        debug!("surface resized to {}x{}", size.width, size.height);
        self.pixels.resize_surface(size.width, size.height)
    }
}

struct AppEventHandler<W: World> {
    config: AnimationConfig,
    world: Option<W>,
    app: Option<App<W>>,
    error: Option<AnimateError>,
}

impl<W: World> AppEventHandler<W> {
    fn new(config: AnimationConfig, world: W) -> Self {
        Self {
            config,
            world: Some(world),
            app: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: impl Into<AnimateError>) {
        self.error = Some(err.into());
        event_loop.exit();
    }
}

impl<W: World> ApplicationHandler for AppEventHandler<W> {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause
            && let Some(app) = self.app.as_mut()
        {
            app.on_time_step();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        let Some(world) = self.world.take() else {
            return;
        };
        match App::new(event_loop, &self.config, world) {
            Ok(mut app) => {
                app.on_create();
                self.app = Some(app);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("window closed");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Released,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape | KeyCode::KeyQ | KeyCode::KeyX => {
                    info!("quit key pressed");
                    event_loop.exit();
                }
                _ => (),
            },
            WindowEvent::Resized(size) => {
                let result = match self.app.as_mut() {
                    Some(app) => app.on_resize(size),
                    None => Ok(()),
                };
                if let Err(err) = result {
                    self.fail(event_loop, err);
                }
            }
            WindowEvent::RedrawRequested => {
                let result = match self.app.as_mut() {
                    Some(app) => app.on_redraw(),
                    None => Ok(()),
                };
                if let Err(err) = result {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(app) = self.app.as_ref() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(app.next_update));
        }
    }
}

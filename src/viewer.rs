//! Standalone window for the cube field, backed by winit.
//!
//! ```no_run
//! # use cubefield::Viewer;
//! let viewer = Viewer::builder().with_title("cubes").build();
//! if let Err(e) = viewer.run() {
//!     eprintln!("{e}");
//! }
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    engine::effective_render_scale, error::CubefieldError, options::Options,
    FieldRenderEngine, InputEvent, MouseButton,
};

/// Accumulates window settings for a [`Viewer`].
pub struct ViewerBuilder {
    viewer: Viewer,
}

impl ViewerBuilder {
    /// Start from another set of options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.viewer.options = options;
        self
    }

    /// Window title shown by the platform.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.viewer.title = title.into();
        self
    }

    /// Finish configuring.
    #[must_use]
    pub fn build(self) -> Viewer {
        self.viewer
    }
}

/// A window that shows the cube field until it is closed.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Default options, titled "Cubefield".
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder {
            viewer: Self {
                options: Options::default(),
                title: "Cubefield".to_owned(),
            },
        }
    }

    /// Open the window and block in the event loop until it closes.
    ///
    /// # Errors
    ///
    /// Returns [`CubefieldError::Viewer`] if the event loop cannot be
    /// created or exits with an error.
    pub fn run(self) -> Result<(), CubefieldError> {
        let event_loop = EventLoop::new()
            .map_err(|e| CubefieldError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App {
            viewer: self,
            running: None,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|e| CubefieldError::Viewer(e.to_string()))
    }
}

/// Window and engine, both created on the first `resumed`.
struct Running {
    window: Arc<Window>,
    engine: FieldRenderEngine,
}

impl Running {
    fn surface_size(&self) -> (u32, u32) {
        clamp_size(self.window.inner_size())
    }

    fn draw(&mut self) {
        match self.engine.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                let (width, height) = self.surface_size();
                self.engine.resize(width, height);
            }
            Err(e) => log::error!("frame dropped: {e:?}"),
        }
        self.window.request_redraw();
    }

    fn key(&mut self, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        if let PhysicalKey::Code(code) = event.physical_key {
            let _ = self.engine.handle_key_press(&format!("{code:?}"));
        }
    }
}

struct App {
    viewer: Viewer,
    running: Option<Running>,
}

/// Surface size for a window, never zero.
fn clamp_size(size: PhysicalSize<u32>) -> (u32, u32) {
    (size.width.max(1), size.height.max(1))
}

impl App {
    fn start(&self, event_loop: &ActiveEventLoop) -> Option<Running> {
        let display = &self.viewer.options.display;
        let attrs = Window::default_attributes()
            .with_title(self.viewer.title.clone())
            .with_inner_size(LogicalSize::new(
                display.window_width,
                display.window_height,
            ));
        let window = event_loop
            .create_window(attrs)
            .map(Arc::new)
            .map_err(|e| log::error!("cannot open window: {e}"))
            .ok()?;

        let engine = pollster::block_on(FieldRenderEngine::new(
            Arc::clone(&window),
            clamp_size(window.inner_size()),
            window.scale_factor(),
            self.viewer.options.clone(),
        ))
        .map_err(|e| log::error!("cannot start renderer: {e}"))
        .ok()?;

        window.request_redraw();
        Some(Running { window, engine })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        self.running = self.start(event_loop);
        if self.running.is_none() {
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }
        let Some(running) = &mut self.running else {
            return;
        };

        let input = match event {
            WindowEvent::RedrawRequested => {
                running.draw();
                return;
            }
            WindowEvent::Resized(size) => {
                let (width, height) = clamp_size(size);
                running.engine.resize(width, height);
                return;
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let configured = running.engine.options().display.render_scale;
                running.engine.set_render_scale(effective_render_scale(
                    configured,
                    scale_factor,
                ));
                let (width, height) = running.surface_size();
                running.engine.resize(width, height);
                return;
            }
            WindowEvent::KeyboardInput { event, .. } => {
                running.key(&event);
                return;
            }
            WindowEvent::CursorMoved { position, .. } => {
                InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                }
            }
            WindowEvent::CursorLeft { .. } => InputEvent::CursorLeft,
            WindowEvent::MouseInput { button, state, .. } => {
                InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state.is_pressed(),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => InputEvent::from(delta),
            WindowEvent::ModifiersChanged(modifiers) => {
                InputEvent::ModifiersChanged {
                    shift: modifiers.state().shift_key(),
                }
            }
            _ => return,
        };
        let _ = running.engine.handle_input(input);
    }
}

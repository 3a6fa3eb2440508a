//! Application window and event loop management.

use std::sync::Arc;

use pollster::FutureExt;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use mirrorwater_core::FrameClock;
use mirrorwater_render::{Engine, RenderError};

use crate::viewer::Viewer;
use crate::{MirrorwaterError, Result};

/// Radians of orbit per pixel of drag.
const ORBIT_SPEED: f32 = 0.005;
/// Distance per scroll line.
const ZOOM_SPEED: f32 = 0.5;

/// The windowed application.
pub struct App {
    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    viewer: Viewer,
    clock: FrameClock,
    mouse_pos: (f64, f64),
    left_mouse_down: bool,
    size: (u32, u32),
}

impl App {
    /// Creates an application that opens a `width` x `height` window.
    pub fn new(viewer: Viewer, width: u32, height: u32) -> Self {
        Self {
            window: None,
            engine: None,
            viewer,
            clock: FrameClock::new(),
            mouse_pos: (0.0, 0.0),
            left_mouse_down: false,
            size: (width.max(1), height.max(1)),
        }
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.resize(width, height);
        self.clock.on_resize();
    }

    /// Disposes the engine and drops it, so later events find no engine.
    fn release_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.dispose();
        }
    }

    /// One frame: tick, reflection pass, uniform sync, visible pass.
    ///
    /// Returns `false` when the app should stop.
    fn step(&mut self) -> bool {
        let Some(engine) = self.engine.as_mut() else {
            return true;
        };

        let elapsed = self.clock.tick();
        self.viewer.advance_to(elapsed);

        match self.viewer.render(engine, elapsed) {
            Ok(()) => true,
            Err(RenderError::OutOfMemory) => {
                log::error!("out of GPU memory; closing");
                self.release_engine();
                false
            }
            Err(err) => {
                log::warn!("frame skipped: {err}");
                true
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("mirrorwater")
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        match Engine::new_windowed(window.clone()).block_on() {
            Ok(engine) => {
                self.engine = Some(engine);
                self.window = Some(window);
            }
            Err(err) => {
                log::error!("failed to create render engine: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.release_engine();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.handle_resize(size.width, size.height);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.left_mouse_down = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (dx, dy) = (position.x - self.mouse_pos.0, position.y - self.mouse_pos.1);
                self.mouse_pos = (position.x, position.y);
                if self.left_mouse_down {
                    if let Some(engine) = self.engine.as_mut() {
                        engine
                            .camera
                            .orbit(dx as f32 * ORBIT_SPEED, dy as f32 * ORBIT_SPEED);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 40.0,
                };
                if let Some(engine) = self.engine.as_mut() {
                    engine.camera.zoom(lines * ZOOM_SPEED);
                }
            }
            WindowEvent::RedrawRequested => {
                if !self.step() {
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Opens a window and runs the frame loop until it is closed.
pub fn run(viewer: Viewer, width: u32, height: u32) -> Result<()> {
    let _ = env_logger::try_init();

    let event_loop = EventLoop::new().map_err(|e| MirrorwaterError::EventLoop(e.to_string()))?;
    let mut app = App::new(viewer, width, height);
    event_loop
        .run_app(&mut app)
        .map_err(|e| MirrorwaterError::EventLoop(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_after_release_are_ignored() {
        let Ok(engine) = Engine::new_headless(32, 32).block_on() else {
            return;
        };
        let mut app = App::new(Viewer::default(), 32, 32);
        app.engine = Some(engine);
        assert!(app.step());

        app.release_engine();
        assert!(app.engine.is_none());
        // a redraw or resize queued before the loop exits
        assert!(app.step());
        app.handle_resize(64, 64);
        app.release_engine();
    }

    #[test]
    fn test_window_size_is_never_empty() {
        let app = App::new(Viewer::default(), 0, 0);
        assert_eq!(app.size, (1, 1));
        assert!(app.engine.is_none());
    }
}

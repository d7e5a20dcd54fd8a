//! Desktop window surface.
//!
//! The window shows the emulated panel as rows of LED dots. Closing it or
//! pressing Escape stops the render thread.

use crate::MatrixError;
use crate::render::Surface;
use minifb::{Key, Window, WindowOptions};

/// Upper bound on repaints per second, so an idle panel doesn't spin a core.
const TARGET_FPS: usize = 60;

pub struct WindowSurface {
    window: Window,
}

impl WindowSurface {
    /// Open a window of `width` x `height` pixels.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, MatrixError> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| MatrixError::WindowInit(e.to_string()))?;
        window.set_target_fps(TARGET_FPS);
        tracing::info!("Opened {}x{} window \"{}\"", width, height, title);
        Ok(Self { window })
    }
}

impl Surface for WindowSurface {
    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    fn idle(&mut self) {
        self.window.update();
    }

    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<(), MatrixError> {
        self.window
            .update_with_buffer(frame, width, height)
            .map_err(|e| MatrixError::WindowUpdate(e.to_string()))
    }
}

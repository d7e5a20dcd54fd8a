//! Pixel grids the application draws into.
//!
//! [`Canvas`] is the drawing capability shared by everything that looks like
//! an LED matrix: a bare [`FrameCanvas`], a shared [`CanvasHandle`] and the
//! [`Matrix`](crate::Matrix) facade itself. Writes outside the grid are
//! dropped, so drawing code never has to clip.

use crate::Color;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Something that can be drawn on like an LED matrix.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Set one pixel. Out-of-range coordinates are ignored.
    fn set_pixel(&mut self, x: i32, y: i32, color: Color);

    /// Set every pixel to `color`.
    fn fill(&mut self, color: Color);

    fn clear(&mut self) {
        self.fill(Color::BLACK);
    }

    /// Copy a `width` x `height` block of row-major `colors` with its top-left
    /// corner at (`x`, `y`). Parts of the block that fall off the canvas, or
    /// past the end of `colors`, are skipped.
    fn set_pixels(&mut self, x: i32, y: i32, width: u32, height: u32, colors: &[Color]) {
        let offset = |origin: i32, d: u32| i32::try_from(d).ok().and_then(|d| origin.checked_add(d));
        for dy in 0..height {
            for dx in 0..width {
                let Some(&color) = colors.get(dy as usize * width as usize + dx as usize) else {
                    return;
                };
                // Past i32 range is off the canvas anyway.
                let (Some(px), Some(py)) = (offset(x, dx), offset(y, dy)) else {
                    continue;
                };
                self.set_pixel(px, py, color);
            }
        }
    }
}

// ── FrameCanvas ──────────────────────────────────────────────────────

/// A fixed-size grid of colors stored as one contiguous buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameCanvas {
    /// Create a black canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width as usize * height as usize],
        }
    }

    /// Color at (`x`, `y`), or `None` outside the grid.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl Canvas for FrameCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }
}

// ── CanvasHandle ─────────────────────────────────────────────────────

/// Shared handle to a [`FrameCanvas`] in the frame buffer pool.
///
/// Handles are cheap to clone and compare by identity: two handles are equal
/// only when they point at the same canvas. The application writes through a
/// handle while it owns it for drawing; the render thread only ever reads.
#[derive(Clone)]
pub struct CanvasHandle(Arc<RwLock<FrameCanvas>>);

impl CanvasHandle {
    pub fn new(canvas: FrameCanvas) -> Self {
        Self(Arc::new(RwLock::new(canvas)))
    }

    /// Borrow the canvas for reading.
    ///
    /// A panic on another thread while it held the lock leaves plain pixel
    /// data behind, so a poisoned lock is simply recovered.
    pub fn read(&self) -> RwLockReadGuard<'_, FrameCanvas> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Borrow the canvas for drawing. Take this once per frame for bulk
    /// drawing instead of going through the per-pixel [`Canvas`] impl.
    pub fn write(&self) -> RwLockWriteGuard<'_, FrameCanvas> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Color at (`x`, `y`), or `None` outside the grid.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.read().pixel(x, y)
    }
}

impl PartialEq for CanvasHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CanvasHandle {}

impl fmt::Debug for CanvasHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CanvasHandle")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}

impl Canvas for CanvasHandle {
    fn width(&self) -> u32 {
        self.read().width()
    }

    fn height(&self) -> u32 {
        self.read().height()
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.write().set_pixel(x, y, color);
    }

    fn fill(&mut self, color: Color) {
        self.write().fill(color);
    }

    fn set_pixels(&mut self, x: i32, y: i32, width: u32, height: u32, colors: &[Color]) {
        self.write().set_pixels(x, y, width, height, colors);
    }
}

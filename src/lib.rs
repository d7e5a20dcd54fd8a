//! Desktop emulator for RGB LED matrix panels.
//!
//! Application code draws against the same small canvas interface it would
//! use on real hardware, and a dedicated render thread paints the result
//! into a window, one LED dot per pixel.
//!
//! This module provides the pieces every program needs:
//! - Panel configuration (rows, columns, chain length)
//! - The `Color` type and its brightness helpers
//! - Signal handling for clean shutdown
//!
//! The matrix facade lives in [`matrix`], the double-buffer handoff in
//! [`swap`] and the window side in [`render`] and [`window`].

pub mod canvas;
pub mod error;
pub mod matrix;
pub mod options;
pub mod render;
pub mod sort;
pub mod swap;
pub mod window;

pub use canvas::{Canvas, CanvasHandle, FrameCanvas};
pub use error::MatrixError;
pub use matrix::{Matrix, MatrixOptions};

use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Panel configuration ────────────────────────────────────────────

/// Dimensions of the emulated panel chain.
///
/// Panels are daisy-chained horizontally, so the visible display is
/// `rows` tall and `cols * chain_length` wide.
///
/// # Rust concept: derive macros
/// `Clone, Copy` let the config be passed around by value (three u32s).
/// `Debug` gives `{:?}` formatting for log lines and error messages.
/// `PartialEq, Eq` let tests compare whole configs at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    pub rows: u32,
    pub cols: u32,
    pub chain_length: u32,
}

impl PanelConfig {
    pub fn new(rows: u32, cols: u32, chain_length: u32) -> Self {
        Self {
            rows,
            cols,
            chain_length,
        }
    }

    /// Width of the whole chain in pixels.
    ///
    /// Assumes a config that passed [`checked_pixel_count`](Self::checked_pixel_count);
    /// `Matrix` checks this before it opens a window.
    pub fn width(&self) -> u32 {
        self.cols * self.chain_length
    }

    /// Like [`width`](Self::width), but `None` on overflow.
    pub fn checked_width(&self) -> Option<u32> {
        self.cols.checked_mul(self.chain_length)
    }

    /// Height of the whole chain in pixels.
    pub fn height(&self) -> u32 {
        self.rows
    }

    /// Total number of pixels on the display.
    pub fn pixel_count(&self) -> u32 {
        self.width() * self.height()
    }

    /// Total pixel count, or `None` if the chain is too large to address.
    ///
    /// # Rust concept: Option combinators
    /// `?` works on `Option` too: the first `None` short-circuits, so one
    /// line chains both multiplications.
    pub fn checked_pixel_count(&self) -> Option<u32> {
        self.checked_width()?.checked_mul(self.rows)
    }
}

impl Default for PanelConfig {
    /// Three 64x32 panels side by side.
    fn default() -> Self {
        Self {
            rows: 32,
            cols: 64,
            chain_length: 3,
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a hue value (0-360), with full saturation and brightness.
    ///
    /// # Rust concept: match expressions
    /// `match` must be exhaustive. `sector` is a `u16`, so the last arm
    /// uses `_` to cover everything past 4.
    pub fn from_hue(hue: u16) -> Self {
        let hue = hue % 360;
        let sector = hue / 60;
        let fraction = ((hue % 60) as f32) / 60.0;
        let rising = (fraction * 255.0) as u8;
        let falling = ((1.0 - fraction) * 255.0) as u8;

        match sector {
            0 => Self::new(255, rising, 0),  // Red → Yellow
            1 => Self::new(falling, 255, 0), // Yellow → Green
            2 => Self::new(0, 255, rising),  // Green → Cyan
            3 => Self::new(0, falling, 255), // Cyan → Blue
            4 => Self::new(rising, 0, 255),  // Blue → Magenta
            _ => Self::new(255, 0, falling), // Magenta → Red
        }
    }

    /// Apply brightness scaling (0-100 percent) to this color.
    pub fn apply_brightness(self, brightness: u8) -> Self {
        if brightness >= 100 {
            return self;
        }
        Self {
            r: ((self.r as u16 * brightness as u16) / 100) as u8,
            g: ((self.g as u16 * brightness as u16) / 100) as u8,
            b: ((self.b as u16 * brightness as u16) / 100) as u8,
        }
    }

    /// Scale by an alpha value, 255 being fully lit.
    pub fn scale(self, alpha: u8) -> Self {
        if alpha == u8::MAX {
            return self;
        }
        let mul = |c: u8| ((c as u16 * alpha as u16 + 127) / 255) as u8;
        Self::new(mul(self.r), mul(self.g), mul(self.b))
    }

    /// Pack as `0x00RRGGBB`, the layout the window buffer expects.
    pub fn to_rgb_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Parses `"r,g,b"` with each component in 0-255.
impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let &[r, g, b] = parts.as_slice() else {
            return Err(format!("invalid color spec '{s}', expected r,g,b"));
        };
        let component = |v: &str| {
            v.parse::<u8>()
                .map_err(|_| format!("invalid color component '{v}' in '{s}'"))
        };
        Ok(Self::new(component(r)?, component(g)?, component(b)?))
    }
}

// ── Shutdown signal ────────────────────────────────────────────────

/// Install a Ctrl+C / SIGTERM handler that flips the returned flag to false.
///
/// Demo loops take the flag and poll it with [`is_running`] between frames.
///
/// # Rust concept: Arc and AtomicBool
/// The flag is shared between the demo loop and the signal handler, which
/// runs on its own thread. `Arc` gives both sides ownership of the same
/// value, and `AtomicBool` can be flipped through a shared reference
/// without a mutex.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, MatrixError> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone(); // Clones the Arc; both point at the same flag

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .map_err(MatrixError::Signal)?;

    Ok(running)
}

/// Check if the main loop should keep running.
///
/// # Rust concept: Ordering
/// `Ordering::SeqCst` is the strongest memory ordering. A stop flag is
/// read once per frame, so the cost does not matter.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────

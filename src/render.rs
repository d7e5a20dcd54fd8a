//! Render thread: owns the output surface and repaints the current canvas.
//!
//! The window has to live on the thread that pumps its events, so the
//! surface is created on the render thread itself and never leaves it. The
//! drawing side talks to this thread only through the [`SwapCoordinator`]
//! and the shared [`Brightness`].
//!
//! ## Lifecycle
//! Idle (no canvas yet) → Running (repainting) → Stopped, on a window close
//! or when the owning [`Matrix`](crate::Matrix) is dropped.

use crate::swap::SwapCoordinator;
use crate::{Canvas, CanvasHandle, Color, FrameCanvas, MatrixError};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::sync::mpsc::sync_channel;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Radius of one LED dot in window pixels.
pub const LED_RADIUS_PIXELS: u32 = 3;

/// Empty border around the panel, in window pixels.
const WINDOW_MARGIN: u32 = 20;

/// Ring drawn around every LED so unlit ones stay visible.
const OUTLINE_COLOR: Color = Color::new(64, 64, 64);

/// How long to wait between polls while no canvas has been assigned.
const IDLE_WAIT: Duration = Duration::from_millis(10);

// ── Surface ──────────────────────────────────────────────────────────

/// An output the render thread can paint `0x00RRGGBB` frames into.
pub trait Surface {
    /// False once the surface has been asked to close.
    fn is_open(&self) -> bool;

    /// Process pending events without presenting a new frame.
    fn idle(&mut self);

    /// Show a full frame of `width` x `height` pixels.
    fn present(&mut self, frame: &[u32], width: usize, height: usize) -> Result<(), MatrixError>;
}

// ── Brightness ───────────────────────────────────────────────────────

/// Display-wide brightness, applied to every canvas when compositing.
#[derive(Debug)]
pub struct Brightness {
    percent: AtomicU8,
}

impl Brightness {
    pub fn new(percent: u8) -> Self {
        Self {
            percent: AtomicU8::new(percent.min(100)),
        }
    }

    /// Set brightness in percent. Values above 100 are clamped.
    pub fn set(&self, percent: u8) {
        self.percent.store(percent.min(100), Ordering::Relaxed);
    }

    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    /// Brightness as a 0-255 alpha value.
    pub fn alpha(&self) -> u8 {
        percent_to_alpha(self.percent())
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new(100)
    }
}

pub fn percent_to_alpha(percent: u8) -> u8 {
    ((percent.min(100) as u16 * 255 + 50) / 100) as u8
}

// ── LED layout ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dot {
    Off,
    Lit,
    Outline,
}

/// Where each LED of the matrix lands in the window.
///
/// Every LED occupies a square cell of `(radius + 1) * 2` pixels holding a
/// filled circle and a one-pixel outline ring.
#[derive(Clone, Debug)]
pub struct LedLayout {
    cols: u32,
    rows: u32,
    pitch: u32,
    stamp: Vec<Dot>,
}

impl LedLayout {
    pub fn new(cols: u32, rows: u32, radius: u32) -> Self {
        let pitch = (radius + 1) * 2;
        let center = (radius + 1) as i64;
        let inner = (radius as i64).pow(2);
        let outer = (radius as i64 + 1).pow(2);

        let mut stamp = Vec::with_capacity((pitch * pitch) as usize);
        for y in 0..pitch as i64 {
            for x in 0..pitch as i64 {
                let d2 = (x - center).pow(2) + (y - center).pow(2);
                stamp.push(if d2 <= inner {
                    Dot::Lit
                } else if d2 <= outer {
                    Dot::Outline
                } else {
                    Dot::Off
                });
            }
        }

        Self {
            cols,
            rows,
            pitch,
            stamp,
        }
    }

    /// Window size a `cols` x `rows` grid of LEDs would need, or `None` if
    /// that window or its pixel buffer cannot be addressed.
    pub fn checked_window_size(cols: u32, rows: u32, radius: u32) -> Option<(usize, usize)> {
        let pitch = radius.checked_add(1)?.checked_mul(2)?;
        pitch.checked_mul(pitch)?;
        let side = |n: u32| -> Option<usize> {
            let pixels = n.checked_mul(pitch)?.checked_add(2 * WINDOW_MARGIN)?;
            usize::try_from(pixels).ok()
        };
        let (width, height) = (side(cols)?, side(rows)?);
        width.checked_mul(height)?;
        Some((width, height))
    }

    /// Window size in pixels as `(width, height)`.
    pub fn window_size(&self) -> (usize, usize) {
        (
            (2 * WINDOW_MARGIN + self.cols * self.pitch) as usize,
            (2 * WINDOW_MARGIN + self.rows * self.pitch) as usize,
        )
    }

    /// Window pixel at the center of LED (`x`, `y`).
    pub fn led_center(&self, x: u32, y: u32) -> (usize, usize) {
        let half = self.pitch / 2;
        (
            (WINDOW_MARGIN + x * self.pitch + half) as usize,
            (WINDOW_MARGIN + y * self.pitch + half) as usize,
        )
    }

    /// Paint `canvas` into `frame`, scaling every LED by `alpha`.
    pub fn composite(&self, canvas: &FrameCanvas, alpha: u8, frame: &mut [u32]) {
        let (frame_width, _) = self.window_size();
        let pitch = self.pitch as usize;
        let outline = OUTLINE_COLOR.to_rgb_u32();

        for y in 0..self.rows.min(canvas.height()) {
            for x in 0..self.cols.min(canvas.width()) {
                let Some(color) = canvas.pixel(x as i32, y as i32) else {
                    continue;
                };
                let lit = color.scale(alpha).to_rgb_u32();
                let left = (WINDOW_MARGIN + x * self.pitch) as usize;
                let top = (WINDOW_MARGIN + y * self.pitch) as usize;

                for (i, dot) in self.stamp.iter().enumerate() {
                    let value = match dot {
                        Dot::Off => continue,
                        Dot::Lit => lit,
                        Dot::Outline => outline,
                    };
                    let row = top + i / pitch;
                    let col = left + i % pitch;
                    if let Some(px) = frame.get_mut(row * frame_width + col) {
                        *px = value;
                    }
                }
            }
        }
    }
}

// ── Render loop ──────────────────────────────────────────────────────

/// Outcome of one pass of the render loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// No canvas assigned yet; nothing was drawn.
    Idle,
    /// A frame was painted and presented.
    Presented,
    /// The loop should exit.
    Stopped,
}

pub struct RenderLoop<S: Surface> {
    surface: S,
    swap: Arc<SwapCoordinator>,
    brightness: Arc<Brightness>,
    running: Arc<AtomicBool>,
    layout: LedLayout,
    frame: Vec<u32>,
    displayed: Option<CanvasHandle>,
}

impl<S: Surface> RenderLoop<S> {
    pub fn new(
        surface: S,
        layout: LedLayout,
        swap: Arc<SwapCoordinator>,
        brightness: Arc<Brightness>,
        running: Arc<AtomicBool>,
    ) -> Self {
        let (width, height) = layout.window_size();
        Self {
            surface,
            swap,
            brightness,
            running,
            layout,
            frame: vec![0; width * height],
            displayed: None,
        }
    }

    /// The canvas painted by the most recent [`Step::Presented`] pass.
    pub fn displayed(&self) -> Option<&CanvasHandle> {
        self.displayed.as_ref()
    }

    /// Run a single pass: check for shutdown, pick up the newest canvas and
    /// present it.
    pub fn step(&mut self) -> Result<Step, MatrixError> {
        if !self.running.load(Ordering::SeqCst) {
            return Ok(Step::Stopped);
        }
        if !self.surface.is_open() {
            tracing::info!("Window closed");
            return Ok(Step::Stopped);
        }

        let Some(canvas) = self.swap.take_frame() else {
            self.surface.idle();
            return Ok(Step::Idle);
        };

        // Only the canvas lock is held while painting; the swap lock is
        // already released so the drawing thread can hand over the next frame.
        self.frame.fill(0);
        self.layout
            .composite(&canvas.read(), self.brightness.alpha(), &mut self.frame);

        let (width, height) = self.layout.window_size();
        self.surface.present(&self.frame, width, height)?;
        self.displayed = Some(canvas);
        Ok(Step::Presented)
    }

    /// Repaint until stopped. Releases the surface, then clears the running
    /// flag so the drawing side can notice a closed window.
    pub fn run(mut self) {
        tracing::info!("Render thread started");
        loop {
            match self.step() {
                Ok(Step::Presented) => {}
                Ok(Step::Idle) => thread::sleep(IDLE_WAIT),
                Ok(Step::Stopped) => break,
                Err(e) => {
                    tracing::warn!("Render thread: {}", e);
                    break;
                }
            }
        }
        let running = self.running.clone();
        drop(self);
        running.store(false, Ordering::SeqCst);
        tracing::info!("Render thread stopped");
    }
}

// ── Render thread ────────────────────────────────────────────────────

/// Handle to the running render thread. Dropping it stops and joins the
/// thread, which releases the surface.
pub struct RenderThread {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Start the render thread and wait until `make_surface` has run on it.
    ///
    /// A surface that cannot be created is reported here, before any drawing
    /// happens.
    pub fn spawn<S, F>(
        make_surface: F,
        layout: LedLayout,
        swap: Arc<SwapCoordinator>,
        brightness: Arc<Brightness>,
    ) -> Result<Self, MatrixError>
    where
        S: Surface,
        F: FnOnce(&LedLayout) -> Result<S, MatrixError> + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = sync_channel(1);

        let thread_running = running.clone();
        let handle = thread::Builder::new()
            .name("matrix-render".to_string())
            .spawn(move || {
                let surface = match make_surface(&layout) {
                    Ok(surface) => surface,
                    Err(e) => {
                        thread_running.store(false, Ordering::SeqCst);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                RenderLoop::new(surface, layout, swap, brightness, thread_running).run();
            })
            .map_err(MatrixError::ThreadSpawn)?;

        let mut render = Self {
            running,
            handle: Some(handle),
        };

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(render),
            Ok(Err(e)) => {
                render.stop();
                Err(e)
            }
            Err(_) => {
                render.stop();
                Err(MatrixError::RenderThreadExited)
            }
        }
    }

    /// True until the loop stops, either from a window close or [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signal the loop to exit and wait for it to finish.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() {
            tracing::error!("Render thread panicked");
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Headless surface ─────────────────────────────────────────────────

/// Refresh period of the headless surface, roughly a 60 Hz display.
const HEADLESS_REFRESH: Duration = Duration::from_millis(16);

#[derive(Default)]
struct HeadlessState {
    last_frame: Mutex<Option<Vec<u32>>>,
    presented: AtomicU64,
    closed: AtomicBool,
    released: AtomicBool,
}

/// A surface with no window. It keeps the last presented frame in memory,
/// which is enough to run the emulator on a machine without a display.
pub struct HeadlessSurface {
    state: Arc<HeadlessState>,
}

/// Observer for a [`HeadlessSurface`] that stays usable after the surface
/// has moved to the render thread.
#[derive(Clone)]
pub struct HeadlessProbe {
    state: Arc<HeadlessState>,
}

impl HeadlessSurface {
    pub fn new() -> (Self, HeadlessProbe) {
        let state = Arc::new(HeadlessState::default());
        (
            Self {
                state: state.clone(),
            },
            HeadlessProbe { state },
        )
    }
}

impl Surface for HeadlessSurface {
    fn is_open(&self) -> bool {
        !self.state.closed.load(Ordering::SeqCst)
    }

    fn idle(&mut self) {}

    fn present(&mut self, frame: &[u32], _width: usize, _height: usize) -> Result<(), MatrixError> {
        *self
            .state
            .last_frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(frame.to_vec());
        self.state.presented.fetch_add(1, Ordering::SeqCst);
        thread::sleep(HEADLESS_REFRESH);
        Ok(())
    }
}

impl Drop for HeadlessSurface {
    fn drop(&mut self) {
        self.state.released.store(true, Ordering::SeqCst);
    }
}

impl HeadlessProbe {
    /// Number of frames presented so far.
    pub fn frames_presented(&self) -> u64 {
        self.state.presented.load(Ordering::SeqCst)
    }

    pub fn last_frame(&self) -> Option<Vec<u32>> {
        self.state
            .last_frame
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Behave as if the user closed the window.
    pub fn close(&self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }

    /// True once the surface has been dropped by the render thread.
    pub fn is_released(&self) -> bool {
        self.state.released.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` frames beyond the current total have been
    /// presented. Returns false on timeout.
    pub fn wait_for_frames(&self, count: u64, timeout: Duration) -> bool {
        let target = self.frames_presented() + count;
        let start = Instant::now();
        while self.frames_presented() < target {
            if start.elapsed() > timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }
}

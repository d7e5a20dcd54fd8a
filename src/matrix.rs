//! The application-facing matrix: frame canvases, swaps and brightness.
//!
//! Programs written for an LED panel get the same workflow here:
//!
//! ```no_run
//! use led_matrix_emu::{Canvas, Color, Matrix, MatrixOptions};
//!
//! let mut matrix = Matrix::new(MatrixOptions::default())?;
//! let mut canvas = matrix.create_frame_canvas();
//! loop {
//!     canvas.clear();
//!     canvas.set_pixel(3, 4, Color::new(255, 0, 0));
//!     canvas = matrix.swap_on_vsync(canvas, 60);
//! #   break;
//! }
//! # Ok::<(), led_matrix_emu::MatrixError>(())
//! ```

use crate::render::{
    Brightness, HeadlessSurface, LED_RADIUS_PIXELS, LedLayout, RenderThread, Surface,
};
use crate::swap::{FramePacer, SwapCoordinator};
use crate::window::WindowSurface;
use crate::{Canvas, CanvasHandle, Color, FrameCanvas, MatrixError, PanelConfig};
use std::sync::Arc;

/// Everything needed to bring up an emulated matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatrixOptions {
    pub panel: PanelConfig,
    /// Initial brightness in percent (0-100).
    pub brightness: u8,
    /// Radius of one LED dot in window pixels.
    pub led_radius: u32,
    pub title: String,
    /// Render into memory instead of opening a window.
    pub headless: bool,
}

impl Default for MatrixOptions {
    fn default() -> Self {
        Self {
            panel: PanelConfig::default(),
            brightness: 100,
            led_radius: LED_RADIUS_PIXELS,
            title: "LED Matrix".to_string(),
            headless: false,
        }
    }
}

/// An LED matrix backed by a window.
///
/// Drawing calls made directly on the matrix go to the active canvas, which
/// is the one most recently returned by [`create_frame_canvas`]. Dropping the
/// matrix stops the render thread and closes the window.
///
/// [`create_frame_canvas`]: Matrix::create_frame_canvas
pub struct Matrix {
    panel: PanelConfig,
    canvases: Vec<CanvasHandle>,
    active: Option<CanvasHandle>,
    swap: Arc<SwapCoordinator>,
    pacer: FramePacer,
    brightness: Arc<Brightness>,
    render: RenderThread,
}

impl Matrix {
    /// Open the emulator window (or a headless surface) and start rendering.
    ///
    /// Fails if the window cannot be created, so callers find out at startup.
    pub fn new(options: MatrixOptions) -> Result<Self, MatrixError> {
        if options.headless {
            let (surface, _probe) = HeadlessSurface::new();
            return Self::with_surface(&options, move |_: &LedLayout| Ok(surface));
        }

        let title = options.title.clone();
        Self::with_surface(&options, move |layout: &LedLayout| {
            let (width, height) = layout.window_size();
            WindowSurface::new(&title, width, height)
        })
    }

    /// Start rendering into a surface built by `make_surface` on the render
    /// thread.
    pub fn with_surface<S, F>(options: &MatrixOptions, make_surface: F) -> Result<Self, MatrixError>
    where
        S: Surface,
        F: FnOnce(&LedLayout) -> Result<S, MatrixError> + Send + 'static,
    {
        let panel = check_panel(options)?;
        let layout = LedLayout::new(panel.width(), panel.height(), options.led_radius);
        let swap = Arc::new(SwapCoordinator::new());
        let brightness = Arc::new(Brightness::new(options.brightness));

        let render = RenderThread::spawn(make_surface, layout, swap.clone(), brightness.clone())?;

        tracing::info!(
            "Matrix ready: {}x{} ({} x {}x{} panels)",
            panel.width(),
            panel.height(),
            panel.chain_length,
            panel.cols,
            panel.rows
        );

        Ok(Self {
            panel,
            canvases: Vec::new(),
            active: None,
            swap,
            pacer: FramePacer::new(),
            brightness,
            render,
        })
    }

    /// Panel chain this matrix was built for.
    pub fn panel(&self) -> PanelConfig {
        self.panel
    }

    /// Allocate a new canvas, make it the active drawing target and show it.
    ///
    /// New canvases start with every LED lit white. Keep the returned handle
    /// and pass it to [`swap_on_vsync`](Self::swap_on_vsync) when it is drawn.
    pub fn create_frame_canvas(&mut self) -> CanvasHandle {
        let mut canvas = FrameCanvas::new(self.panel.width(), self.panel.height());
        canvas.fill(Color::WHITE);
        let canvas = CanvasHandle::new(canvas);

        self.canvases.push(canvas.clone());
        self.active = Some(canvas.clone());
        self.swap.set_canvas(canvas.clone());

        tracing::debug!("Created frame canvas #{}", self.canvases.len());
        canvas
    }

    /// Hand `canvas` to the display and get back the canvas that was showing.
    ///
    /// With a nonzero `framerate_fraction`, first waits until `1/fraction`
    /// seconds have passed since the previous swap. Never waits for the
    /// render thread itself; if it hasn't picked up the last swap yet, that
    /// frame is replaced.
    pub fn swap_on_vsync(&mut self, canvas: CanvasHandle, framerate_fraction: u32) -> CanvasHandle {
        self.pacer.wait(framerate_fraction);
        match self.swap.swap_on_vsync(canvas) {
            Some(prev) => prev,
            // Nothing was ever shown; give the caller a fresh canvas to draw on.
            None => self.create_frame_canvas(),
        }
    }

    /// Set brightness in percent (0-100). Applies to every canvas from the
    /// next repaint on.
    pub fn set_brightness(&self, percent: u8) {
        self.brightness.set(percent);
        tracing::debug!("Brightness set to {}", self.brightness.percent());
    }

    pub fn brightness(&self) -> u8 {
        self.brightness.percent()
    }

    /// False once the window has been closed.
    pub fn is_open(&self) -> bool {
        self.render.is_running()
    }

    /// Number of canvases allocated so far.
    pub fn canvas_count(&self) -> usize {
        self.canvases.len()
    }

    fn active_canvas(&mut self) -> &mut CanvasHandle {
        let canvas = match self.active.take() {
            Some(canvas) => canvas,
            None => self.create_frame_canvas(),
        };
        self.active.insert(canvas)
    }
}

/// Reject panels whose canvases or window would not fit in memory indices.
fn check_panel(options: &MatrixOptions) -> Result<PanelConfig, MatrixError> {
    let panel = options.panel;
    let invalid = |reason: &str| {
        MatrixError::InvalidPanel(format!(
            "{} x {}x{} panels, LED radius {}: {reason}",
            panel.chain_length, panel.cols, panel.rows, options.led_radius
        ))
    };

    if panel.rows == 0 || panel.cols == 0 || panel.chain_length == 0 {
        return Err(invalid("rows, columns and chain length must be nonzero"));
    }
    if panel.checked_pixel_count().is_none() {
        return Err(invalid("too many pixels"));
    }
    if LedLayout::checked_window_size(panel.width(), panel.height(), options.led_radius).is_none() {
        return Err(invalid("window too large"));
    }
    Ok(panel)
}

impl Canvas for Matrix {
    fn width(&self) -> u32 {
        self.panel.width()
    }

    fn height(&self) -> u32 {
        self.panel.height()
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.active_canvas().set_pixel(x, y, color);
    }

    fn fill(&mut self, color: Color) {
        self.active_canvas().fill(color);
    }

    fn set_pixels(&mut self, x: i32, y: i32, width: u32, height: u32, colors: &[Color]) {
        self.active_canvas().set_pixels(x, y, width, height, colors);
    }
}

impl Drop for Matrix {
    fn drop(&mut self) {
        tracing::debug!("Shutting down matrix");
        self.render.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessProbe;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::time::{Duration, Instant};

    fn headless_matrix(rows: u32, cols: u32, chain: u32) -> (Matrix, HeadlessProbe) {
        let options = MatrixOptions {
            panel: PanelConfig::new(rows, cols, chain),
            headless: true,
            ..MatrixOptions::default()
        };
        let (surface, probe) = HeadlessSurface::new();
        let matrix = Matrix::with_surface(&options, move |_: &LedLayout| Ok(surface)).unwrap();
        (matrix, probe)
    }

    #[rstest]
    #[case(PanelConfig::new(1, 70_000, 70_000), 3)]
    #[case(PanelConfig::new(0, 64, 1), 3)]
    #[case(PanelConfig::new(32, 64, 0), 3)]
    #[case(PanelConfig::new(32, 600_000_000, 1), 3)]
    #[case(PanelConfig::new(32, 64, 1), u32::MAX)]
    fn unaddressable_panel_fails_construction(#[case] panel: PanelConfig, #[case] led_radius: u32) {
        let options = MatrixOptions {
            panel,
            led_radius,
            headless: true,
            ..MatrixOptions::default()
        };
        let (surface, display) = HeadlessSurface::new();
        let result = Matrix::with_surface(&options, move |_: &LedLayout| Ok(surface));

        assert!(matches!(result, Err(MatrixError::InvalidPanel(_))));
        // Rejected before the render thread ever built a surface.
        assert_eq!(display.frames_presented(), 0);
    }

    #[test]
    fn panel_reports_configured_chain() {
        let (matrix, _) = headless_matrix(16, 32, 2);
        assert_eq!(matrix.panel(), PanelConfig::new(16, 32, 2));
    }

    #[test]
    fn size_is_rows_by_chained_columns() {
        let (matrix, _probe) = headless_matrix(16, 32, 2);
        assert_eq!((matrix.width(), matrix.height()), (64, 16));
    }

    #[test]
    fn created_canvas_is_sized_lit_and_pooled() {
        let (mut matrix, _probe) = headless_matrix(4, 8, 1);
        let canvas = matrix.create_frame_canvas();
        assert_eq!((canvas.width(), canvas.height()), (8, 4));
        assert!(canvas.read().pixels().iter().all(|&c| c == Color::WHITE));
        assert_eq!(matrix.canvas_count(), 1);
    }

    #[test]
    fn swap_returns_created_canvas() {
        let (mut matrix, _probe) = headless_matrix(4, 4, 1);
        let a = matrix.create_frame_canvas();
        let b = CanvasHandle::new(FrameCanvas::new(4, 4));
        assert_eq!(matrix.swap_on_vsync(b, 0), a);
    }

    #[test]
    fn double_buffer_rotation() {
        let (mut matrix, probe) = headless_matrix(4, 4, 1);
        let a = matrix.create_frame_canvas();
        let b = matrix.create_frame_canvas();
        // `b` is now on display; draw on `a` and swap it in.
        assert!(probe.wait_for_frames(1, Duration::from_secs(2)));

        let back = matrix.swap_on_vsync(a.clone(), 0);
        assert_eq!(back, b);
        assert!(probe.wait_for_frames(2, Duration::from_secs(2)));

        let back = matrix.swap_on_vsync(back, 0);
        assert_eq!(back, a);
    }

    #[test]
    fn facade_draws_on_active_canvas() {
        let (mut matrix, _probe) = headless_matrix(4, 4, 1);
        let canvas = matrix.create_frame_canvas();
        matrix.clear();
        matrix.set_pixel(1, 2, Color::new(9, 8, 7));
        matrix.set_pixel(-1, 99, Color::new(9, 8, 7));

        assert_eq!(canvas.pixel(1, 2), Some(Color::new(9, 8, 7)));
        assert_eq!(canvas.pixel(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn drawing_without_canvas_creates_one() {
        let (mut matrix, _probe) = headless_matrix(4, 4, 1);
        matrix.fill(Color::new(1, 2, 3));
        assert_eq!(matrix.canvas_count(), 1);

        matrix.set_pixel(0, 0, Color::BLACK);
        assert_eq!(matrix.canvas_count(), 1);
    }

    #[test]
    fn swap_without_canvas_returns_fresh_canvas() {
        let (mut matrix, _probe) = headless_matrix(4, 4, 1);
        let mine = CanvasHandle::new(FrameCanvas::new(4, 4));
        let back = matrix.swap_on_vsync(mine.clone(), 0);
        assert_ne!(back, mine);
        assert_eq!(matrix.canvas_count(), 1);
    }

    #[test]
    fn brightness_round_trips_percent() {
        let (matrix, _probe) = headless_matrix(4, 4, 1);
        assert_eq!(matrix.brightness(), 100);
        matrix.set_brightness(50);
        assert_eq!(matrix.brightness(), 50);
        matrix.set_brightness(250);
        assert_eq!(matrix.brightness(), 100);
    }

    #[test]
    fn framerate_fraction_paces_swaps() {
        let (mut matrix, _probe) = headless_matrix(4, 4, 1);
        let mut canvas = matrix.create_frame_canvas();
        let start = Instant::now();
        for _ in 0..4 {
            canvas = matrix.swap_on_vsync(canvas, 100);
        }
        // First swap is free, the next three wait 10ms each.
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn window_close_is_visible_to_caller() {
        let (mut matrix, probe) = headless_matrix(4, 4, 1);
        matrix.create_frame_canvas();
        probe.close();

        let start = Instant::now();
        while matrix.is_open() && start.elapsed() < Duration::from_secs(2) {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!matrix.is_open());
    }

    #[test]
    fn drop_releases_surface() {
        let (mut matrix, probe) = headless_matrix(4, 4, 1);
        matrix.create_frame_canvas();
        assert!(probe.wait_for_frames(1, Duration::from_secs(2)));
        drop(matrix);
        assert!(probe.is_released());
    }
}

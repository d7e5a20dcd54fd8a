// End-to-end checks of the matrix facade against a headless surface.

use led_matrix_emu::render::{HeadlessProbe, HeadlessSurface, LED_RADIUS_PIXELS, LedLayout};
use led_matrix_emu::sort::{Algorithm, Sorter};
use led_matrix_emu::{Canvas, Color, Matrix, MatrixOptions, PanelConfig};
use pretty_assertions::assert_eq;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(2);

fn headless(panel: PanelConfig) -> (Matrix, HeadlessProbe) {
    let options = MatrixOptions {
        panel,
        ..MatrixOptions::default()
    };
    let (surface, probe) = HeadlessSurface::new();
    let matrix = Matrix::with_surface(&options, move |_: &LedLayout| Ok(surface))
        .expect("headless surface never fails");
    (matrix, probe)
}

/// Color shown at LED (`x`, `y`) in the last presented frame.
fn shown_at(probe: &HeadlessProbe, panel: PanelConfig, x: u32, y: u32) -> u32 {
    let layout = LedLayout::new(panel.width(), panel.height(), LED_RADIUS_PIXELS);
    let (width, _) = layout.window_size();
    let (cx, cy) = layout.led_center(x, y);
    probe.last_frame().expect("a frame was presented")[cy * width + cx]
}

#[test]
fn swapped_canvas_reaches_the_display() {
    let panel = PanelConfig::new(8, 8, 2);
    let (mut matrix, probe) = headless(panel);

    let mut canvas = matrix.create_frame_canvas();
    assert!(probe.wait_for_frames(1, TIMEOUT));
    assert_eq!(shown_at(&probe, panel, 0, 0), Color::WHITE.to_rgb_u32());

    let mut next = led_matrix_emu::CanvasHandle::new(led_matrix_emu::FrameCanvas::new(16, 8));
    next.fill(Color::new(0, 0, 255));
    next.set_pixel(15, 7, Color::new(255, 0, 0));

    let back = matrix.swap_on_vsync(next, 0);
    assert_eq!(back, canvas);
    assert!(probe.wait_for_frames(2, TIMEOUT));

    assert_eq!(shown_at(&probe, panel, 3, 3), 0x0000_00FF);
    assert_eq!(shown_at(&probe, panel, 15, 7), 0x00FF_0000);

    // The returned canvas is ours to draw on again.
    canvas = back;
    canvas.clear();
    assert_eq!(canvas.pixel(0, 0), Some(Color::BLACK));
}

#[test]
fn only_the_latest_of_rapid_swaps_is_shown() {
    let panel = PanelConfig::new(4, 4, 1);
    let (mut matrix, probe) = headless(panel);
    let a = matrix.create_frame_canvas();
    assert!(probe.wait_for_frames(1, TIMEOUT));

    let mut b1 = matrix.create_frame_canvas();
    let mut b2 = matrix.create_frame_canvas();
    // Re-show `a` so both b1 and b2 go through the mailbox.
    matrix.swap_on_vsync(a.clone(), 0);
    assert!(probe.wait_for_frames(2, TIMEOUT));

    b1.fill(Color::new(255, 0, 0));
    b2.fill(Color::new(0, 255, 0));
    matrix.swap_on_vsync(b1, 0);
    matrix.swap_on_vsync(b2, 0);
    assert!(probe.wait_for_frames(2, TIMEOUT));

    assert_eq!(shown_at(&probe, panel, 1, 1), 0x0000_FF00);
}

#[test]
fn brightness_dims_the_display() {
    let panel = PanelConfig::new(4, 4, 1);
    let (mut matrix, probe) = headless(panel);
    matrix.create_frame_canvas();
    matrix.fill(Color::new(200, 100, 50));

    matrix.set_brightness(50);
    assert_eq!(matrix.brightness(), 50);
    assert!(probe.wait_for_frames(2, TIMEOUT));

    assert_eq!(shown_at(&probe, panel, 0, 0), Color::new(100, 50, 25).to_rgb_u32());
}

#[test]
fn sorter_frames_flow_through_the_matrix() {
    let panel = PanelConfig::new(8, 8, 1);
    let (mut matrix, probe) = headless(panel);
    let mut sorter = Sorter::new(vec![8, 7, 6, 5, 4, 3, 2, 1], Algorithm::Insertion);
    let bar = Color::new(74, 46, 102);

    let mut canvas = matrix.create_frame_canvas();
    while sorter.step() {
        sorter.draw(&mut *canvas.write(), bar, Color::BLACK);
        canvas = matrix.swap_on_vsync(canvas, 0);
    }
    sorter.draw(&mut *canvas.write(), bar, Color::BLACK);
    matrix.swap_on_vsync(canvas, 0);
    assert!(probe.wait_for_frames(2, TIMEOUT));

    // Sorted ascending: the first column is one pixel tall, the last is full.
    assert_eq!(shown_at(&probe, panel, 0, 7), bar.to_rgb_u32());
    assert_eq!(shown_at(&probe, panel, 0, 6), 0);
    assert_eq!(shown_at(&probe, panel, 7, 0), bar.to_rgb_u32());
}

#[test]
fn teardown_mid_redraw_releases_surface() {
    let (mut matrix, probe) = headless(PanelConfig::new(32, 64, 3));
    let mut canvas = matrix.create_frame_canvas();
    for i in 0..20u8 {
        canvas.fill(Color::new(i, i, i));
        canvas = matrix.swap_on_vsync(canvas, 0);
    }
    drop(matrix);
    assert!(probe.is_released());
}

#[test]
fn closing_the_window_is_reported() {
    let (mut matrix, probe) = headless(PanelConfig::new(4, 4, 1));
    matrix.create_frame_canvas();
    assert!(probe.wait_for_frames(1, TIMEOUT));
    probe.close();

    let deadline = std::time::Instant::now() + TIMEOUT;
    while matrix.is_open() && std::time::Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(!matrix.is_open());
    assert!(probe.is_released());
}

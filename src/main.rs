//! LED matrix emulator demo launcher.
//!
//! Opens a window that looks like a chain of RGB LED panels and runs one of
//! the built-in demos against it.
//!
//! ## Architecture
//! - **Main thread**: runs the demo, draws into offscreen canvases and swaps
//! - **Render thread**: owns the window and repaints the latest swapped canvas
//!
//! ## Usage
//! ```sh
//! led-matrix-emu sort --algorithm insertion -d 30
//! led-matrix-emu --led-chain 1 pulse
//! ```

use clap::{Parser, Subcommand};
use led_matrix_emu::options::MatrixArgs;
use led_matrix_emu::sort::{Algorithm, Sorter};
use led_matrix_emu::{Canvas, Color, Matrix, is_running, setup_signal_handler};
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "led-matrix-emu")]
#[command(about = "Run LED matrix demos in a desktop window")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    matrix: MatrixArgs,

    #[command(subcommand)]
    demo: Demo,
}

#[derive(Subcommand)]
enum Demo {
    /// Visualize a sorting algorithm as a row of bars
    Sort {
        /// Sorting algorithm to use
        #[arg(short = 's', long, value_enum, default_value_t = Algorithm::Cocktail)]
        algorithm: Algorithm,

        /// Color of the bars as r,g,b
        #[arg(short = 'C', long, default_value = "74,46,102")]
        bar_color: Color,

        /// Color of the background as r,g,b
        #[arg(short = 'c', long, default_value = "0,0,0")]
        background: Color,

        /// Maximum sorting steps shown per second
        #[arg(short = 'd', long, default_value_t = 50)]
        framerate_fraction: u32,
    },
    /// Fill the display with a color cycling through the rainbow
    Pulse {
        /// Frames per second
        #[arg(long, default_value_t = 60)]
        fps: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let cli = Cli::parse();
    let running = setup_signal_handler()?;

    let title = match cli.demo {
        Demo::Sort { .. } => "Sort",
        Demo::Pulse { .. } => "Pulse",
    };
    let mut matrix = Matrix::new(cli.matrix.to_options(title))?;

    tracing::info!("LED matrix emulator v{}", env!("CARGO_PKG_VERSION"));
    let panel = matrix.panel();
    tracing::info!(
        "Display: {}x{} ({} chained {}x{} panels)",
        panel.width(),
        panel.height(),
        panel.chain_length,
        panel.cols,
        panel.rows
    );

    match cli.demo {
        Demo::Sort {
            algorithm,
            bar_color,
            background,
            framerate_fraction,
        } => run_sort(
            &mut matrix,
            &running,
            algorithm,
            bar_color,
            background,
            framerate_fraction,
        ),
        Demo::Pulse { fps } => run_pulse(&mut matrix, &running, fps),
    }

    tracing::info!("Shutting down cleanly.");
    Ok(())
}

fn keep_going(matrix: &Matrix, running: &AtomicBool) -> bool {
    is_running(running) && matrix.is_open()
}

fn run_sort(
    matrix: &mut Matrix,
    running: &AtomicBool,
    algorithm: Algorithm,
    bar: Color,
    background: Color,
    framerate_fraction: u32,
) {
    let mut rng = rand::thread_rng();
    let mut sorter = Sorter::random(
        &mut rng,
        matrix.width() as usize,
        matrix.height(),
        algorithm,
    );
    tracing::info!("Sorting {} bars with {:?}", sorter.data().len(), algorithm);

    let mut canvas = matrix.create_frame_canvas();
    let mut steps = 0u32;

    loop {
        sorter.draw(&mut *canvas.write(), bar, background);
        canvas = matrix.swap_on_vsync(canvas, framerate_fraction);

        if !keep_going(matrix, running) {
            return;
        }
        if !sorter.step() {
            break;
        }
        steps += 1;
    }

    // Show the sorted result once more, then hold it until asked to quit.
    sorter.draw(&mut *canvas.write(), bar, background);
    matrix.swap_on_vsync(canvas, framerate_fraction);
    tracing::info!("Sorted after {} steps. Press Ctrl+C or close the window to exit.", steps);

    while keep_going(matrix, running) {
        thread::sleep(Duration::from_millis(100));
    }
}

fn run_pulse(matrix: &mut Matrix, running: &AtomicBool, fps: u32) {
    let mut canvas = matrix.create_frame_canvas();
    let mut frame: u32 = 0;

    while keep_going(matrix, running) {
        let hue = ((frame / 2) % 360) as u16;

        // Triangle wave brightness: 0 → 100 → 0 over 200 frames
        let cycle = (frame % 200) as u8;
        let level = if cycle < 100 { cycle } else { (200 - cycle as u16) as u8 };

        canvas.fill(Color::from_hue(hue).apply_brightness(level));
        canvas = matrix.swap_on_vsync(canvas, fps);
        frame = frame.wrapping_add(1);
    }
}

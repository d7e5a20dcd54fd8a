//! # Image Viewer Example
//!
//! Loads an image from disk and displays it on the emulated matrix.
//!
//! ## Run it
//! ```sh
//! cargo run --release --example image_viewer -- path/to/image.png
//! ```

use clap::Parser;
use image::{ImageReader, imageops::FilterType};
use led_matrix_emu::options::MatrixArgs;
use led_matrix_emu::{Canvas, Color, Matrix, is_running, setup_signal_handler};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "image_viewer")]
#[command(about = "Display an image on the emulated LED matrix")]
struct Args {
    /// Path to the image file (PNG or JPEG)
    image_path: PathBuf,

    #[command(flatten)]
    matrix: MatrixArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let args = Args::parse();
    let mut matrix = Matrix::new(args.matrix.to_options("Image Viewer"))?;
    let running = setup_signal_handler()?;
    let mut canvas = matrix.create_frame_canvas();

    println!("Loading image: {}", args.image_path.display());
    let img = ImageReader::open(&args.image_path)?.decode()?;
    let resized = img
        .resize_exact(matrix.width(), matrix.height(), FilterType::Lanczos3)
        .to_rgb8();
    println!(
        "Image loaded and resized to {}x{}. Displaying...",
        resized.width(),
        resized.height()
    );

    let pixels: Vec<Color> = resized
        .pixels()
        .map(|p| Color::new(p[0], p[1], p[2]))
        .collect();
    canvas.clear();
    canvas.set_pixels(0, 0, resized.width(), resized.height(), &pixels);

    let _previous = matrix.swap_on_vsync(canvas, 0);
    println!("Image displayed! Press Ctrl+C or close the window to exit.");

    while is_running(&running) && matrix.is_open() {
        thread::sleep(Duration::from_millis(100));
    }

    println!("\nShutting down cleanly.");
    Ok(())
}

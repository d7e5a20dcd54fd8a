//! # Minimal LED Matrix Example
//!
//! Opens the emulator window and animates a few simple shapes:
//! - A pixel running along the top row
//! - A color-cycling pixel at the center
//! - An X across the whole display
//! - A pulsing square around the center
//!
//! ## Run it
//! ```sh
//! cargo run --release --example minimal -- --led-chain 1
//! ```

use clap::Parser;
use led_matrix_emu::options::MatrixArgs;
use led_matrix_emu::{Canvas, Color, Matrix, is_running, setup_signal_handler};

#[derive(Parser)]
#[command(name = "minimal")]
#[command(about = "Animate a few shapes on the emulated matrix")]
struct Args {
    #[command(flatten)]
    matrix: MatrixArgs,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let args = Args::parse();
    let mut matrix = Matrix::new(args.matrix.to_options("Minimal"))?;
    let running = setup_signal_handler()?;
    let mut canvas = matrix.create_frame_canvas();
    let mut frame: u32 = 0;

    let width = matrix.width() as i32;
    let height = matrix.height() as i32;
    let center_x = width / 2;
    let center_y = height / 2;

    while is_running(&running) && matrix.is_open() {
        canvas.clear();

        // Moving pixel across the top row
        let x = (frame % width as u32) as i32;
        canvas.set_pixel(x, 0, Color::WHITE);

        // Color-cycling pixel at center
        let hue = (frame.wrapping_mul(5) % 360) as u16;
        canvas.set_pixel(center_x, center_y, Color::from_hue(hue));

        // X pattern, stretched to the display's aspect ratio
        let red = Color::new(255, 0, 0);
        let green = Color::new(0, 255, 0);
        for x in 0..width {
            let y = x * (height - 1) / (width - 1).max(1);
            canvas.set_pixel(x, y, red);
            canvas.set_pixel(width - 1 - x, y, green);
        }

        // Pulsing square
        let pulse = (frame % 40) as i32;
        let r = if pulse < 20 { pulse } else { 40 - pulse };
        let blue = Color::new(0, 100, 255);
        for d in -r..=r {
            canvas.set_pixel(center_x + d, center_y - r, blue);
            canvas.set_pixel(center_x + d, center_y + r, blue);
            canvas.set_pixel(center_x - r, center_y + d, blue);
            canvas.set_pixel(center_x + r, center_y + d, blue);
        }

        canvas = matrix.swap_on_vsync(canvas, 60);
        frame = frame.wrapping_add(1);
    }

    println!("\nShutting down cleanly.");
    Ok(())
}

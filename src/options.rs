//! Matrix flags shared by every demo binary.
//!
//! Flatten [`MatrixArgs`] into a program's own `clap` parser to get the
//! usual `--led-*` options:
//!
//! ```text
//! --led-rows 32 --led-cols 64 --led-chain 3 --led-brightness 80
//! ```

use crate::render::LED_RADIUS_PIXELS;
use crate::{MatrixOptions, PanelConfig};
use clap::Args;

#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct MatrixArgs {
    /// Rows per panel (1-512)
    #[arg(long = "led-rows", default_value_t = 32, value_parser = clap::value_parser!(u32).range(1..=512))]
    pub rows: u32,

    /// Columns per panel (1-512)
    #[arg(long = "led-cols", default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..=512))]
    pub cols: u32,

    /// Number of panels chained side by side (1-32)
    #[arg(long = "led-chain", default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=32))]
    pub chain: u32,

    /// Brightness in percent (0-100)
    #[arg(long = "led-brightness", default_value_t = 100, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub brightness: u8,

    /// Radius of one LED dot in window pixels
    #[arg(long = "led-radius", default_value_t = LED_RADIUS_PIXELS, value_parser = clap::value_parser!(u32).range(1..=16))]
    pub radius: u32,

    /// Render without opening a window
    #[arg(long = "led-headless")]
    pub headless: bool,
}

impl MatrixArgs {
    pub fn panel(&self) -> PanelConfig {
        PanelConfig::new(self.rows, self.cols, self.chain)
    }

    /// Build matrix options, using `title` for the window.
    pub fn to_options(&self, title: &str) -> MatrixOptions {
        MatrixOptions {
            panel: self.panel(),
            brightness: self.brightness,
            led_radius: self.radius,
            title: title.to_string(),
            headless: self.headless,
        }
    }
}

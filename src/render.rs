//! LED panel output: presents raster frames on an RGB LED matrix.
//!
//! The `rpi-led-matrix` C library is not thread-safe, so the panel is driven
//! from the same single-threaded runtime that runs the animation timer. Each
//! timer firing advances the widget, which redraws into a [`RasterCanvas`];
//! that frame is then blitted to the panel's offscreen canvas and swapped in.
//!
//! ## Rust concepts
//! - `tokio::select!` to wait on the timer or a shutdown poll, whichever
//!   comes first
//! - Double buffering by value: `swap` takes the drawn canvas and hands back
//!   the one to draw next

use crate::canvas::{Canvas, RasterCanvas};
use crate::timer::IntervalTimer;
use crate::widget::PulseWidget;
use crate::{Color, PanelConfig, create_matrix, is_running};
use rpi_led_matrix::{LedCanvas, LedMatrix};
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// How often the animation loop checks for Ctrl+C while the timer is idle.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// An LED matrix plus its offscreen canvas.
pub struct LedPanel {
    matrix: LedMatrix,
    canvas: Option<LedCanvas>,
    brightness: u8,
}

impl LedPanel {
    pub fn new(panel: PanelConfig, brightness: u8) -> Result<Self, Box<dyn std::error::Error>> {
        let matrix = create_matrix(panel)?;
        let canvas = matrix.offscreen_canvas();
        Ok(Self {
            matrix,
            canvas: Some(canvas),
            brightness: brightness.min(100),
        })
    }

    /// Blit a raster frame and swap it onto the panel.
    ///
    /// The panel has no alpha channel, so every pixel is composited over black.
    pub fn present(&mut self, frame: &RasterCanvas) {
        let Some(mut canvas) = self.canvas.take() else {
            return;
        };
        canvas.clear();
        for (x, y, pixel) in frame.image().enumerate_pixels() {
            if pixel[3] == 0 {
                continue;
            }
            let c = over_black(Color::rgba(pixel[0], pixel[1], pixel[2], pixel[3] as f32 / 255.0))
                .apply_brightness(self.brightness);
            canvas.set(x as i32, y as i32, &c.into());
        }
        self.canvas = Some(self.matrix.swap(canvas));
    }

    pub fn clear(&mut self) {
        if let Some(mut canvas) = self.canvas.take() {
            canvas.clear();
            self.canvas = Some(self.matrix.swap(canvas));
        }
    }
}

/// Flatten a translucent color onto a black background.
fn over_black(c: Color) -> Color {
    let scale = |v: u8| (v as f32 * c.a).round() as u8;
    Color::new(scale(c.r), scale(c.g), scale(c.b))
}

/// Run the widget's animation on the panel until `running` goes false.
///
/// The widget's initial frame is presented first, so a static widget still
/// shows up even though its timer never fires.
pub async fn run_on_panel(
    widget: &mut PulseWidget<RasterCanvas, IntervalTimer>,
    panel: &mut LedPanel,
    running: &AtomicBool,
) {
    panel.present(widget.canvas());
    tracing::info!(
        "Presenting {}x{} waveform on the panel",
        widget.canvas().width(),
        widget.canvas().height()
    );

    let mut frames: u64 = 0;
    while is_running(running) {
        let fired = tokio::select! {
            _ = widget.timer_mut().fired() => true,
            _ = tokio::time::sleep(SHUTDOWN_POLL) => false,
        };

        if fired {
            widget.tick();
            panel.present(widget.canvas());
            frames += 1;
        }
    }

    widget.pause_animation();
    panel.clear();
    tracing::info!("Animation stopped after {} frames", frames);
}

//! Animated pulse waveform widget.
//!
//! A short list of amplitude samples ("markup") is padded with silence,
//! optionally repeated, and stroked as a polyline across a drawing surface.
//! When animated, a timer sweeps a lit edge from left to right, optionally
//! leaving a fading trail behind it once the first pass has completed.
//!
//! This crate provides:
//! - Waveform construction helpers and presets (`waveform`)
//! - The stateful widget and its configuration (`widget`, `config`)
//! - Drawing surface and timer capabilities with concrete backends
//!   (`canvas`, `timer`)
//! - Our own `Color` type shared by every backend
//! - Signal handling and panel configuration for the `pulse-line` binary

pub mod canvas;
pub mod config;
pub mod error;
#[cfg(feature = "hardware")]
pub mod render;
pub mod timer;
pub mod waveform;
pub mod widget;

pub use canvas::{Canvas, LinearGradient, RasterCanvas, RecordingCanvas, StrokeStyle};
pub use config::PulseConfig;
pub use error::PulseError;
pub use timer::{IntervalTimer, ManualTimer, Timer};
pub use waveform::Preset;
pub use widget::PulseWidget;

#[cfg(feature = "hardware")]
use rpi_led_matrix::{LedMatrix, LedMatrixOptions, LedRuntimeOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Panel configuration ────────────────────────────────────────────

/// Dimensions of the LED panel the `hardware` backend draws on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    pub rows: u32,
    pub cols: u32,
}

impl PanelConfig {
    pub fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self { rows: 64, cols: 64 }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// An RGBA color with a fractional alpha channel.
///
/// Gradient stops only ever vary the alpha of a configured color, so alpha
/// is kept as `f32` in `[0.0, 1.0]` while the channels stay 8-bit.
///
/// # Rust concept: serde `try_from` / `into`
/// The color travels through config files as a CSS-style string. Instead of
/// hand-writing `Serialize`/`Deserialize`, we point serde at our `FromStr`
/// and `Display` impls through `String` conversions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0, 0, 0, 1.0);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

    /// Opaque color from RGB values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same channels, different alpha (clamped to `[0.0, 1.0]`).
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Apply brightness scaling (0-100) to the color channels. Alpha is kept.
    pub fn apply_brightness(self, brightness: u8) -> Self {
        if brightness >= 100 {
            return self;
        }
        Self {
            r: ((self.r as u16 * brightness as u16) / 100) as u8,
            g: ((self.g as u16 * brightness as u16) / 100) as u8,
            b: ((self.b as u16 * brightness as u16) / 100) as u8,
            a: self.a,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// CSS color string, e.g. `rgba(255, 0, 0, 0.5)`.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = PulseError;

    /// Accepts `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`
    /// and the names `black`, `white` and `transparent`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_ascii_lowercase();
        let invalid = || PulseError::InvalidColor(s.to_string());

        match input.as_str() {
            "black" => return Ok(Self::BLACK),
            "white" => return Ok(Self::WHITE),
            "transparent" => return Ok(Self::TRANSPARENT),
            _ => {}
        }

        if let Some(hex) = input.strip_prefix('#') {
            if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
                return Err(invalid());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
            let a = if hex.len() == 8 {
                channel(6)? as f32 / 255.0
            } else {
                1.0
            };
            return Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a));
        }

        let (body, expect_alpha) = if let Some(rest) = input.strip_prefix("rgba(") {
            (rest, true)
        } else if let Some(rest) = input.strip_prefix("rgb(") {
            (rest, false)
        } else {
            return Err(invalid());
        };
        let body = body.strip_suffix(')').ok_or_else(invalid)?;
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        let expected_parts = if expect_alpha { 4 } else { 3 };
        if parts.len() != expected_parts {
            return Err(invalid());
        }

        let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
        let a = if expect_alpha {
            let a = parts[3].parse::<f32>().map_err(|_| invalid())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(invalid());
            }
            a
        } else {
            1.0
        };

        Ok(Self::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            a,
        ))
    }
}

impl TryFrom<String> for Color {
    type Error = PulseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

/// Convert our Color to the hardware crate's LedColor at the boundary.
///
/// The LED panel has no alpha channel, so callers composite onto black first.
#[cfg(feature = "hardware")]
impl From<Color> for rpi_led_matrix::LedColor {
    fn from(c: Color) -> Self {
        rpi_led_matrix::LedColor {
            red: c.r,
            green: c.g,
            blue: c.b,
        }
    }
}

// ── Matrix initialization ──────────────────────────────────────────

/// Create a matrix configured for our hardware:
/// Pi Zero 2 W + Adafruit Bonnet + configurable panel size.
#[cfg(feature = "hardware")]
pub fn create_matrix(panel: PanelConfig) -> Result<LedMatrix, Box<dyn std::error::Error>> {
    let mut options = LedMatrixOptions::new();
    options.set_rows(panel.rows);
    options.set_cols(panel.cols);
    options.set_hardware_mapping("adafruit-hat");

    options.set_pwm_bits(8)?;
    options.set_pwm_lsb_nanoseconds(130);

    let mut rt_options = LedRuntimeOptions::new();
    rt_options.set_gpio_slowdown(2); // Pi Zero 2 W requires slowdown=2

    let matrix = LedMatrix::new(Some(options), Some(rt_options))?;

    Ok(matrix)
}

/// Set up a Ctrl+C handler that sets `running` to false.
///
/// # Rust concept: Arc and AtomicBool
/// The flag is shared between the animation loop and the signal handler.
/// `AtomicBool` is a thread-safe boolean — no mutex needed for a single bool.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the animation loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────

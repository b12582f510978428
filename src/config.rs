//! Widget configuration.
//!
//! `PulseConfig` is deserialized from JSON (the binary's `--config` file) or
//! built in code starting from `PulseConfig::default()`. Counts are signed so
//! a config file with a negative value still loads; [`PulseConfig::normalize`]
//! clamps them to their floors instead of rejecting the file.

use crate::Color;
use crate::error::{PulseError, Result};
use crate::waveform::{PULSE, sequence_len};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Largest waveform, in samples, a config may build.
pub const MAX_SAMPLES: usize = 1 << 20;

/// Configuration for a [`PulseWidget`](crate::PulseWidget).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PulseConfig {
    /// Raw samples, conventionally in `[-1.0, 1.0]`
    pub markup: Vec<f64>,
    /// Pixels between consecutive samples
    pub distribution: f64,
    /// Surface height override; `None` keeps the surface's current height
    pub height: Option<f64>,
    /// How many copies of the padded markup to draw (floor 1)
    pub repeat: i64,
    /// Leave a fading trail behind the sweep after the first pass
    pub trailed: bool,
    pub animated: bool,
    /// Milliseconds per animation step (floor 1)
    pub speed: i64,
    /// Stroke width
    pub weight: f64,
    pub color: Color,
    /// Trail color; fully transparent means "use `color`"
    pub trailing_color: Color,
    /// Zero samples of padding around the markup (floor 0)
    pub interval: i64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            markup: PULSE.to_vec(),
            distribution: 2.5,
            height: None,
            repeat: 1,
            trailed: false,
            animated: false,
            speed: 50,
            weight: 5.0,
            color: Color::BLACK,
            trailing_color: Color::TRANSPARENT,
            interval: 4,
        }
    }
}

impl PulseConfig {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Clamp counts to their floors and reject values no waveform can be
    /// drawn from.
    pub fn normalize(mut self) -> Result<Self> {
        if self.markup.is_empty() {
            return Err(PulseError::InvalidConfiguration(
                "markup must contain at least one sample".to_string(),
            ));
        }
        if !self.distribution.is_finite() {
            return Err(PulseError::InvalidConfiguration(format!(
                "distribution must be finite, got {}",
                self.distribution
            )));
        }
        if let Some(height) = self.height {
            if !height.is_finite() || height < 0.0 {
                return Err(PulseError::InvalidConfiguration(format!(
                    "height must be a non-negative number, got {height}"
                )));
            }
        }

        if self.repeat < 1 {
            tracing::warn!("repeat {} is below 1, using 1", self.repeat);
            self.repeat = 1;
        }
        if self.interval < 0 {
            tracing::warn!("interval {} is negative, using 0", self.interval);
            self.interval = 0;
        }
        if self.speed < 1 {
            tracing::warn!("speed {}ms is below 1ms, using 1ms", self.speed);
            self.speed = 1;
        }

        match sequence_len(self.markup.len(), self.repeat_count(), self.interval_count()) {
            Some(len) if len <= MAX_SAMPLES => Ok(self),
            _ => Err(PulseError::InvalidConfiguration(format!(
                "markup of {} samples repeated {} times with interval {} exceeds {} samples",
                self.markup.len(),
                self.repeat,
                self.interval,
                MAX_SAMPLES
            ))),
        }
    }

    pub fn repeat_count(&self) -> usize {
        usize::try_from(self.repeat.max(1)).unwrap_or(usize::MAX)
    }

    pub fn interval_count(&self) -> usize {
        usize::try_from(self.interval.max(0)).unwrap_or(usize::MAX)
    }

    pub fn step_period(&self) -> Duration {
        Duration::from_millis(self.speed.max(1) as u64)
    }
}

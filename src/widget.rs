//! The pulse widget: builds the waveform, draws it, and steps the animation.
//!
//! ## Animation
//! A cursor (`animation_step`) walks the sample sequence one index per timer
//! tick and wraps back to 0 after the last index. The polyline always goes
//! through every sample; the cursor only moves the lit edge of a horizontal
//! gradient along it. The first full pass is tracked so the optional trail
//! only appears once there is something behind the sweep to fade.
//!
//! ## Rust concepts
//! - Generic struct over two capability traits (`Canvas`, `Timer`)
//! - `Option<T::Handle>` as a two-state machine (idle / running)
//! - Associated types (`Timer::Handle`)

use crate::canvas::{Canvas, StrokeStyle};
use crate::config::PulseConfig;
use crate::error::{PulseError, Result};
use crate::timer::Timer;
use crate::waveform::build_sequence;
use crate::Color;
use std::time::Duration;

/// An animated pulse waveform drawn on a canvas it owns.
pub struct PulseWidget<C: Canvas, T: Timer> {
    canvas: C,
    timer: T,
    handle: Option<T::Handle>,
    samples: Vec<f64>,
    distribution: f64,
    weight: f64,
    color: Color,
    trailing_color: Color,
    trailed: bool,
    animated: bool,
    period: Duration,
    animation_step: usize,
    first_iteration: bool,
}

impl<C: Canvas, T: Timer> PulseWidget<C, T> {
    /// Build the waveform, size the canvas, start the timer when animated,
    /// and draw the first frame.
    pub fn new(mut canvas: C, timer: T, config: PulseConfig) -> Result<Self> {
        let config = config.normalize()?;

        let samples = build_sequence(&config.markup, config.repeat_count(), config.interval_count());
        if samples.len() < 2 {
            return Err(PulseError::InvalidConfiguration(format!(
                "waveform needs at least 2 samples to span the surface, got {}",
                samples.len()
            )));
        }

        canvas.set_width((samples.len() - 1) as f64 * config.distribution);
        if let Some(height) = config.height {
            canvas.set_height(height);
        }

        let mut widget = Self {
            canvas,
            timer,
            handle: None,
            distribution: config.distribution,
            weight: config.weight,
            color: config.color,
            trailing_color: config.trailing_color,
            trailed: config.trailed,
            animated: config.animated,
            period: config.step_period(),
            animation_step: samples.len() - 1,
            first_iteration: false,
            samples,
        };

        tracing::debug!(
            "Pulse widget: {} samples, {}x{} surface, animated={}",
            widget.samples.len(),
            widget.canvas.width(),
            widget.canvas.height(),
            widget.animated
        );

        if widget.animated {
            widget.animation_step = 0;
            widget.first_iteration = true;
            widget.start_animation();
        }

        widget.draw();

        Ok(widget)
    }

    // ── Drawing ──────────────────────────────────────────────────────

    /// Clear the surface and stroke the whole waveform once.
    pub fn draw(&mut self) {
        let width = self.canvas.width();
        let height = self.canvas.height();

        self.canvas.clear_rect(0.0, 0.0, width, height);
        self.canvas.set_line_width(self.weight);
        let style = self.stroke_style();
        self.canvas.set_stroke_style(style);

        self.canvas.begin_path();
        for (i, &sample) in self.samples.iter().enumerate() {
            let (x, y) = self.point(i, sample, height);
            if i == 0 {
                self.canvas.move_to(x, y);
            } else {
                self.canvas.line_to(x, y);
            }
        }
        self.canvas.stroke();
    }

    /// Map sample `i` to surface coordinates: 1.0 at the top edge, -1.0 at
    /// the bottom, 0 on the center line.
    fn point(&self, i: usize, sample: f64, height: f64) -> (f64, f64) {
        let mid = height / 2.0;
        (self.distribution * i as f64, mid - mid * sample)
    }

    fn stroke_style(&self) -> StrokeStyle {
        if !self.animated {
            return StrokeStyle::Solid(self.color);
        }

        let progress = self.animation_step as f64 / self.samples.len() as f64;
        let mut gradient = self
            .canvas
            .create_linear_gradient(0.0, 0.0, self.canvas.width(), 0.0);

        gradient.add_color_stop(0.0, self.color.with_alpha(0.0));
        gradient.add_color_stop(progress, self.color.with_alpha(1.0));

        if self.trailed && !self.first_iteration {
            let trail = self.trail_color();
            gradient.add_color_stop(progress, trail.with_alpha(0.0));
            gradient.add_color_stop(1.0, trail.with_alpha(trail.a * (1.0 - progress) as f32));
        } else {
            gradient.add_color_stop(progress, self.color.with_alpha(0.0));
            gradient.add_color_stop(1.0, self.color.with_alpha(0.0));
        }

        StrokeStyle::Gradient(gradient)
    }

    /// The configured trailing color, or the opaque stroke color when the
    /// trailing color is left fully transparent.
    ///
    /// The trail stop's alpha is this color's alpha scaled by `1 - progress`,
    /// so the default (opaque stroke color) fades as plain `1 - progress`.
    fn trail_color(&self) -> Color {
        if self.trailing_color.is_transparent() {
            self.color.with_alpha(1.0)
        } else {
            self.trailing_color
        }
    }

    // ── Sizing ───────────────────────────────────────────────────────

    pub fn set_width(&mut self, width: f64) {
        self.canvas.set_width(width);
    }

    pub fn set_height(&mut self, height: f64) {
        self.canvas.set_height(height);
    }

    /// Fit the existing waveform to a new surface size.
    ///
    /// Rescales the sample spacing but neither rebuilds the sequence nor
    /// redraws; call [`draw`](Self::draw) for an immediate update.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.distribution = width / (self.samples.len() - 1) as f64;
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    // ── Animation ────────────────────────────────────────────────────

    /// Register the recurring timer. The cursor is not reset, so this also
    /// resumes after [`pause_animation`](Self::pause_animation).
    pub fn start_animation(&mut self) {
        if let Some(old) = self.handle.take() {
            self.timer.cancel(old);
        }
        self.handle = Some(self.timer.every(self.period));
        tracing::debug!(
            "Animation started at step {} ({}ms per step)",
            self.animation_step,
            self.period.as_millis()
        );
    }

    /// Cancel the timer, keeping the cursor where it is.
    pub fn pause_animation(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.timer.cancel(handle);
            tracing::debug!("Animation paused at step {}", self.animation_step);
        }
    }

    /// One timer firing: advance the cursor, draw, and close out the first
    /// pass once the cursor reaches the last sample.
    pub fn tick(&mut self) {
        let last = self.samples.len() - 1;
        self.animation_step = if self.animation_step >= last {
            0
        } else {
            self.animation_step + 1
        };

        self.draw();

        if self.first_iteration && self.animation_step == last {
            self.first_iteration = false;
            tracing::debug!("First animation pass complete");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn distribution(&self) -> f64 {
        self.distribution
    }

    pub fn animation_step(&self) -> usize {
        self.animation_step
    }

    pub fn first_iteration(&self) -> bool {
        self.first_iteration
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}

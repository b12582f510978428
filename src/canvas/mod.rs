//! Drawing surface capability consumed by the widget.
//!
//! The widget only ever talks to a [`Canvas`]: a 2D surface with a size,
//! a current path, a stroke style and a line width, modelled on the HTML
//! canvas 2D context. Two backends live here:
//!
//! - [`RecordingCanvas`] keeps a log of every call (tests, `--trace`)
//! - [`RasterCanvas`] rasterises strokes into an RGBA image (PNG export,
//!   LED panel output)

mod raster;
mod recording;

pub use raster::{MAX_DIMENSION, RasterCanvas};
pub use recording::{DrawCommand, RecordingCanvas};

use crate::Color;

// ── Gradients ────────────────────────────────────────────────────────

/// One color stop of a [`LinearGradient`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient line, in `[0.0, 1.0]`
    pub offset: f64,
    pub color: Color,
}

/// A linear gradient from `(x0, y0)` to `(x1, y1)`.
///
/// Stops are kept sorted by offset. Stops sharing an offset stay in the
/// order they were added, which is how a hard edge is expressed: the color
/// jumps from the earlier stop to the later one at that offset.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            stops: Vec::new(),
        }
    }

    /// Add a stop. Offsets outside `[0.0, 1.0]` are clamped.
    pub fn add_color_stop(&mut self, offset: f64, color: Color) {
        let offset = offset.clamp(0.0, 1.0);
        let index = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(index, ColorStop { offset, color });
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color of the gradient at point `(x, y)`.
    ///
    /// The point is projected onto the gradient line. A zero-length line
    /// paints nothing.
    pub fn color_at(&self, x: f64, y: f64) -> Color {
        let dx = self.x1 - self.x0;
        let dy = self.y1 - self.y0;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return Color::TRANSPARENT;
        }
        let t = ((x - self.x0) * dx + (y - self.y0) * dy) / len_sq;
        self.evaluate(t)
    }

    /// Color at fractional position `t` along the gradient line.
    pub fn evaluate(&self, t: f64) -> Color {
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Color::TRANSPARENT;
        };
        let t = t.clamp(0.0, 1.0);
        if t < first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }

        // First stop strictly past t; its predecessor is the last stop at or before t.
        let next = self.stops.partition_point(|s| s.offset <= t);
        let a = self.stops[next - 1];
        let b = self.stops[next];
        let f = ((t - a.offset) / (b.offset - a.offset)) as f32;
        lerp_premultiplied(a.color, b.color, f)
    }
}

/// Interpolate in premultiplied space so a fade to transparent does not
/// drag the channels towards the transparent stop's (meaningless) RGB.
fn lerp_premultiplied(a: Color, b: Color, f: f32) -> Color {
    let alpha = a.a + (b.a - a.a) * f;
    if alpha <= 0.0 {
        return Color::TRANSPARENT;
    }
    let channel = |ca: u8, cb: u8| {
        let pa = ca as f32 * a.a;
        let pb = cb as f32 * b.a;
        ((pa + (pb - pa) * f) / alpha).round().clamp(0.0, 255.0) as u8
    };
    Color::rgba(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b), alpha)
}

// ── Stroke style ─────────────────────────────────────────────────────

/// What a stroke is painted with.
#[derive(Clone, Debug, PartialEq)]
pub enum StrokeStyle {
    Solid(Color),
    Gradient(LinearGradient),
}

impl StrokeStyle {
    pub fn color_at(&self, x: f64, y: f64) -> Color {
        match self {
            Self::Solid(color) => *color,
            Self::Gradient(gradient) => gradient.color_at(x, y),
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::Solid(Color::BLACK)
    }
}

// ── Canvas capability ────────────────────────────────────────────────

/// A 2D drawing surface.
///
/// # Rust concept: traits as capabilities
/// The widget is generic over `C: Canvas`, so the same drawing code runs
/// against a recorder in tests and a pixel buffer in production, with no
/// dynamic dispatch and no knowledge of the backend.
pub trait Canvas {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn set_width(&mut self, width: f64);
    fn set_height(&mut self, height: f64);

    /// Reset every pixel in the rectangle to transparent.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Discard the current path.
    fn begin_path(&mut self);
    /// Start a new subpath at `(x, y)`.
    fn move_to(&mut self, x: f64, y: f64);
    /// Extend the current subpath with a straight segment to `(x, y)`.
    fn line_to(&mut self, x: f64, y: f64);
    /// Paint the current path with the stroke style and line width.
    fn stroke(&mut self);

    fn set_stroke_style(&mut self, style: StrokeStyle);
    fn set_line_width(&mut self, width: f64);

    fn create_linear_gradient(&self, x0: f64, y0: f64, x1: f64, y1: f64) -> LinearGradient {
        LinearGradient::new(x0, y0, x1, y1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sweep(progress: f64) -> LinearGradient {
        let mut g = LinearGradient::new(0.0, 0.0, 100.0, 0.0);
        g.add_color_stop(0.0, Color::BLACK.with_alpha(0.0));
        g.add_color_stop(progress, Color::BLACK);
        g.add_color_stop(progress, Color::BLACK.with_alpha(0.0));
        g.add_color_stop(1.0, Color::BLACK.with_alpha(0.0));
        g
    }

    #[test]
    fn stops_keep_insertion_order_at_equal_offsets() {
        let g = sweep(0.5);
        let alphas: Vec<f32> = g.stops().iter().map(|s| s.color.a).collect();
        assert_eq!(alphas, vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn stops_are_sorted_and_clamped() {
        let mut g = LinearGradient::new(0.0, 0.0, 1.0, 0.0);
        g.add_color_stop(1.5, Color::WHITE);
        g.add_color_stop(0.25, Color::BLACK);
        let offsets: Vec<f64> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.25, 1.0]);
    }

    #[test]
    fn sweep_ramps_up_to_the_edge_then_cuts_off() {
        let g = sweep(0.5);
        assert_eq!(g.evaluate(0.0).a, 0.0);
        assert!((g.evaluate(0.25).a - 0.5).abs() < 1e-6);
        assert!(g.evaluate(0.499).a > 0.99);
        // The later stop at a shared offset wins.
        assert_eq!(g.evaluate(0.5).a, 0.0);
        assert_eq!(g.evaluate(0.75).a, 0.0);
    }

    #[test]
    fn color_at_projects_onto_the_line() {
        let g = sweep(0.5);
        assert_eq!(g.color_at(25.0, 0.0), g.color_at(25.0, 80.0));
        assert_eq!(g.color_at(-10.0, 0.0), g.evaluate(0.0));
    }

    #[test]
    fn degenerate_gradient_is_transparent() {
        let mut g = LinearGradient::new(5.0, 5.0, 5.0, 5.0);
        g.add_color_stop(0.0, Color::WHITE);
        assert_eq!(g.color_at(5.0, 5.0), Color::TRANSPARENT);
    }

    #[test]
    fn empty_gradient_is_transparent() {
        assert_eq!(LinearGradient::new(0.0, 0.0, 1.0, 0.0).evaluate(0.5), Color::TRANSPARENT);
    }

    #[test]
    fn premultiplied_fade_keeps_channels() {
        let mut g = LinearGradient::new(0.0, 0.0, 1.0, 0.0);
        g.add_color_stop(0.0, Color::new(255, 0, 0));
        g.add_color_stop(1.0, Color::TRANSPARENT);
        let mid = g.evaluate(0.5);
        assert_eq!((mid.r, mid.g, mid.b), (255, 0, 0));
        assert!((mid.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn solid_style_ignores_position() {
        let style = StrokeStyle::Solid(Color::WHITE);
        assert_eq!(style.color_at(0.0, 0.0), style.color_at(99.0, 3.0));
        assert_eq!(StrokeStyle::default(), StrokeStyle::Solid(Color::BLACK));
    }
}

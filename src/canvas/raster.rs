//! Software rasteriser onto an RGBA pixel buffer.
//!
//! Strokes are rendered by measuring, for every pixel near the path, its
//! distance to the closest segment. That distance becomes a coverage value
//! with a one-pixel anti-aliased edge. Coverage is accumulated per stroke
//! (max over segments) before blending, so joints between segments are not
//! painted twice.

use super::{Canvas, StrokeStyle};
use crate::Color;
use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;

/// A pixel-buffer canvas backed by an [`image::RgbaImage`].
pub struct RasterCanvas {
    image: RgbaImage,
    subpaths: Vec<Vec<(f64, f64)>>,
    style: StrokeStyle,
    line_width: f64,
}

impl RasterCanvas {
    /// Create a transparent canvas of the given pixel size, capped at
    /// [`MAX_DIMENSION`] per side.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.min(MAX_DIMENSION), height.min(MAX_DIMENSION)),
            subpaths: Vec::new(),
            style: StrokeStyle::default(),
            line_width: 1.0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Color of one pixel. Out-of-bounds pixels read as transparent.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        match self.image.get_pixel_checked(x, y) {
            Some(Rgba([r, g, b, a])) => Color::rgba(*r, *g, *b, *a as f32 / 255.0),
            None => Color::TRANSPARENT,
        }
    }

    /// Write the current frame as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), image::ImageError> {
        self.image.save_with_format(path, ImageFormat::Png)
    }

    /// Reallocate the buffer. Like an HTML canvas, resizing clears it.
    fn reallocate(&mut self, width: u32, height: u32) {
        self.image = RgbaImage::new(width, height);
        self.subpaths.clear();
    }

    fn blend(&mut self, x: u32, y: u32, src: Color, coverage: f32) {
        let sa = src.a * coverage;
        if sa <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mix = |s: u8, d: u8| {
            ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        *dst = Rgba([
            mix(src.r, dst[0]),
            mix(src.g, dst[1]),
            mix(src.b, dst[2]),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        ]);
    }
}

/// Largest width or height a raster canvas will allocate, in pixels.
pub const MAX_DIMENSION: u32 = 16_384;

/// Pixel coordinate for a canvas value: negative and NaN become 0, and
/// anything past [`MAX_DIMENSION`] is clamped to it.
fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.min(MAX_DIMENSION as f64) as u32
    } else if value == f64::INFINITY {
        MAX_DIMENSION
    } else {
        0
    }
}

/// Distance from point `p` to the segment `a`–`b`.
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

impl Canvas for RasterCanvas {
    fn width(&self) -> f64 {
        self.image.width() as f64
    }

    fn height(&self) -> f64 {
        self.image.height() as f64
    }

    fn set_width(&mut self, width: f64) {
        let height = self.image.height();
        self.reallocate(to_pixels(width), height);
    }

    fn set_height(&mut self, height: f64) {
        let width = self.image.width();
        self.reallocate(width, to_pixels(height));
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let x0 = to_pixels(x.floor()).min(self.image.width());
        let y0 = to_pixels(y.floor()).min(self.image.height());
        let x1 = to_pixels((x + width).ceil()).min(self.image.width());
        let y1 = to_pixels((y + height).ceil()).min(self.image.height());
        for py in y0..y1 {
            for px in x0..x1 {
                self.image.put_pixel(px, py, Rgba([0, 0, 0, 0]));
            }
        }
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.subpaths.push(vec![(x, y)]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        match self.subpaths.last_mut() {
            Some(subpath) => subpath.push((x, y)),
            None => self.subpaths.push(vec![(x, y)]),
        }
    }

    fn stroke(&mut self) {
        let (width, height) = self.image.dimensions();
        if width == 0 || height == 0 || self.line_width <= 0.0 {
            return;
        }

        let half = self.line_width / 2.0;
        let stride = width as usize;
        let mut coverage = vec![0.0f32; stride * height as usize];
        let mut touched = false;

        for subpath in &self.subpaths {
            for pair in subpath.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let reach = half + 1.0;
                let x0 = to_pixels((a.0.min(b.0) - reach).floor()).min(width);
                let y0 = to_pixels((a.1.min(b.1) - reach).floor()).min(height);
                let x1 = to_pixels((a.0.max(b.0) + reach).ceil()).min(width);
                let y1 = to_pixels((a.1.max(b.1) + reach).ceil()).min(height);

                for py in y0..y1 {
                    for px in x0..x1 {
                        let center = (px as f64 + 0.5, py as f64 + 0.5);
                        let d = distance_to_segment(center, a, b);
                        let c = (half + 0.5 - d).clamp(0.0, 1.0) as f32;
                        let slot = &mut coverage[py as usize * stride + px as usize];
                        if c > *slot {
                            *slot = c;
                            touched = true;
                        }
                    }
                }
            }
        }

        if !touched {
            return;
        }

        for py in 0..height {
            for px in 0..width {
                let c = coverage[py as usize * stride + px as usize];
                if c > 0.0 {
                    let src = self.style.color_at(px as f64 + 0.5, py as f64 + 0.5);
                    self.blend(px, py, src, c);
                }
            }
        }
    }

    fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::LinearGradient;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn horizontal_line(canvas: &mut RasterCanvas, y: f64) {
        canvas.begin_path();
        canvas.move_to(0.0, y);
        canvas.line_to(canvas.width(), y);
        canvas.stroke();
    }

    #[test]
    fn new_canvas_is_transparent() {
        let canvas = RasterCanvas::new(4, 3);
        assert_eq!((canvas.width(), canvas.height()), (4.0, 3.0));
        assert_eq!(canvas.pixel(1, 1), Color::TRANSPARENT);
        assert_eq!(canvas.pixel(10, 10), Color::TRANSPARENT);
    }

    #[test]
    fn solid_stroke_paints_the_line_only() {
        let mut canvas = RasterCanvas::new(20, 20);
        canvas.set_line_width(4.0);
        canvas.set_stroke_style(StrokeStyle::Solid(Color::new(255, 0, 0)));
        horizontal_line(&mut canvas, 10.0);

        assert_eq!(canvas.pixel(10, 9), Color::new(255, 0, 0));
        assert_eq!(canvas.pixel(10, 10), Color::new(255, 0, 0));
        assert_eq!(canvas.pixel(10, 2), Color::TRANSPARENT);
        assert_eq!(canvas.pixel(10, 17), Color::TRANSPARENT);
    }

    #[test]
    fn joints_are_not_painted_twice() {
        let mut canvas = RasterCanvas::new(20, 20);
        canvas.set_line_width(4.0);
        canvas.set_stroke_style(StrokeStyle::Solid(Color::rgba(0, 0, 255, 0.5)));
        canvas.begin_path();
        canvas.move_to(0.0, 10.0);
        canvas.line_to(10.0, 10.0);
        canvas.line_to(20.0, 10.0);
        canvas.stroke();

        let joint = canvas.pixel(10, 10);
        let middle = canvas.pixel(5, 10);
        assert_eq!(joint, middle);
    }

    #[test]
    fn gradient_stroke_varies_along_x() {
        let mut canvas = RasterCanvas::new(100, 10);
        let mut gradient = canvas.create_linear_gradient(0.0, 0.0, 100.0, 0.0);
        gradient.add_color_stop(0.0, Color::WHITE.with_alpha(0.0));
        gradient.add_color_stop(0.5, Color::WHITE);
        gradient.add_color_stop(0.5, Color::WHITE.with_alpha(0.0));
        canvas.set_line_width(4.0);
        canvas.set_stroke_style(StrokeStyle::Gradient(gradient));
        horizontal_line(&mut canvas, 5.0);

        assert!(canvas.pixel(45, 5).a > 0.85);
        assert!(canvas.pixel(10, 5).a < canvas.pixel(40, 5).a);
        assert_eq!(canvas.pixel(75, 5), Color::TRANSPARENT);
    }

    #[test]
    fn clear_rect_resets_pixels() {
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.set_line_width(10.0);
        canvas.set_stroke_style(StrokeStyle::Solid(Color::WHITE));
        horizontal_line(&mut canvas, 5.0);
        assert_eq!(canvas.pixel(5, 5), Color::WHITE);

        canvas.clear_rect(0.0, 0.0, 10.0, 10.0);
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn resizing_reallocates() {
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.set_width(27.5);
        canvas.set_height(-3.0);
        assert_eq!((canvas.width(), canvas.height()), (27.0, 0.0));

        // Stroking an empty surface is a no-op rather than a panic.
        canvas.set_line_width(2.0);
        horizontal_line(&mut canvas, 0.0);
    }

    #[test]
    fn huge_sizes_are_capped() {
        let mut canvas = RasterCanvas::new(0, 1);
        canvas.set_width(1e12);
        assert_eq!(canvas.width(), MAX_DIMENSION as f64);
        canvas.set_width(f64::INFINITY);
        assert_eq!(canvas.width(), MAX_DIMENSION as f64);

        canvas.set_line_width(2.0);
        horizontal_line(&mut canvas, 0.5);
        assert_eq!(canvas.pixel(MAX_DIMENSION - 1, 0), Color::BLACK);
    }

    #[test]
    fn degenerate_gradient_paints_nothing() {
        let mut canvas = RasterCanvas::new(10, 10);
        let mut gradient = LinearGradient::new(0.0, 0.0, 0.0, 0.0);
        gradient.add_color_stop(0.0, Color::WHITE);
        canvas.set_line_width(4.0);
        canvas.set_stroke_style(StrokeStyle::Gradient(gradient));
        horizontal_line(&mut canvas, 5.0);
        assert!(canvas.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn save_png_writes_a_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("frame.png");
        let mut canvas = RasterCanvas::new(8, 8);
        canvas.set_line_width(2.0);
        horizontal_line(&mut canvas, 4.0);

        canvas.save_png(&path).unwrap();
        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(4, 4), canvas.image().get_pixel(4, 4));
    }
}

//! A canvas that records calls instead of drawing them.

use super::{Canvas, StrokeStyle};

/// One recorded canvas call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    SetWidth(f64),
    SetHeight(f64),
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    Stroke,
    SetStrokeStyle(StrokeStyle),
    SetLineWidth(f64),
}

/// Records every call made on it, in order, and tracks the surface size.
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the log, leaving the canvas size untouched.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn set_width(&mut self, width: f64) {
        self.width = width;
        self.commands.push(DrawCommand::SetWidth(width));
    }

    fn set_height(&mut self, height: f64) {
        self.height = height;
        self.commands.push(DrawCommand::SetHeight(height));
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::ClearRect {
            x,
            y,
            width,
            height,
        });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.commands.push(DrawCommand::SetStrokeStyle(style));
    }

    fn set_line_width(&mut self, width: f64) {
        self.commands.push(DrawCommand::SetLineWidth(width));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_calls_in_order() {
        let mut canvas = RecordingCanvas::new(10.0, 20.0);
        canvas.set_line_width(2.0);
        canvas.set_stroke_style(StrokeStyle::Solid(Color::WHITE));
        canvas.begin_path();
        canvas.move_to(0.0, 1.0);
        canvas.line_to(2.0, 3.0);
        canvas.stroke();

        assert_eq!(
            canvas.commands(),
            &[
                DrawCommand::SetLineWidth(2.0),
                DrawCommand::SetStrokeStyle(StrokeStyle::Solid(Color::WHITE)),
                DrawCommand::BeginPath,
                DrawCommand::MoveTo(0.0, 1.0),
                DrawCommand::LineTo(2.0, 3.0),
                DrawCommand::Stroke,
            ]
        );
    }

    #[test]
    fn resizing_updates_size_and_log() {
        let mut canvas = RecordingCanvas::default();
        canvas.set_width(200.0);
        canvas.set_height(80.0);

        assert_eq!((canvas.width(), canvas.height()), (200.0, 80.0));
        assert_eq!(
            canvas.take_commands(),
            vec![DrawCommand::SetWidth(200.0), DrawCommand::SetHeight(80.0)]
        );
        assert!(canvas.commands().is_empty());
    }
}

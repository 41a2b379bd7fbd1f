//! Renderer that records draw calls instead of rasterizing them.

use inkgraph_core::ShapeStyle;
use inkgraph_core::graph::FillRule;
use kurbo::{BezPath, CubicBez, Line, Point, QuadBez, Rect};
use peniko::Color;

use crate::renderer::{HandleKind, Placement, Renderer};

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        line: Line,
        style: ShapeStyle,
        at: Placement,
    },
    CubicBezier {
        curve: CubicBez,
        style: ShapeStyle,
        at: Placement,
    },
    QuadraticBezier {
        curve: QuadBez,
        style: ShapeStyle,
        at: Placement,
    },
    Conic {
        path: BezPath,
        weight: f64,
        style: ShapeStyle,
        at: Placement,
    },
    Rectangle {
        rect: Rect,
        style: ShapeStyle,
        at: Placement,
    },
    Ellipse {
        rect: Rect,
        style: ShapeStyle,
        at: Placement,
    },
    Path {
        path: BezPath,
        fill_rule: FillRule,
        style: ShapeStyle,
        at: Placement,
    },
    Text {
        rect: Rect,
        text: String,
        style: ShapeStyle,
        at: Placement,
    },
    Image {
        rect: Rect,
        key: String,
        style: ShapeStyle,
        at: Placement,
    },
    Point {
        point: Point,
        style: ShapeStyle,
        at: Placement,
    },
    Handle {
        point: Point,
        kind: HandleKind,
        size: f64,
        at: Placement,
    },
}

impl DrawCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            DrawCommand::Line { .. } => "line",
            DrawCommand::CubicBezier { .. } => "cubic_bezier",
            DrawCommand::QuadraticBezier { .. } => "quadratic_bezier",
            DrawCommand::Conic { .. } => "conic",
            DrawCommand::Rectangle { .. } => "rectangle",
            DrawCommand::Ellipse { .. } => "ellipse",
            DrawCommand::Path { .. } => "path",
            DrawCommand::Text { .. } => "text",
            DrawCommand::Image { .. } => "image",
            DrawCommand::Point { .. } => "point",
            DrawCommand::Handle { .. } => "handle",
        }
    }

    /// Style of the call. Handles carry none and report the default.
    pub fn style(&self) -> ShapeStyle {
        match self {
            DrawCommand::Line { style, .. }
            | DrawCommand::CubicBezier { style, .. }
            | DrawCommand::QuadraticBezier { style, .. }
            | DrawCommand::Conic { style, .. }
            | DrawCommand::Rectangle { style, .. }
            | DrawCommand::Ellipse { style, .. }
            | DrawCommand::Path { style, .. }
            | DrawCommand::Text { style, .. }
            | DrawCommand::Image { style, .. }
            | DrawCommand::Point { style, .. } => style.clone(),
            DrawCommand::Handle { .. } => ShapeStyle::default(),
        }
    }

    /// Stroke color the call would paint with.
    pub fn stroke(&self) -> Color {
        self.style().stroke_with_opacity()
    }
}

/// Collects every draw call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Hand over the recorded calls and start over.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded calls of `kind`.
    pub fn count(&self, kind: &str) -> usize {
        self.commands.iter().filter(|c| c.kind() == kind).count()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_line(&mut self, line: Line, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::Line {
            line,
            style: style.clone(),
            at,
        });
    }

    fn draw_cubic_bezier(&mut self, curve: CubicBez, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::CubicBezier {
            curve,
            style: style.clone(),
            at,
        });
    }

    fn draw_quadratic_bezier(&mut self, curve: QuadBez, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::QuadraticBezier {
            curve,
            style: style.clone(),
            at,
        });
    }

    fn draw_conic(&mut self, path: &BezPath, weight: f64, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::Conic {
            path: path.clone(),
            weight,
            style: style.clone(),
            at,
        });
    }

    fn draw_rectangle(&mut self, rect: Rect, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::Rectangle {
            rect,
            style: style.clone(),
            at,
        });
    }

    fn draw_ellipse(&mut self, rect: Rect, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::Ellipse {
            rect,
            style: style.clone(),
            at,
        });
    }

    fn draw_path(&mut self, path: &BezPath, fill_rule: FillRule, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::Path {
            path: path.clone(),
            fill_rule,
            style: style.clone(),
            at,
        });
    }

    fn draw_text(&mut self, rect: Rect, text: &str, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::Text {
            rect,
            text: text.to_string(),
            style: style.clone(),
            at,
        });
    }

    fn draw_image(&mut self, rect: Rect, key: &str, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::Image {
            rect,
            key: key.to_string(),
            style: style.clone(),
            at,
        });
    }

    fn draw_point(&mut self, point: Point, style: &ShapeStyle, at: Placement) {
        self.commands.push(DrawCommand::Point {
            point,
            style: style.clone(),
            at,
        });
    }

    fn draw_handle(&mut self, point: Point, kind: HandleKind, size: f64, at: Placement) {
        self.commands.push(DrawCommand::Handle { point, kind, size, at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut renderer = RecordingRenderer::new();
        let style = ShapeStyle::default().with_stroke(Color::from_rgba8(255, 0, 0, 255), 3.0);
        renderer.draw_rectangle(Rect::new(0.0, 0.0, 10.0, 10.0), &style, Placement::default());
        renderer.draw_handle(Point::ZERO, HandleKind::Selected, 8.0, Placement::default());

        assert_eq!(renderer.commands().len(), 2);
        assert_eq!(renderer.count("rectangle"), 1);
        assert_eq!(renderer.count("handle"), 1);
        assert_eq!(renderer.commands()[0].stroke(), Color::from_rgba8(255, 0, 0, 255));
    }

    #[test]
    fn test_take_empties_the_recording() {
        let mut renderer = RecordingRenderer::new();
        renderer.draw_point(Point::new(1.0, 2.0), &ShapeStyle::default(), Placement::default());
        let taken = renderer.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].kind(), "point");
        assert!(renderer.commands().is_empty());
    }
}

//! Selection and gesture decorations drawn over the document.

use std::collections::HashSet;

use inkgraph_core::style::SerializableColor;
use inkgraph_core::tools::Tool;
use inkgraph_core::{Canvas, ElementId, PointId, Shape, ShapeStyle};
use kurbo::Point;

use crate::renderer::{HandleKind, Placement, RenderResult, Renderer, draw_document, draw_shapes};

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 16.0;

/// Draws handles for selected and hovered elements, the marquee and the
/// snapping guides of the active filters.
#[derive(Debug, Clone)]
pub struct SelectionDecorator {
    pub handle_size: f64,
    pub marquee_style: ShapeStyle,
    pub guide_style: ShapeStyle,
}

impl Default for SelectionDecorator {
    fn default() -> Self {
        Self {
            handle_size: HANDLE_SIZE,
            marquee_style: ShapeStyle {
                stroke_color: SerializableColor::new(30, 120, 255, 255),
                stroke_width: 1.0,
                fill_color: Some(SerializableColor::new(30, 120, 255, 32)),
                dashes: vec![4.0, 4.0],
                ..ShapeStyle::default()
            },
            guide_style: ShapeStyle {
                stroke_color: SerializableColor::new(255, 0, 160, 255),
                stroke_width: 1.0,
                ..ShapeStyle::default()
            },
        }
    }
}

impl SelectionDecorator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw every decoration. Returns the number of handles drawn.
    pub fn decorate<R: Renderer + ?Sized>(&self, renderer: &mut R, canvas: &Canvas) -> usize {
        self.decorate_at(renderer, canvas, Placement::default())
    }

    pub fn decorate_at<R: Renderer + ?Sized>(&self, renderer: &mut R, canvas: &Canvas, at: Placement) -> usize {
        // Constant on screen whatever the zoom.
        let size = self.handle_size / canvas.zoom.max(f64::EPSILON);
        let mut handles = Handles {
            renderer: &mut *renderer,
            canvas,
            size,
            at,
            seen: HashSet::new(),
        };

        for point in canvas.selection.selected_points() {
            handles.draw(point, HandleKind::Selected);
        }
        for id in canvas.selection.selected_shapes() {
            if let Some(shape) = find(canvas, id) {
                for point in shape.points() {
                    handles.draw(point, HandleKind::Selected);
                }
            }
        }
        match canvas.selection.hovered() {
            Some(ElementId::Point(point)) => handles.draw(point, HandleKind::Hovered),
            Some(ElementId::Shape(id)) => {
                if let Some(shape) = find(canvas, id) {
                    for point in shape.points() {
                        handles.draw(point, HandleKind::Hovered);
                    }
                }
            }
            None => {}
        }
        let drawn = handles.seen.len();

        if let Tool::Select(tool) = canvas.tools.tool() {
            if let Some(rect) = tool.marquee() {
                renderer.draw_rectangle(rect, &self.marquee_style, at);
            }
        }
        for guide in canvas.filters.guides() {
            renderer.draw_line(guide, &self.guide_style, at);
        }
        drawn
    }
}

fn find(canvas: &Canvas, id: inkgraph_core::ShapeId) -> Option<&Shape> {
    canvas
        .document
        .find_shape(id)
        .or_else(|| canvas.working.iter().find_map(|s| s.find(id)))
}

/// Draws each point's handle at most once; the first kind wins.
struct Handles<'a, R: ?Sized> {
    renderer: &'a mut R,
    canvas: &'a Canvas,
    size: f64,
    at: Placement,
    seen: HashSet<PointId>,
}

impl<R: Renderer + ?Sized> Handles<'_, R> {
    fn draw(&mut self, point: PointId, kind: HandleKind) {
        let Some(position) = self.position(point) else {
            return;
        };
        if self.seen.insert(point) {
            self.renderer.draw_handle(position, kind, self.size, self.at);
        }
    }

    fn position(&self, point: PointId) -> Option<Point> {
        self.canvas.document.points.position(point)
    }
}

/// Draw a whole canvas: the document, the gesture preview, then decorations.
pub fn draw_canvas<R: Renderer + ?Sized>(
    renderer: &mut R,
    canvas: &Canvas,
    decorator: &SelectionDecorator,
    at: Placement,
) -> RenderResult<usize> {
    let mut drawn = draw_document(renderer, &canvas.document, at)?;
    drawn += draw_shapes(renderer, &canvas.document, &canvas.working, at.dx, at.dy, at.scale)?;
    decorator.decorate_at(renderer, canvas, at);
    Ok(drawn)
}

//! Point tool: place free points or attach them to connectable shapes.

use kurbo::Point;

use super::{ToolContext, ToolHandler};
use crate::input::Modifiers;
use crate::selection::ElementId;

/// Single-click tool; it has no gesture state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointTool;

impl ToolHandler for PointTool {
    fn left_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let position = ctx.snap(point);
        let target = ctx
            .hit
            .try_to_get_shape(&ctx.document.shapes, &ctx.document.points, position);

        let attach_to = target.filter(|id| {
            ctx.document
                .find_shape(*id)
                .is_some_and(|s| s.as_connectable().is_some())
        });
        let created = match attach_to {
            Some(id) => {
                let new_point = ctx.new_point(position);
                let attached = ctx
                    .document
                    .find_shape_mut(id)
                    .and_then(|s| s.as_connectable_mut())
                    .is_some_and(|c| c.attach(new_point));
                if attached {
                    ctx.document.points.set_owner(new_point, Some(id));
                    log::debug!("Attached point {new_point:?} to shape {id}");
                }
                new_point
            }
            None => {
                let style = ctx.style.to_string();
                ctx.document.add_point(position, &style).1
            }
        };

        ctx.selection.clear();
        ctx.selection.select(ElementId::Point(created));
        ctx.clear_filters();
        ctx.invalidate();
        true
    }

    fn is_active(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{LineShape, Shape};
    use crate::tools::testing::Harness;

    #[test]
    fn test_free_point() {
        let mut h = Harness::new();
        let mut tool = PointTool;
        assert!(h.down(&mut tool, 5.0, 5.0));

        assert_eq!(h.document.len(), 1);
        let Shape::Point(p) = &h.document.shapes[0] else {
            panic!("expected a point shape");
        };
        assert_eq!(h.position(p.point), Point::new(5.0, 5.0));
        assert!(h.selection.is_point_selected(p.point));
        assert!(!h.captured);
    }

    #[test]
    fn test_attach_to_line() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::ZERO);
        let b = h.document.points.add(Point::new(100.0, 0.0));
        let line_id = h
            .document
            .add_shape(Shape::Line(LineShape::new(a, b, "default")));

        let mut tool = PointTool;
        h.down(&mut tool, 50.0, 2.0);

        assert_eq!(h.document.len(), 1);
        let Shape::Line(line) = &h.document.shapes[0] else {
            panic!("expected a line");
        };
        assert_eq!(line.points.len(), 1);
        assert_eq!(h.document.points.owner(line.points[0]), Some(line_id));
    }
}

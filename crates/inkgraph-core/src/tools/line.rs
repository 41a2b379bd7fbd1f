//! Line tool: two clicks, connecting both ends to existing points.

use kurbo::Point;

use super::{SegmentKind, ToolContext, ToolHandler};
use crate::graph::{LineShape, PointId, Shape, ShapeId};
use crate::input::Modifiers;
use crate::intersections::split_points;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum LineState {
    #[default]
    Start,
    End { id: ShapeId, end: PointId },
}

#[derive(Debug, Clone, Default)]
pub struct LineTool {
    state: LineState,
}

impl LineTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit the preview as consecutive segments split where it crosses
    /// document geometry. Falls back to a single segment.
    fn commit_split(ctx: &mut ToolContext<'_>, id: ShapeId) {
        let Some(Shape::Line(line)) = ctx.take_preview(id) else {
            return;
        };
        let splits = line
            .geometry(&ctx.document.points)
            .map(|g| split_points(ctx.document, g))
            .unwrap_or_default();
        if splits.is_empty() {
            ctx.commit(Shape::Line(line));
            return;
        }

        log::debug!("Splitting line at {} intersections", splits.len());
        let mut joints = vec![line.start];
        joints.extend(splits.iter().map(|i| ctx.new_point(i.point)));
        joints.push(line.end);
        for pair in joints.windows(2) {
            let segment = LineShape::new(pair[0], pair[1], line.meta.style.clone());
            ctx.commit(Shape::Line(segment));
        }
    }
}

impl ToolHandler for LineTool {
    fn left_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let position = ctx.snap(point);
        match self.state {
            LineState::Start => {
                let start = ctx.point_at(position);
                let shape = SegmentKind::Line.build(ctx, start, position);
                let end = shape.last_point().unwrap_or(start);
                let id = ctx.begin_preview(shape);
                self.state = LineState::End { id, end };
            }
            LineState::End { id, end } => {
                ctx.set_position(end, position);
                ctx.connect_preview(id, end);
                if ctx.settings.split_on_intersection {
                    Self::commit_split(ctx, id);
                    ctx.finish();
                } else {
                    ctx.commit_preview(id);
                }
                self.state = LineState::Start;
            }
        }
        true
    }

    fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let LineState::End { end, .. } = self.state else {
            return false;
        };
        let position = ctx.snap(point);
        ctx.set_position(end, position);
        true
    }

    fn clean(&mut self, ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        match std::mem::take(&mut self.state) {
            LineState::Start => false,
            LineState::End { id, .. } => {
                ctx.cancel_preview(id);
                true
            }
        }
    }

    fn is_active(&self) -> bool {
        self.state != LineState::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EditorSettings;
    use crate::tools::testing::Harness;

    fn endpoints(shape: &Shape) -> (PointId, PointId) {
        match shape {
            Shape::Line(l) => (l.start, l.end),
            _ => panic!("not a line"),
        }
    }

    #[test]
    fn test_draw_line() {
        let mut h = Harness::new();
        let mut tool = LineTool::new();

        h.down(&mut tool, 0.0, 0.0);
        assert!(h.captured);
        assert_eq!(h.working.len(), 1);
        h.drag(&mut tool, 50.0, 50.0);
        h.down(&mut tool, 100.0, 0.0);

        assert!(!h.captured);
        assert!(h.working.is_empty());
        assert_eq!(h.document.len(), 1);
        let (a, b) = endpoints(&h.document.shapes[0]);
        assert_eq!(h.position(a), Point::ZERO);
        assert_eq!(h.position(b), Point::new(100.0, 0.0));
        assert!(h.selection.is_empty());
    }

    #[test]
    fn test_connects_to_existing_endpoint() {
        let mut h = Harness::new();
        let mut tool = LineTool::new();
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 100.0, 0.0);
        h.down(&mut tool, 101.0, 1.0);
        h.down(&mut tool, 100.0, 100.0);

        assert_eq!(h.document.len(), 2);
        let (_, first_end) = endpoints(&h.document.shapes[0]);
        let (second_start, _) = endpoints(&h.document.shapes[1]);
        assert_eq!(first_end, second_start);
        assert_eq!(h.document.points.len(), 3);
    }

    #[test]
    fn test_end_connects_on_commit() {
        let mut h = Harness::new();
        let mut tool = LineTool::new();
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 100.0, 0.0);
        h.down(&mut tool, 0.0, 100.0);
        h.down(&mut tool, 99.0, 1.0);

        let (_, first_end) = endpoints(&h.document.shapes[0]);
        let (_, second_end) = endpoints(&h.document.shapes[1]);
        assert_eq!(first_end, second_end);
        // The replaced preview point was pruned
        assert_eq!(h.document.points.len(), 3);
    }

    #[test]
    fn test_cancel_leaves_nothing() {
        let mut h = Harness::new();
        let mut tool = LineTool::new();
        h.down(&mut tool, 0.0, 0.0);
        h.drag(&mut tool, 40.0, 0.0);
        assert!(h.right(&mut tool, 40.0, 0.0));

        assert!(h.working.is_empty());
        assert!(h.document.is_empty());
        assert!(h.document.points.is_empty());
        assert!(h.selection.is_empty());
        assert!(!h.captured);
        assert!(!tool.is_active());
    }

    #[test]
    fn test_split_on_intersection() {
        let mut h = Harness::with_settings(EditorSettings {
            split_on_intersection: true,
            ..EditorSettings::default()
        });
        let mut tool = LineTool::new();
        h.down(&mut tool, 50.0, -50.0);
        h.down(&mut tool, 50.0, 50.0);
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 100.0, 0.0);

        // The crossing line became two segments sharing the split point
        assert_eq!(h.document.len(), 3);
        let (_, joint) = endpoints(&h.document.shapes[1]);
        let (next_start, end) = endpoints(&h.document.shapes[2]);
        assert_eq!(joint, next_start);
        assert_eq!(h.position(joint), Point::new(50.0, 0.0));
        assert_eq!(h.position(end), Point::new(100.0, 0.0));
    }
}

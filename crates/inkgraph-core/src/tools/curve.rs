//! Curve tools: cubic, quadratic and conic segments placed click by click.
//!
//! The first click fixes the start, the second the end, and the remaining
//! clicks place the control points.

use kurbo::Point;

use super::{SegmentKind, ToolContext, ToolHandler};
use crate::graph::ShapeId;
use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum CurveState {
    #[default]
    Start,
    Placing { id: ShapeId, stage: usize },
}

#[derive(Debug, Clone)]
pub struct CurveTool {
    kind: SegmentKind,
    state: CurveState,
}

impl CurveTool {
    pub fn new(kind: SegmentKind) -> Self {
        Self {
            kind,
            state: CurveState::Start,
        }
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    fn track(&self, ctx: &mut ToolContext<'_>, id: ShapeId, stage: usize, position: Point) {
        let Some(points) = ctx.preview(id).map(|s| s.structural_points()) else {
            return;
        };
        self.kind.track(stage, &points, position, &mut ctx.document.points);
        ctx.invalidate();
    }
}

impl ToolHandler for CurveTool {
    fn left_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let position = ctx.snap(point);
        match self.state {
            CurveState::Start => {
                let start = ctx.point_at(position);
                let shape = self.kind.build(ctx, start, position);
                let id = ctx.begin_preview(shape);
                self.state = CurveState::Placing { id, stage: 0 };
            }
            CurveState::Placing { id, stage } => {
                self.track(ctx, id, stage, position);
                if stage == 0 {
                    let end = ctx.preview(id).and_then(|s| s.last_point());
                    if let Some(end) = end {
                        ctx.connect_preview(id, end);
                    }
                }
                if stage + 1 >= self.kind.stages() {
                    ctx.commit_preview(id);
                    self.state = CurveState::Start;
                } else {
                    self.state = CurveState::Placing { id, stage: stage + 1 };
                }
            }
        }
        true
    }

    fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let CurveState::Placing { id, stage } = self.state else {
            return false;
        };
        let position = ctx.snap(point);
        self.track(ctx, id, stage, position);
        true
    }

    fn clean(&mut self, ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        match std::mem::take(&mut self.state) {
            CurveState::Start => false,
            CurveState::Placing { id, .. } => {
                ctx.cancel_preview(id);
                true
            }
        }
    }

    fn is_active(&self) -> bool {
        self.state != CurveState::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Shape;
    use crate::tools::testing::Harness;

    #[test]
    fn test_cubic_click_order() {
        let mut h = Harness::new();
        let mut tool = CurveTool::new(SegmentKind::Cubic);
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 90.0, 0.0);
        assert!(tool.is_active());
        h.down(&mut tool, 30.0, 40.0);
        h.down(&mut tool, 60.0, 40.0);

        assert!(!tool.is_active());
        assert!(h.working.is_empty());
        let Shape::CubicBezier(c) = &h.document.shapes[0] else {
            panic!("expected a cubic");
        };
        assert_eq!(h.position(c.point1), Point::new(0.0, 0.0));
        assert_eq!(h.position(c.point2), Point::new(30.0, 40.0));
        assert_eq!(h.position(c.point3), Point::new(60.0, 40.0));
        assert_eq!(h.position(c.point4), Point::new(90.0, 0.0));
    }

    #[test]
    fn test_quadratic_preview_and_commit() {
        let mut h = Harness::new();
        let mut tool = CurveTool::new(SegmentKind::Quadratic);
        h.down(&mut tool, 0.0, 0.0);
        h.drag(&mut tool, 100.0, 0.0);
        let Shape::QuadraticBezier(q) = &h.working[0] else {
            panic!("expected a quadratic preview");
        };
        assert_eq!(h.position(q.point2), Point::new(50.0, 0.0));

        h.down(&mut tool, 100.0, 0.0);
        h.down(&mut tool, 50.0, 50.0);
        let Shape::QuadraticBezier(q) = &h.document.shapes[0] else {
            panic!("expected a quadratic");
        };
        assert_eq!(h.position(q.point2), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_conic_keeps_weight() {
        let mut h = Harness::new();
        let mut tool = CurveTool::new(SegmentKind::Conic(0.5));
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 100.0, 0.0);
        h.down(&mut tool, 50.0, 50.0);
        let Shape::Conic(c) = &h.document.shapes[0] else {
            panic!("expected a conic");
        };
        assert!((c.weight - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cancel_mid_curve() {
        let mut h = Harness::new();
        let mut tool = CurveTool::new(SegmentKind::Cubic);
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 90.0, 0.0);
        h.right(&mut tool, 30.0, 40.0);

        assert!(h.document.is_empty());
        assert!(h.working.is_empty());
        assert!(h.document.points.is_empty());
        assert!(!h.captured);
    }
}

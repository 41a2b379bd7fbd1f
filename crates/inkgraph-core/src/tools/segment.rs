//! Segment construction shared by the line, curve, polyline and path tools.
//!
//! A segment starts at a given point and has its remaining points placed in
//! stages: stage 0 places the end point, later stages place control points.

use kurbo::Point;

use super::ToolContext;
use crate::graph::{
    ConicShape, CubicBezierShape, LineShape, PointArena, PointId, QuadraticBezierShape, Shape,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentKind {
    Line,
    Cubic,
    Quadratic,
    /// Rational quadratic with the given middle weight.
    Conic(f64),
}

impl SegmentKind {
    /// Number of clicks needed after the start point.
    pub fn stages(self) -> usize {
        match self {
            SegmentKind::Line => 1,
            SegmentKind::Cubic => 3,
            SegmentKind::Quadratic | SegmentKind::Conic(_) => 2,
        }
    }

    /// New segment from `start` with every other point at `at`.
    pub fn build(self, ctx: &mut ToolContext<'_>, start: PointId, at: Point) -> Shape {
        let style = ctx.style.to_string();
        match self {
            SegmentKind::Line => {
                let end = ctx.new_point(at);
                Shape::Line(LineShape::new(start, end, style))
            }
            SegmentKind::Cubic => {
                let p2 = ctx.new_point(at);
                let p3 = ctx.new_point(at);
                let p4 = ctx.new_point(at);
                Shape::CubicBezier(CubicBezierShape::new(start, p2, p3, p4, style))
            }
            SegmentKind::Quadratic => {
                let p2 = ctx.new_point(at);
                let p3 = ctx.new_point(at);
                Shape::QuadraticBezier(QuadraticBezierShape::new(start, p2, p3, style))
            }
            SegmentKind::Conic(weight) => {
                let p2 = ctx.new_point(at);
                let p3 = ctx.new_point(at);
                Shape::Conic(ConicShape::new(start, p2, p3, weight, style))
            }
        }
    }

    /// Follow the pointer with the points placed at `stage`.
    ///
    /// `points` are the segment's structural points in role order.
    pub fn track(self, stage: usize, points: &[PointId], position: Point, arena: &mut PointArena) {
        match (self, stage, points) {
            (SegmentKind::Line, 0, [_, end]) => {
                arena.set_position(*end, position);
            }
            // End drags the second control along so the curve stays straight
            (SegmentKind::Cubic, 0, [_, _, p3, p4]) => {
                arena.set_position(*p4, position);
                arena.set_position(*p3, position);
            }
            (SegmentKind::Cubic, 1, [_, p2, _, _]) => {
                arena.set_position(*p2, position);
            }
            (SegmentKind::Cubic, 2, [_, _, p3, _]) => {
                arena.set_position(*p3, position);
            }
            (SegmentKind::Quadratic | SegmentKind::Conic(_), 0, [p1, p2, p3]) => {
                arena.set_position(*p3, position);
                if let Some(start) = arena.position(*p1) {
                    arena.set_position(*p2, start.midpoint(position));
                }
            }
            (SegmentKind::Quadratic | SegmentKind::Conic(_), 1, [_, p2, _]) => {
                arena.set_position(*p2, position);
            }
            _ => log::warn!("No point to track for {self:?} at stage {stage}"),
        }
    }
}

//! Guide tool: two-point construction lines used by line snapping.

use kurbo::Point;

use super::{SegmentKind, ToolContext, ToolHandler};
use crate::graph::{PointId, Shape, ShapeId};
use crate::input::Modifiers;
use crate::style::GUIDE_STYLE;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum GuideState {
    #[default]
    Start,
    End { id: ShapeId, end: PointId },
}

#[derive(Debug, Clone, Default)]
pub struct GuideTool {
    state: GuideState,
}

impl GuideTool {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToolHandler for GuideTool {
    fn left_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let position = ctx.snap(point);
        match self.state {
            GuideState::Start => {
                let start = ctx.new_point(position);
                let mut shape = SegmentKind::Line.build(ctx, start, position);
                shape.set_style(GUIDE_STYLE);
                let end = shape.last_point().unwrap_or(start);
                let id = ctx.begin_preview(shape);
                self.state = GuideState::End { id, end };
            }
            GuideState::End { id, end } => {
                ctx.set_position(end, position);
                if let Some(Shape::Line(guide)) = ctx.take_preview(id) {
                    let guide_id = ctx.document.add_guide(guide);
                    log::debug!("Added guide {guide_id}");
                }
                ctx.finish();
                self.state = GuideState::Start;
            }
        }
        true
    }

    fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let GuideState::End { end, .. } = self.state else {
            return false;
        };
        let position = ctx.snap(point);
        ctx.set_position(end, position);
        true
    }

    fn clean(&mut self, ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        match std::mem::take(&mut self.state) {
            GuideState::Start => false,
            GuideState::End { id, .. } => {
                ctx.cancel_preview(id);
                true
            }
        }
    }

    fn is_active(&self) -> bool {
        self.state != GuideState::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Harness;

    #[test]
    fn test_guide_goes_to_guides() {
        let mut h = Harness::new();
        let mut tool = GuideTool::new();
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 0.0, 200.0);

        assert!(h.document.is_empty());
        assert_eq!(h.document.guides.len(), 1);
        assert_eq!(h.document.guides[0].meta.style, GUIDE_STYLE);
        // Guide points survive pruning
        assert_eq!(h.document.points.len(), 2);
        assert!(!h.captured);
    }
}

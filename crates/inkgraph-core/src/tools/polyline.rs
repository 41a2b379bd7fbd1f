//! Polyline tool: a chain of lines sharing their joints.

use kurbo::Point;

use super::{SegmentKind, ToolContext, ToolHandler};
use crate::graph::{PointId, ShapeId};
use crate::input::Modifiers;

#[derive(Debug, Clone, Default)]
enum PolyLineState {
    #[default]
    Start,
    Drawing {
        /// Finished segments, still in the working container.
        done: Vec<ShapeId>,
        current: ShapeId,
        end: PointId,
    },
}

/// Each click ends the current segment and starts the next one at its end.
/// Right click or clean commits the finished segments.
#[derive(Debug, Clone, Default)]
pub struct PolyLineTool {
    state: PolyLineState,
}

impl PolyLineTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_segment(ctx: &mut ToolContext<'_>, start: PointId, position: Point) -> (ShapeId, PointId) {
        let shape = SegmentKind::Line.build(ctx, start, position);
        let end = shape.last_point().unwrap_or(start);
        (ctx.begin_preview(shape), end)
    }
}

impl ToolHandler for PolyLineTool {
    fn left_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let position = ctx.snap(point);
        match &mut self.state {
            PolyLineState::Start => {
                let start = ctx.point_at(position);
                let (current, end) = Self::start_segment(ctx, start, position);
                self.state = PolyLineState::Drawing {
                    done: Vec::new(),
                    current,
                    end,
                };
            }
            PolyLineState::Drawing { done, current, end } => {
                ctx.set_position(*end, position);
                ctx.connect_preview(*current, *end);
                let joint = ctx
                    .preview(*current)
                    .and_then(|s| s.last_point())
                    .unwrap_or(*end);
                done.push(*current);
                let (next, next_end) = Self::start_segment(ctx, joint, position);
                *current = next;
                *end = next_end;
            }
        }
        true
    }

    fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let PolyLineState::Drawing { end, .. } = self.state else {
            return false;
        };
        let position = ctx.snap(point);
        ctx.set_position(end, position);
        true
    }

    fn clean(&mut self, ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        let PolyLineState::Drawing { done, current, .. } = std::mem::take(&mut self.state) else {
            return false;
        };
        ctx.take_preview(current);
        for id in &done {
            if let Some(segment) = ctx.take_preview(*id) {
                ctx.commit(segment);
            }
        }
        log::debug!("Polyline finished with {} segments", done.len());
        ctx.finish();
        true
    }

    fn is_active(&self) -> bool {
        matches!(self.state, PolyLineState::Drawing { .. })
    }
}

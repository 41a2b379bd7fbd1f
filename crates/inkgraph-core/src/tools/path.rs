//! Path tool: builds a path figure by figure through a delegated segment tool.
//!
//! The path lives in the working container while it is drawn. Each new
//! segment is primed explicitly with the point it starts from: the end of
//! the path so far, or the figure start placed by the Move sub-tool.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use super::{SegmentKind, ToolContext, ToolHandler};
use crate::geometry::distance;
use crate::graph::{Figure, GraphError, GraphResult, PathShape, PointId, Shape, ShapeId};
use crate::input::Modifiers;

/// Segment tool the path tool delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PathSubTool {
    #[default]
    Line,
    CubicBezier,
    QuadraticBezier,
    /// Start a new figure at the clicked point.
    Move,
}

impl PathSubTool {
    fn segment_kind(self) -> Option<SegmentKind> {
        match self {
            PathSubTool::Line => Some(SegmentKind::Line),
            PathSubTool::CubicBezier => Some(SegmentKind::Cubic),
            PathSubTool::QuadraticBezier => Some(SegmentKind::Quadratic),
            PathSubTool::Move => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    id: ShapeId,
    sub_tool: PathSubTool,
    stage: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum PathState {
    #[default]
    Idle,
    Drawing {
        path: ShapeId,
        segment: Option<Segment>,
        figure_start: Option<PointId>,
    },
}

#[derive(Debug, Clone)]
pub struct PathTool {
    sub_tool: PathSubTool,
    state: PathState,
}

fn path_ref<'c>(ctx: &'c ToolContext<'_>, id: ShapeId) -> GraphResult<&'c PathShape> {
    match ctx.preview(id) {
        Some(Shape::Path(path)) => Ok(path),
        _ => Err(GraphError::ShapeNotFound(id)),
    }
}

fn path_mut<'c>(ctx: &'c mut ToolContext<'_>, id: ShapeId) -> GraphResult<&'c mut PathShape> {
    match ctx.preview_mut(id) {
        Some(Shape::Path(path)) => Ok(path),
        _ => Err(GraphError::ShapeNotFound(id)),
    }
}

impl PathTool {
    pub fn new(sub_tool: PathSubTool) -> Self {
        Self {
            sub_tool,
            state: PathState::Idle,
        }
    }

    pub fn sub_tool(&self) -> PathSubTool {
        self.sub_tool
    }

    pub fn set_sub_tool(&mut self, sub_tool: PathSubTool) {
        self.sub_tool = sub_tool;
    }

    fn begin_path(ctx: &mut ToolContext<'_>) -> ShapeId {
        let mut path = PathShape::new(ctx.style);
        path.figures.push(Figure::new(false, false));
        ctx.begin_preview(Shape::Path(path))
    }

    fn segment_points(ctx: &ToolContext<'_>, path: ShapeId, segment: ShapeId) -> Vec<PointId> {
        ctx.preview(path)
            .and_then(|p| p.find(segment))
            .map(Shape::structural_points)
            .unwrap_or_default()
    }

    /// Append a segment starting at `prime` to the current figure.
    fn begin_segment(
        &self,
        ctx: &mut ToolContext<'_>,
        path: ShapeId,
        kind: SegmentKind,
        prime: PointId,
        position: Point,
    ) -> GraphResult<Segment> {
        let mut shape = kind.build(ctx, prime, position);
        shape.set_owner(Some(path));
        for point in shape.points() {
            ctx.selection.select_transient(point);
        }
        let id = shape.id();
        let target = path_mut(ctx, path)?;
        match target.figures.last_mut() {
            Some(figure) => figure.shapes.push(shape),
            None => {
                let mut figure = Figure::new(false, false);
                figure.shapes.push(shape);
                target.figures.push(figure);
            }
        }
        ctx.invalidate();
        Ok(Segment {
            id,
            sub_tool: self.sub_tool,
            stage: 0,
        })
    }

    /// Remove the in-progress segment. Returns its start if the figure is
    /// left empty, so the next segment can start from it again.
    fn drop_segment(ctx: &mut ToolContext<'_>, path: ShapeId, segment: Segment) -> Option<PointId> {
        let points = Self::segment_points(ctx, path, segment.id);
        for point in points.iter().skip(1) {
            ctx.selection.release_transient(*point);
        }
        let figure = path_mut(ctx, path).ok()?.figures.last_mut()?;
        figure.shapes.retain(|s| s.id() != segment.id);
        ctx.invalidate();
        let figure_empty = path_ref(ctx, path)
            .ok()
            .and_then(|p| p.figures.last())
            .is_some_and(Figure::is_empty);
        if figure_empty { points.first().copied() } else { None }
    }

    /// A sub-tool switch abandons the segment drawn with the old one.
    fn drop_stale_segment(&mut self, ctx: &mut ToolContext<'_>) {
        let PathState::Drawing { path, segment: Some(segment), figure_start } = self.state else {
            return;
        };
        if segment.sub_tool == self.sub_tool {
            return;
        }
        log::debug!("Dropping {:?} segment after sub-tool switch", segment.sub_tool);
        let restart = Self::drop_segment(ctx, path, segment);
        self.state = PathState::Drawing {
            path,
            segment: None,
            figure_start: restart.or(figure_start),
        };
    }

    fn track(ctx: &mut ToolContext<'_>, path: ShapeId, segment: Segment, kind: SegmentKind, position: Point) {
        let points = Self::segment_points(ctx, path, segment.id);
        kind.track(segment.stage, &points, position, &mut ctx.document.points);
        ctx.invalidate();
    }

    /// Close the current figure when `end` lands on its first point.
    fn try_close(ctx: &mut ToolContext<'_>, path: ShapeId, end: PointId) -> bool {
        let Ok(shape) = path_ref(ctx, path) else {
            return false;
        };
        let Some(figure) = shape.figures.last() else {
            return false;
        };
        if figure.shapes.len() < 2 {
            return false;
        }
        let Some(first) = figure.first_point() else {
            return false;
        };
        let close = match (ctx.position(first), ctx.position(end)) {
            (Some(a), Some(b)) => distance(a, b) <= ctx.hit.radius,
            _ => false,
        };
        if !close || !ctx.preview_mut(path).is_some_and(|s| s.connect(first, end)) {
            return false;
        }
        if let Ok(Some(figure)) = path_mut(ctx, path).map(|p| p.figures.last_mut()) {
            figure.is_closed = true;
        }
        ctx.selection.release_transient(end);
        log::debug!("Closed figure at {first:?}");
        true
    }

    /// Place the point of the current stage. Returns the segment still in
    /// progress, if any.
    fn advance(
        &self,
        ctx: &mut ToolContext<'_>,
        path: ShapeId,
        mut segment: Segment,
        kind: SegmentKind,
        position: Point,
    ) -> GraphResult<Option<Segment>> {
        Self::track(ctx, path, segment, kind, position);
        let mut closed = false;
        if segment.stage == 0 {
            if let Some(end) = Self::segment_points(ctx, path, segment.id).last().copied() {
                closed = Self::try_close(ctx, path, end);
                if !closed {
                    ctx.connect_preview(path, end);
                }
            }
        }
        if segment.stage + 1 < kind.stages() {
            segment.stage += 1;
            return Ok(Some(segment));
        }
        if closed || path_ref(ctx, path)?.figures.last().is_some_and(|f| f.is_closed) {
            return Ok(None);
        }
        let prime = path_ref(ctx, path)?.last_point()?;
        self.begin_segment(ctx, path, kind, prime, position).map(Some)
    }

    fn press(&mut self, ctx: &mut ToolContext<'_>, position: Point) -> GraphResult<()> {
        self.drop_stale_segment(ctx);
        let (path, segment, figure_start) = match self.state {
            PathState::Idle => (Self::begin_path(ctx), None, None),
            PathState::Drawing {
                path,
                segment,
                figure_start,
            } => (path, segment, figure_start),
        };

        let (segment, figure_start) = match (self.sub_tool.segment_kind(), segment) {
            (None, _) => {
                let target = path_mut(ctx, path)?;
                if target.figures.last().is_none_or(|f| !f.is_empty()) {
                    target.figures.push(Figure::new(false, false));
                }
                (None, Some(ctx.point_at(position)))
            }
            (Some(kind), Some(segment)) => (self.advance(ctx, path, segment, kind, position)?, None),
            (Some(kind), None) => {
                let current = path_ref(ctx, path)?.figures.last().cloned();
                let open_figure = current.as_ref().is_some_and(|f| !f.is_empty() && !f.is_closed);
                let prime = match figure_start {
                    Some(start) => Some(start),
                    None if open_figure => Some(path_ref(ctx, path)?.last_point()?),
                    None => None,
                };
                match prime {
                    Some(prime) => {
                        let segment = self.begin_segment(ctx, path, kind, prime, position)?;
                        (self.advance(ctx, path, segment, kind, position)?, None)
                    }
                    None => {
                        if current.is_some_and(|f| !f.is_empty()) {
                            path_mut(ctx, path)?.figures.push(Figure::new(false, false));
                        }
                        let start = ctx.point_at(position);
                        (Some(self.begin_segment(ctx, path, kind, start, position)?), None)
                    }
                }
            }
        };

        self.state = PathState::Drawing {
            path,
            segment,
            figure_start,
        };
        Ok(())
    }

    /// Drop the in-progress segment, then commit the path if any figure
    /// survives validation.
    fn complete(&mut self, ctx: &mut ToolContext<'_>) -> bool {
        let PathState::Drawing { path, segment, .. } = std::mem::take(&mut self.state) else {
            return false;
        };
        if let Some(segment) = segment {
            Self::drop_segment(ctx, path, segment);
        }
        let keep = path_mut(ctx, path).is_ok_and(|p| p.validate());
        if keep {
            ctx.commit_preview(path);
        } else {
            log::debug!("Discarding path without segments");
            ctx.cancel_preview(path);
        }
        true
    }
}

impl ToolHandler for PathTool {
    fn left_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let position = ctx.snap(point);
        if let Err(err) = self.press(ctx, position) {
            log::error!("Path tool aborted: {err}");
            if let PathState::Drawing { path, .. } = std::mem::take(&mut self.state) {
                ctx.cancel_preview(path);
            }
        }
        true
    }

    fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        self.drop_stale_segment(ctx);
        let PathState::Drawing { path, segment: Some(segment), .. } = self.state else {
            return false;
        };
        let Some(kind) = segment.sub_tool.segment_kind() else {
            return false;
        };
        let position = ctx.snap(point);
        Self::track(ctx, path, segment, kind, position);
        true
    }

    fn clean(&mut self, ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        self.complete(ctx)
    }

    fn is_active(&self) -> bool {
        self.state != PathState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Harness;

    fn committed_path(h: &Harness) -> &PathShape {
        match h.document.shapes.last() {
            Some(Shape::Path(p)) => p,
            _ => panic!("expected a path"),
        }
    }

    #[test]
    fn test_line_segments_share_points() {
        let mut h = Harness::new();
        let mut tool = PathTool::new(PathSubTool::Line);
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 50.0, 0.0);
        h.down(&mut tool, 50.0, 50.0);
        h.drag(&mut tool, 80.0, 80.0);
        assert!(h.right(&mut tool, 80.0, 80.0));

        assert!(h.working.is_empty());
        assert!(!h.captured);
        let path = committed_path(&h);
        assert_eq!(path.figures.len(), 1);
        assert_eq!(path.figures[0].shapes.len(), 2);
        let joints: Vec<_> = path.figures[0].shapes.iter().map(|s| (s.first_point(), s.last_point())).collect();
        assert_eq!(joints[0].1, joints[1].0);
        assert_eq!(h.document.points.len(), 3);
    }

    #[test]
    fn test_single_click_discards_path() {
        let mut h = Harness::new();
        let mut tool = PathTool::new(PathSubTool::Line);
        h.down(&mut tool, 0.0, 0.0);
        h.right(&mut tool, 10.0, 0.0);

        assert!(h.document.is_empty());
        assert!(h.working.is_empty());
        assert!(h.document.points.is_empty());
        assert!(!tool.is_active());
    }

    #[test]
    fn test_move_starts_new_figure() {
        let mut h = Harness::new();
        let mut tool = PathTool::new(PathSubTool::Line);
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 10.0, 0.0);

        tool.set_sub_tool(PathSubTool::Move);
        h.down(&mut tool, 0.0, 50.0);
        tool.set_sub_tool(PathSubTool::Line);
        h.down(&mut tool, 10.0, 50.0);
        h.right(&mut tool, 10.0, 50.0);

        let path = committed_path(&h);
        assert_eq!(path.figures.len(), 2);
        let second = &path.figures[1].shapes[0];
        assert_eq!(h.position(second.first_point().unwrap()), Point::new(0.0, 50.0));
        assert_eq!(h.position(second.last_point().unwrap()), Point::new(10.0, 50.0));
    }

    #[test]
    fn test_closing_click_closes_figure() {
        let mut h = Harness::new();
        let mut tool = PathTool::new(PathSubTool::Line);
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 100.0, 0.0);
        h.down(&mut tool, 100.0, 100.0);
        h.down(&mut tool, 1.0, 1.0);
        h.right(&mut tool, 1.0, 1.0);

        let path = committed_path(&h);
        assert_eq!(path.figures.len(), 1);
        let figure = &path.figures[0];
        assert!(figure.is_closed);
        assert_eq!(figure.shapes.len(), 3);
        assert_eq!(figure.first_point(), figure.last_point());
        assert_eq!(h.document.points.len(), 3);
    }

    #[test]
    fn test_cubic_sub_tool() {
        let mut h = Harness::new();
        let mut tool = PathTool::new(PathSubTool::CubicBezier);
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 90.0, 0.0);
        h.down(&mut tool, 30.0, 30.0);
        h.down(&mut tool, 60.0, 30.0);
        h.right(&mut tool, 60.0, 30.0);

        let path = committed_path(&h);
        assert_eq!(path.figures[0].shapes.len(), 1);
        assert!(matches!(path.figures[0].shapes[0], Shape::CubicBezier(_)));
    }

    #[test]
    fn test_sub_tool_switch_drops_segment() {
        let mut h = Harness::new();
        let mut tool = PathTool::new(PathSubTool::CubicBezier);
        h.down(&mut tool, 0.0, 0.0);
        h.down(&mut tool, 90.0, 0.0);
        tool.set_sub_tool(PathSubTool::Line);
        h.down(&mut tool, 40.0, 40.0);
        h.right(&mut tool, 40.0, 40.0);

        // The unfinished cubic is gone; the line starts where the cubic did
        let path = committed_path(&h);
        assert_eq!(path.figures[0].shapes.len(), 1);
        let line = &path.figures[0].shapes[0];
        assert!(matches!(line, Shape::Line(_)));
        assert_eq!(h.position(line.first_point().unwrap()), Point::ZERO);
        assert_eq!(h.position(line.last_point().unwrap()), Point::new(40.0, 40.0));
    }
}

//! Line segment between two shared points.

use super::{Connectable, PointArena, PointId, ShapeMeta, ShapeTrait, Structural};
use crate::geometry::{point_to_segment_dist, rect_from_points};
use crate::style::StyleId;
use kurbo::{BezPath, Line as KurboLine, Rect};
use serde::{Deserialize, Serialize};

/// A straight segment. Also used for guides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineShape {
    pub meta: ShapeMeta,
    /// Start point.
    pub start: PointId,
    /// End point.
    pub end: PointId,
    /// Free attachment points.
    #[serde(default)]
    pub points: Vec<PointId>,
}

impl LineShape {
    /// Create a new line.
    pub fn new(start: PointId, end: PointId, style: impl Into<StyleId>) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            start,
            end,
            points: Vec::new(),
        }
    }

    /// Get as a kurbo Line, `None` if an endpoint is stale.
    pub fn geometry(&self, arena: &PointArena) -> Option<KurboLine> {
        Some(KurboLine::new(arena.position(self.start)?, arena.position(self.end)?))
    }

    /// Get the length of the line.
    pub fn length(&self, arena: &PointArena) -> Option<f64> {
        self.geometry(arena).map(|l| l.length())
    }

    pub fn bounds(&self, arena: &PointArena) -> Option<Rect> {
        self.geometry(arena).map(|l| rect_from_points(l.p0, l.p1))
    }

    pub fn hit_test(&self, arena: &PointArena, point: kurbo::Point, tolerance: f64) -> bool {
        self.geometry(arena)
            .is_some_and(|l| point_to_segment_dist(point, l.p0, l.p1) <= tolerance)
    }

    pub fn to_path(&self, arena: &PointArena) -> BezPath {
        let mut path = BezPath::new();
        if let Some(line) = self.geometry(arena) {
            path.move_to(line.p0);
            path.line_to(line.p1);
        }
        path
    }
}

impl ShapeTrait for LineShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

impl Structural for LineShape {
    fn structural(&self) -> Vec<PointId> {
        vec![self.start, self.end]
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        vec![&mut self.start, &mut self.end]
    }
}

impl Connectable for LineShape {
    fn extra_points(&self) -> &[PointId] {
        &self.points
    }

    fn extra_points_mut(&mut self) -> &mut Vec<PointId> {
        &mut self.points
    }
}

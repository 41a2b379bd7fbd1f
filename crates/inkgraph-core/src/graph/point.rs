//! Free-standing point shape.

use super::{PointArena, PointId, ShapeMeta, ShapeTrait, Structural};
use crate::geometry::distance;
use crate::style::StyleId;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// A single point placed on the canvas as a shape of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointShape {
    pub meta: ShapeMeta,
    pub point: PointId,
}

impl PointShape {
    pub fn new(point: PointId, style: impl Into<StyleId>) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            point,
        }
    }

    pub fn bounds(&self, arena: &PointArena) -> Option<Rect> {
        arena.position(self.point).map(|p| Rect::from_points(p, p))
    }

    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        arena
            .position(self.point)
            .is_some_and(|p| distance(p, point) <= tolerance)
    }

    pub fn to_path(&self, _arena: &PointArena) -> BezPath {
        BezPath::new()
    }
}

impl ShapeTrait for PointShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

impl Structural for PointShape {
    fn structural(&self) -> Vec<PointId> {
        vec![self.point]
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        vec![&mut self.point]
    }
}

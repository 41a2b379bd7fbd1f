//! Group shape - a container for multiple shapes.

use super::{Connectable, PointArena, PointId, Shape, ShapeMeta, ShapeTrait, Structural};
use crate::geometry::distance;
use crate::style::StyleId;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// A group of shapes plus free connector points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupShape {
    pub meta: ShapeMeta,
    /// Child shapes, in z-order.
    pub shapes: Vec<Shape>,
    /// Connector points attached to the group itself.
    #[serde(default)]
    pub points: Vec<PointId>,
}

impl GroupShape {
    /// Create a group that adopts `shapes` as its children.
    pub fn new(mut shapes: Vec<Shape>, style: impl Into<StyleId>) -> Self {
        let meta = ShapeMeta::new(style);
        for child in &mut shapes {
            child.set_owner(Some(meta.id));
        }
        Self {
            meta,
            shapes,
            points: Vec::new(),
        }
    }

    /// Consume the group, returning its children without an owner.
    pub fn into_children(self) -> Vec<Shape> {
        let mut shapes = self.shapes;
        for child in &mut shapes {
            child.set_owner(None);
        }
        shapes
    }

    pub fn bounds(&self, arena: &PointArena) -> Option<Rect> {
        let children = self.shapes.iter().filter_map(|s| s.bounds(arena));
        let connectors = self
            .points
            .iter()
            .filter_map(|p| arena.position(*p))
            .map(|p| Rect::from_points(p, p));
        children.chain(connectors).reduce(|a, b| a.union(b))
    }

    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        self.shapes.iter().any(|s| s.hit_test(arena, point, tolerance))
            || self
                .points
                .iter()
                .filter_map(|p| arena.position(*p))
                .any(|p| distance(p, point) <= tolerance)
    }

    pub fn to_path(&self, arena: &PointArena) -> BezPath {
        let mut path = BezPath::new();
        for child in &self.shapes {
            path.extend(child.to_path(arena).elements().iter().copied());
        }
        path
    }
}

impl ShapeTrait for GroupShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

// Groups have no geometry of their own; children carry it.
impl Structural for GroupShape {
    fn structural(&self) -> Vec<PointId> {
        Vec::new()
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        Vec::new()
    }
}

impl Connectable for GroupShape {
    fn extra_points(&self) -> &[PointId] {
        &self.points
    }

    fn extra_points_mut(&mut self) -> &mut Vec<PointId> {
        &mut self.points
    }
}

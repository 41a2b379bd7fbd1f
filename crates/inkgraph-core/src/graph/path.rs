//! Composite paths made of figures.

use super::{GraphError, PointArena, PointId, Shape, ShapeMeta, ShapeTrait};
use crate::style::StyleId;
use kurbo::{BezPath, Point, Rect, Shape as _};
use serde::{Deserialize, Serialize};

/// Fill rule for path interiors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FillRule {
    EvenOdd,
    #[default]
    NonZero,
}

/// An open or closed sub-path: an ordered list of segment shapes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Figure {
    pub shapes: Vec<Shape>,
    pub is_closed: bool,
    pub is_filled: bool,
}

impl Figure {
    pub fn new(is_closed: bool, is_filled: bool) -> Self {
        Self {
            shapes: Vec::new(),
            is_closed,
            is_filled,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Start point of the first segment.
    pub fn first_point(&self) -> Option<PointId> {
        self.shapes.iter().find_map(Shape::first_point)
    }

    /// End point of the last segment.
    pub fn last_point(&self) -> Option<PointId> {
        self.shapes.iter().rev().find_map(Shape::last_point)
    }

    /// Append this figure's outline to `path`.
    pub fn append_to(&self, arena: &PointArena, path: &mut BezPath) {
        let mut started = false;
        for shape in &self.shapes {
            if !started {
                let Some(start) = shape.first_point().and_then(|p| arena.position(p)) else {
                    continue;
                };
                path.move_to(start);
                started = true;
            }
            match shape {
                Shape::Line(s) => {
                    if let Some(line) = s.geometry(arena) {
                        path.line_to(line.p1);
                    }
                }
                Shape::CubicBezier(s) => {
                    if let Some(c) = s.geometry(arena) {
                        path.curve_to(c.p1, c.p2, c.p3);
                    }
                }
                Shape::QuadraticBezier(s) => {
                    if let Some(q) = s.geometry(arena) {
                        path.quad_to(q.p1, q.p2);
                    }
                }
                Shape::Conic(s) => {
                    for p in s.samples(arena).unwrap_or_default().into_iter().skip(1) {
                        path.line_to(p);
                    }
                }
                _ => {}
            }
        }
        if started && self.is_closed {
            path.close_path();
        }
    }
}

/// A path: ordered figures plus a fill rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathShape {
    pub meta: ShapeMeta,
    pub figures: Vec<Figure>,
    #[serde(default)]
    pub fill_rule: FillRule,
}

impl PathShape {
    pub fn new(style: impl Into<StyleId>) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            figures: Vec::new(),
            fill_rule: FillRule::default(),
        }
    }

    /// End point of the last segment of the path.
    ///
    /// Asking an empty path for its last point is a logic error in the
    /// caller, reported as [`GraphError::EmptyPath`].
    pub fn last_point(&self) -> Result<PointId, GraphError> {
        self.figures
            .iter()
            .rev()
            .find_map(Figure::last_point)
            .ok_or(GraphError::EmptyPath)
    }

    /// Drop empty figures. Returns whether the path still has any.
    pub fn validate(&mut self) -> bool {
        let before = self.figures.len();
        self.figures.retain(|f| !f.is_empty());
        if self.figures.len() != before {
            self.invalidate();
        }
        !self.figures.is_empty()
    }

    pub fn to_path(&self, arena: &PointArena) -> BezPath {
        let mut path = BezPath::new();
        for figure in &self.figures {
            figure.append_to(arena, &mut path);
        }
        path
    }

    pub fn bounds(&self, arena: &PointArena) -> Option<Rect> {
        let path = self.to_path(arena);
        if path.elements().is_empty() {
            return None;
        }
        Some(path.bounding_box())
    }

    /// Filled interior by fill rule, or closeness to any segment.
    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        if self.figures.iter().any(|f| f.is_filled) {
            let winding = self.to_path(arena).winding(point);
            let inside = match self.fill_rule {
                FillRule::NonZero => winding != 0,
                FillRule::EvenOdd => winding % 2 != 0,
            };
            if inside {
                return true;
            }
        }
        self.figures
            .iter()
            .flat_map(|f| f.shapes.iter())
            .any(|s| s.hit_test(arena, point, tolerance))
    }
}

impl ShapeTrait for PathShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

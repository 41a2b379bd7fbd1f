//! Shapes spanned by two corner points: rectangles, ellipses, text and images.

use super::{Connectable, PointArena, PointId, ShapeMeta, ShapeTrait, Structural};
use crate::geometry::{rect_contains, rect_from_points};
use crate::style::StyleId;
use kurbo::{BezPath, Ellipse, Point, Rect, Shape as _};

/// Flattening tolerance for ellipse outlines.
const PATH_TOLERANCE: f64 = 0.1;

fn corners(arena: &PointArena, top_left: PointId, bottom_right: PointId) -> Option<Rect> {
    Some(rect_from_points(
        arena.position(top_left)?,
        arena.position(bottom_right)?,
    ))
}

/// Geometry shared by rectangles and ellipses.
///
/// The corners are kept as drawn; [`rect`](Self::rect) normalizes them.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct BoxShape {
    pub meta: ShapeMeta,
    pub top_left: PointId,
    pub bottom_right: PointId,
    #[serde(default)]
    pub points: Vec<PointId>,
}

impl BoxShape {
    pub fn new(top_left: PointId, bottom_right: PointId, style: impl Into<StyleId>) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            top_left,
            bottom_right,
            points: Vec::new(),
        }
    }

    /// Normalized bounding rectangle.
    pub fn rect(&self, arena: &PointArena) -> Option<Rect> {
        corners(arena, self.top_left, self.bottom_right)
    }

    /// Rectangle containment, grown by `tolerance`.
    pub fn hit_rectangle(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        self.rect(arena)
            .is_some_and(|r| rect_contains(r.inflate(tolerance, tolerance), point))
    }

    /// Ellipse equation on radii grown by `tolerance`.
    pub fn hit_ellipse(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        let Some(rect) = self.rect(arena) else {
            return false;
        };
        let center = rect.center();
        let rx = rect.width() / 2.0 + tolerance;
        let ry = rect.height() / 2.0 + tolerance;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let dx = (point.x - center.x) / rx;
        let dy = (point.y - center.y) / ry;
        dx * dx + dy * dy <= 1.0
    }

    pub fn rectangle_path(&self, arena: &PointArena) -> BezPath {
        self.rect(arena)
            .map(|r| r.to_path(PATH_TOLERANCE))
            .unwrap_or_default()
    }

    pub fn ellipse_path(&self, arena: &PointArena) -> BezPath {
        self.rect(arena)
            .map(|r| Ellipse::from_rect(r).to_path(PATH_TOLERANCE))
            .unwrap_or_default()
    }
}

/// A text block laid out inside two corners.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TextShape {
    pub meta: ShapeMeta,
    pub top_left: PointId,
    pub bottom_right: PointId,
    pub text: String,
    #[serde(default)]
    pub points: Vec<PointId>,
}

impl TextShape {
    pub fn new(
        top_left: PointId,
        bottom_right: PointId,
        text: impl Into<String>,
        style: impl Into<StyleId>,
    ) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            top_left,
            bottom_right,
            text: text.into(),
            points: Vec::new(),
        }
    }

    pub fn rect(&self, arena: &PointArena) -> Option<Rect> {
        corners(arena, self.top_left, self.bottom_right)
    }

    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        self.rect(arena)
            .is_some_and(|r| rect_contains(r.inflate(tolerance, tolerance), point))
    }
}

/// An image stretched between two corners, referenced by resource key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ImageShape {
    pub meta: ShapeMeta,
    pub top_left: PointId,
    pub bottom_right: PointId,
    /// Resource key resolved by the renderer (typically a file path).
    pub key: String,
    #[serde(default)]
    pub points: Vec<PointId>,
}

impl ImageShape {
    pub fn new(
        top_left: PointId,
        bottom_right: PointId,
        key: impl Into<String>,
        style: impl Into<StyleId>,
    ) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            top_left,
            bottom_right,
            key: key.into(),
            points: Vec::new(),
        }
    }

    pub fn rect(&self, arena: &PointArena) -> Option<Rect> {
        corners(arena, self.top_left, self.bottom_right)
    }

    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        self.rect(arena)
            .is_some_and(|r| rect_contains(r.inflate(tolerance, tolerance), point))
    }
}

impl ShapeTrait for BoxShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

impl ShapeTrait for TextShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

impl ShapeTrait for ImageShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

impl Structural for BoxShape {
    fn structural(&self) -> Vec<PointId> {
        vec![self.top_left, self.bottom_right]
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        vec![&mut self.top_left, &mut self.bottom_right]
    }
}

impl Structural for TextShape {
    fn structural(&self) -> Vec<PointId> {
        vec![self.top_left, self.bottom_right]
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        vec![&mut self.top_left, &mut self.bottom_right]
    }
}

impl Structural for ImageShape {
    fn structural(&self) -> Vec<PointId> {
        vec![self.top_left, self.bottom_right]
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        vec![&mut self.top_left, &mut self.bottom_right]
    }
}

impl Connectable for BoxShape {
    fn extra_points(&self) -> &[PointId] {
        &self.points
    }

    fn extra_points_mut(&mut self) -> &mut Vec<PointId> {
        &mut self.points
    }
}

impl Connectable for TextShape {
    fn extra_points(&self) -> &[PointId] {
        &self.points
    }

    fn extra_points_mut(&mut self) -> &mut Vec<PointId> {
        &mut self.points
    }
}

impl Connectable for ImageShape {
    fn extra_points(&self) -> &[PointId] {
        &self.points
    }

    fn extra_points_mut(&mut self) -> &mut Vec<PointId> {
        &mut self.points
    }
}

//! Bezier and conic curve shapes.

use super::{Connectable, PointArena, PointId, ShapeMeta, ShapeTrait, Structural};
use crate::geometry::point_to_polyline_dist;
use crate::style::StyleId;
use kurbo::{BezPath, CubicBez, ParamCurveExtrema, ParamCurveNearest, Point, QuadBez, Rect};
use serde::{Deserialize, Serialize};

/// Accuracy passed to kurbo's nearest-point search.
const NEAREST_ACCURACY: f64 = 1e-3;

/// Number of segments a conic is flattened into.
const CONIC_SAMPLES: usize = 32;

/// Cubic bezier: start, two controls, end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubicBezierShape {
    pub meta: ShapeMeta,
    pub point1: PointId,
    pub point2: PointId,
    pub point3: PointId,
    pub point4: PointId,
    #[serde(default)]
    pub points: Vec<PointId>,
}

impl CubicBezierShape {
    pub fn new(
        point1: PointId,
        point2: PointId,
        point3: PointId,
        point4: PointId,
        style: impl Into<StyleId>,
    ) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            point1,
            point2,
            point3,
            point4,
            points: Vec::new(),
        }
    }

    pub fn geometry(&self, arena: &PointArena) -> Option<CubicBez> {
        Some(CubicBez::new(
            arena.position(self.point1)?,
            arena.position(self.point2)?,
            arena.position(self.point3)?,
            arena.position(self.point4)?,
        ))
    }

    pub fn bounds(&self, arena: &PointArena) -> Option<Rect> {
        self.geometry(arena).map(|c| c.bounding_box())
    }

    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        self.geometry(arena).is_some_and(|c| {
            c.nearest(point, NEAREST_ACCURACY).distance_sq <= tolerance * tolerance
        })
    }

    pub fn to_path(&self, arena: &PointArena) -> BezPath {
        let mut path = BezPath::new();
        if let Some(c) = self.geometry(arena) {
            path.move_to(c.p0);
            path.curve_to(c.p1, c.p2, c.p3);
        }
        path
    }
}

impl ShapeTrait for CubicBezierShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

impl Structural for CubicBezierShape {
    fn structural(&self) -> Vec<PointId> {
        vec![self.point1, self.point2, self.point3, self.point4]
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        vec![
            &mut self.point1,
            &mut self.point2,
            &mut self.point3,
            &mut self.point4,
        ]
    }
}

impl Connectable for CubicBezierShape {
    fn extra_points(&self) -> &[PointId] {
        &self.points
    }

    fn extra_points_mut(&mut self) -> &mut Vec<PointId> {
        &mut self.points
    }
}

/// Quadratic bezier: start, control, end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadraticBezierShape {
    pub meta: ShapeMeta,
    pub point1: PointId,
    pub point2: PointId,
    pub point3: PointId,
    #[serde(default)]
    pub points: Vec<PointId>,
}

impl QuadraticBezierShape {
    pub fn new(point1: PointId, point2: PointId, point3: PointId, style: impl Into<StyleId>) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            point1,
            point2,
            point3,
            points: Vec::new(),
        }
    }

    pub fn geometry(&self, arena: &PointArena) -> Option<QuadBez> {
        Some(QuadBez::new(
            arena.position(self.point1)?,
            arena.position(self.point2)?,
            arena.position(self.point3)?,
        ))
    }

    pub fn bounds(&self, arena: &PointArena) -> Option<Rect> {
        self.geometry(arena).map(|q| q.bounding_box())
    }

    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        self.geometry(arena).is_some_and(|q| {
            q.nearest(point, NEAREST_ACCURACY).distance_sq <= tolerance * tolerance
        })
    }

    pub fn to_path(&self, arena: &PointArena) -> BezPath {
        let mut path = BezPath::new();
        if let Some(q) = self.geometry(arena) {
            path.move_to(q.p0);
            path.quad_to(q.p1, q.p2);
        }
        path
    }
}

impl ShapeTrait for QuadraticBezierShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

impl Structural for QuadraticBezierShape {
    fn structural(&self) -> Vec<PointId> {
        vec![self.point1, self.point2, self.point3]
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        vec![&mut self.point1, &mut self.point2, &mut self.point3]
    }
}

impl Connectable for QuadraticBezierShape {
    fn extra_points(&self) -> &[PointId] {
        &self.points
    }

    fn extra_points_mut(&mut self) -> &mut Vec<PointId> {
        &mut self.points
    }
}

/// Rational quadratic curve. A weight of 1.0 is a plain quadratic bezier,
/// below 1.0 an ellipse arc, above 1.0 a hyperbola arc.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConicShape {
    pub meta: ShapeMeta,
    pub point1: PointId,
    pub point2: PointId,
    pub point3: PointId,
    pub weight: f64,
    #[serde(default)]
    pub points: Vec<PointId>,
}

impl ConicShape {
    pub fn new(
        point1: PointId,
        point2: PointId,
        point3: PointId,
        weight: f64,
        style: impl Into<StyleId>,
    ) -> Self {
        Self {
            meta: ShapeMeta::new(style),
            point1,
            point2,
            point3,
            weight,
            points: Vec::new(),
        }
    }

    /// Evaluate the curve at `t` in `[0, 1]`.
    pub fn eval(p0: Point, p1: Point, p2: Point, weight: f64, t: f64) -> Point {
        let mt = 1.0 - t;
        let b0 = mt * mt;
        let b1 = 2.0 * weight * t * mt;
        let b2 = t * t;
        let denom = b0 + b1 + b2;
        Point::new(
            (b0 * p0.x + b1 * p1.x + b2 * p2.x) / denom,
            (b0 * p0.y + b1 * p1.y + b2 * p2.y) / denom,
        )
    }

    /// Flattened polyline through the curve, endpoints included.
    pub fn samples(&self, arena: &PointArena) -> Option<Vec<Point>> {
        let p0 = arena.position(self.point1)?;
        let p1 = arena.position(self.point2)?;
        let p2 = arena.position(self.point3)?;
        Some(
            (0..=CONIC_SAMPLES)
                .map(|i| Self::eval(p0, p1, p2, self.weight, i as f64 / CONIC_SAMPLES as f64))
                .collect(),
        )
    }

    pub fn bounds(&self, arena: &PointArena) -> Option<Rect> {
        let samples = self.samples(arena)?;
        let first = *samples.first()?;
        Some(
            samples
                .iter()
                .fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)),
        )
    }

    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        self.samples(arena)
            .is_some_and(|s| point_to_polyline_dist(point, &s) <= tolerance)
    }

    pub fn to_path(&self, arena: &PointArena) -> BezPath {
        let mut path = BezPath::new();
        if let Some(samples) = self.samples(arena) {
            let mut iter = samples.into_iter();
            if let Some(first) = iter.next() {
                path.move_to(first);
                for p in iter {
                    path.line_to(p);
                }
            }
        }
        path
    }
}

impl ShapeTrait for ConicShape {
    fn meta(&self) -> &ShapeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut ShapeMeta {
        &mut self.meta
    }
}

impl Structural for ConicShape {
    fn structural(&self) -> Vec<PointId> {
        vec![self.point1, self.point2, self.point3]
    }

    fn structural_mut(&mut self) -> Vec<&mut PointId> {
        vec![&mut self.point1, &mut self.point2, &mut self.point3]
    }
}

impl Connectable for ConicShape {
    fn extra_points(&self) -> &[PointId] {
        &self.points
    }

    fn extra_points_mut(&mut self) -> &mut Vec<PointId> {
        &mut self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_hit_test_on_curve() {
        let mut arena = PointArena::new();
        let p1 = arena.add(Point::new(0.0, 0.0));
        let p2 = arena.add(Point::new(0.0, 100.0));
        let p3 = arena.add(Point::new(100.0, 100.0));
        let p4 = arena.add(Point::new(100.0, 0.0));
        let curve = CubicBezierShape::new(p1, p2, p3, p4, "default");

        // Midpoint of this symmetric curve is (50, 75)
        assert!(curve.hit_test(&arena, Point::new(50.0, 75.0), 1.0));
        assert!(!curve.hit_test(&arena, Point::new(50.0, 40.0), 5.0));

        let bounds = curve.bounds(&arena).unwrap();
        assert!((bounds.y1 - 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_quadratic_hit_test() {
        let mut arena = PointArena::new();
        let p1 = arena.add(Point::new(0.0, 0.0));
        let p2 = arena.add(Point::new(50.0, 100.0));
        let p3 = arena.add(Point::new(100.0, 0.0));
        let curve = QuadraticBezierShape::new(p1, p2, p3, "default");

        assert!(curve.hit_test(&arena, Point::new(50.0, 50.0), 1.0));
        assert!(!curve.hit_test(&arena, Point::new(50.0, 90.0), 5.0));
    }

    #[test]
    fn test_conic_weight_one_matches_quadratic() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(50.0, 100.0);
        let p2 = Point::new(100.0, 0.0);
        let mid = ConicShape::eval(p0, p1, p2, 1.0, 0.5);
        assert!((mid.x - 50.0).abs() < 1e-9);
        assert!((mid.y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_conic_samples_hit_endpoints() {
        let mut arena = PointArena::new();
        let p1 = arena.add(Point::new(0.0, 0.0));
        let p2 = arena.add(Point::new(0.0, 100.0));
        let p3 = arena.add(Point::new(100.0, 100.0));
        let conic = ConicShape::new(p1, p2, p3, 0.5, "default");

        let samples = conic.samples(&arena).unwrap();
        assert_eq!(samples.len(), CONIC_SAMPLES + 1);
        assert!(samples[0].distance(Point::new(0.0, 0.0)) < 1e-9);
        assert!(samples[CONIC_SAMPLES].distance(Point::new(100.0, 100.0)) < 1e-9);
        assert!(conic.hit_test(&arena, Point::new(100.0, 100.0), 0.5));
    }
}

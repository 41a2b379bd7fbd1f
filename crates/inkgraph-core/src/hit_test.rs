//! Resolve pointer positions and marquee rectangles to graph elements.
//!
//! Shapes are searched topmost first and the first match wins; there is no
//! nearest-of-several ranking. Tools rely on that ordering.

use kurbo::{Point, Rect};

use crate::geometry::{distance, rect_encloses};
use crate::graph::{PointArena, PointId, Shape, ShapeId};
use crate::input::Modifiers;
use crate::selection::{ElementId, SelectionState};

/// Hit testing with a world-space radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTest {
    /// Match radius in world units; a distance equal to it still matches.
    pub radius: f64,
}

impl HitTest {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    /// Radius given in screen pixels, scaled so it stays the same size on screen.
    pub fn for_zoom(radius_px: f64, zoom: f64) -> Self {
        Self::new(radius_px / zoom.max(f64::EPSILON))
    }

    /// Topmost point within the radius of `position`, skipping `exclude`.
    pub fn try_to_get_point(
        &self,
        shapes: &[Shape],
        arena: &PointArena,
        position: Point,
        exclude: Option<PointId>,
    ) -> Option<PointId> {
        shapes.iter().rev().find_map(|shape| {
            shape.points().find(|p| {
                Some(*p) != exclude
                    && arena
                        .position(*p)
                        .is_some_and(|q| distance(q, position) <= self.radius)
            })
        })
    }

    /// Topmost shape hit at `position`.
    pub fn try_to_get_shape(
        &self,
        shapes: &[Shape],
        arena: &PointArena,
        position: Point,
    ) -> Option<ShapeId> {
        shapes
            .iter()
            .rev()
            .find(|s| s.hit_test(arena, position, self.radius))
            .map(Shape::id)
    }

    /// Point first, then shape.
    pub fn try_to_get_element(
        &self,
        shapes: &[Shape],
        arena: &PointArena,
        position: Point,
    ) -> Option<ElementId> {
        self.try_to_get_point(shapes, arena, position, None)
            .map(ElementId::Point)
            .or_else(|| {
                self.try_to_get_shape(shapes, arena, position)
                    .map(ElementId::Shape)
            })
    }

    /// Shapes whose bounds lie entirely inside `rect`, topmost first.
    pub fn try_to_get_shapes_in_rect(
        &self,
        shapes: &[Shape],
        arena: &PointArena,
        rect: Rect,
    ) -> Vec<ShapeId> {
        shapes
            .iter()
            .rev()
            .filter(|s| s.bounds(arena).is_some_and(|b| rect_encloses(rect, b)))
            .map(Shape::id)
            .collect()
    }

    /// Select every shape enclosed by `rect`. Returns whether any was found.
    pub fn try_to_select(
        &self,
        shapes: &[Shape],
        arena: &PointArena,
        selection: &mut SelectionState,
        rect: Rect,
    ) -> bool {
        let ids = self.try_to_get_shapes_in_rect(shapes, arena, rect);
        for shape in shapes.iter().filter(|s| ids.contains(&s.id())) {
            shape.select(selection);
        }
        !ids.is_empty()
    }

    /// Select the element under `position`.
    ///
    /// Without Control the previous selection is replaced; a miss leaves it alone.
    pub fn try_to_select_at(
        &self,
        shapes: &[Shape],
        arena: &PointArena,
        selection: &mut SelectionState,
        position: Point,
        modifiers: Modifiers,
    ) -> Option<ElementId> {
        let element = self.try_to_get_element(shapes, arena, position)?;
        if !modifiers.control() {
            selection.clear();
        }
        match element {
            ElementId::Point(_) => {
                selection.select(element);
            }
            ElementId::Shape(id) => {
                if let Some(shape) = shapes.iter().find(|s| s.id() == id) {
                    shape.select(selection);
                }
            }
        }
        Some(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BoxShape, LineShape, PointShape};

    fn rect(arena: &mut PointArena, a: Point, b: Point) -> Shape {
        let tl = arena.add(a);
        let br = arena.add(b);
        Shape::Rectangle(BoxShape::new(tl, br, "default"))
    }

    #[test]
    fn test_point_radius_is_inclusive() {
        let mut arena = PointArena::new();
        let p = arena.add(Point::new(10.0, 0.0));
        let shapes = vec![Shape::Point(PointShape::new(p, "default"))];
        let hit = HitTest::new(5.0);

        assert_eq!(hit.try_to_get_point(&shapes, &arena, Point::new(15.0, 0.0), None), Some(p));
        assert_eq!(
            hit.try_to_get_point(&shapes, &arena, Point::new(15.0 + 1e-9, 0.0), None),
            None
        );
    }

    #[test]
    fn test_point_exclude() {
        let mut arena = PointArena::new();
        let p = arena.add(Point::ZERO);
        let shapes = vec![Shape::Point(PointShape::new(p, "default"))];
        let hit = HitTest::new(5.0);
        assert_eq!(hit.try_to_get_point(&shapes, &arena, Point::ZERO, Some(p)), None);
    }

    #[test]
    fn test_topmost_shape_wins() {
        let mut arena = PointArena::new();
        let below = rect(&mut arena, Point::ZERO, Point::new(100.0, 100.0));
        let above = rect(&mut arena, Point::new(50.0, 50.0), Point::new(150.0, 150.0));
        let above_id = above.id();
        let shapes = vec![below, above];

        let hit = HitTest::new(0.0);
        assert_eq!(
            hit.try_to_get_shape(&shapes, &arena, Point::new(75.0, 75.0)),
            Some(above_id)
        );
    }

    #[test]
    fn test_radius_scales_with_zoom() {
        let hit = HitTest::for_zoom(6.0, 2.0);
        assert!((hit.radius - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_element_prefers_points() {
        let mut arena = PointArena::new();
        let a = arena.add(Point::ZERO);
        let b = arena.add(Point::new(100.0, 0.0));
        let shapes = vec![Shape::Line(LineShape::new(a, b, "default"))];
        let hit = HitTest::new(5.0);

        assert_eq!(
            hit.try_to_get_element(&shapes, &arena, Point::new(1.0, 1.0)),
            Some(ElementId::Point(a))
        );
        assert!(matches!(
            hit.try_to_get_element(&shapes, &arena, Point::new(50.0, 1.0)),
            Some(ElementId::Shape(_))
        ));
    }

    #[test]
    fn test_marquee_requires_full_containment() {
        let mut arena = PointArena::new();
        let inside_a = rect(&mut arena, Point::new(10.0, 10.0), Point::new(40.0, 40.0));
        let inside_b = rect(&mut arena, Point::new(50.0, 50.0), Point::new(100.0, 100.0));
        let partial = rect(&mut arena, Point::new(80.0, 80.0), Point::new(120.0, 120.0));
        let (a, b, c) = (inside_a.id(), inside_b.id(), partial.id());
        let shapes = vec![inside_a, inside_b, partial];

        let mut selection = SelectionState::new();
        let hit = HitTest::new(5.0);
        assert!(hit.try_to_select(&shapes, &arena, &mut selection, Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(selection.is_shape_selected(a));
        assert!(selection.is_shape_selected(b));
        assert!(!selection.is_shape_selected(c));
    }

    #[test]
    fn test_select_at_additive() {
        let mut arena = PointArena::new();
        let first = rect(&mut arena, Point::ZERO, Point::new(10.0, 10.0));
        let second = rect(&mut arena, Point::new(50.0, 50.0), Point::new(60.0, 60.0));
        let (a, b) = (first.id(), second.id());
        let shapes = vec![first, second];
        let hit = HitTest::new(1.0);
        let mut selection = SelectionState::new();

        hit.try_to_select_at(&shapes, &arena, &mut selection, Point::new(5.0, 5.0), Modifiers::empty());
        hit.try_to_select_at(&shapes, &arena, &mut selection, Point::new(55.0, 55.0), Modifiers::CONTROL);
        assert!(selection.is_shape_selected(a));
        assert!(selection.is_shape_selected(b));

        hit.try_to_select_at(&shapes, &arena, &mut selection, Point::new(55.0, 55.0), Modifiers::empty());
        assert!(!selection.is_shape_selected(a));

        // A miss leaves the selection untouched
        assert!(
            hit.try_to_select_at(&shapes, &arena, &mut selection, Point::new(300.0, 300.0), Modifiers::empty())
                .is_none()
        );
        assert!(selection.is_shape_selected(b));
    }
}

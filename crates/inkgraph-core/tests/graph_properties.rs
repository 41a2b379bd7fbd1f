//! Shared-point behavior of the shape graph, end to end.

use inkgraph_core::graph::{LineShape, PointArena, PointId, Shape, copy_shapes, distinct_points};
use inkgraph_core::{Document, HitTest};
use kurbo::Point;

fn line(doc: &mut Document, a: PointId, b: PointId) -> usize {
    doc.add_shape(Shape::Line(LineShape::new(a, b, "default")));
    doc.shapes.len() - 1
}

fn endpoints(shape: &Shape) -> (PointId, PointId) {
    match shape {
        Shape::Line(l) => (l.start, l.end),
        other => panic!("expected a line, got {}", other.kind()),
    }
}

/// Three lines forming a triangle: every corner is shared by two lines.
fn triangle() -> Document {
    let mut doc = Document::new();
    let a = doc.points.add(Point::new(0.0, 0.0));
    let b = doc.points.add(Point::new(100.0, 0.0));
    let c = doc.points.add(Point::new(50.0, 80.0));
    line(&mut doc, a, b);
    line(&mut doc, b, c);
    line(&mut doc, c, a);
    doc
}

#[test]
fn test_copy_preserves_point_sharing() {
    let doc = triangle();
    let mut arena = PointArena::new();
    let (copies, map) = copy_shapes(&doc.shapes, &doc.points, &mut arena);

    assert_eq!(copies.len(), 3);
    assert_eq!(distinct_points(&doc.shapes).len(), 3);
    assert_eq!(distinct_points(&copies).len(), 3);
    assert_eq!(arena.len(), 3);

    for (original, copy) in doc.shapes.iter().zip(&copies) {
        let (a, b) = endpoints(original);
        let (ca, cb) = endpoints(copy);
        assert_eq!(map.get(a), Some(ca));
        assert_eq!(map.get(b), Some(cb));
        assert_ne!(original.id(), copy.id());
    }
    // Corners stay shared between neighbouring copies
    assert_eq!(endpoints(&copies[0]).1, endpoints(&copies[1]).0);
    assert_eq!(endpoints(&copies[1]).1, endpoints(&copies[2]).0);
    assert_eq!(endpoints(&copies[2]).1, endpoints(&copies[0]).0);
}

#[test]
fn test_disconnect_makes_point_private() {
    let mut doc = triangle();
    let (_, shared) = endpoints(&doc.shapes[0]);

    let copy = doc.shapes[0].disconnect_point(shared, &mut doc.points).unwrap();

    assert_ne!(copy, shared);
    assert_eq!(doc.points.position(copy), doc.points.position(shared));
    assert!(!doc.shapes[0].structural_points().contains(&shared));
    assert!(doc.shapes[1].structural_points().contains(&shared));
    assert!(doc.shapes[0].disconnect_point(shared, &mut doc.points).is_none());
}

#[test]
fn test_connect_disconnect_round_trip() {
    let mut doc = triangle();
    let (_, shared) = endpoints(&doc.shapes[0]);

    let copy = doc.shapes[0].disconnect_point(shared, &mut doc.points).unwrap();
    assert!(doc.shapes[0].connect(shared, copy));

    assert_eq!(endpoints(&doc.shapes[0]).1, shared);
    assert_eq!(endpoints(&doc.shapes[1]).0, shared);
    assert_eq!(doc.prune_points(&[]), 1);
    assert_eq!(doc.points.len(), 3);
}

#[test]
fn test_connect_rejects_foreign_target() {
    let mut doc = triangle();
    let stranger = doc.points.add(Point::new(500.0, 500.0));
    let other = doc.points.add(Point::new(600.0, 600.0));
    assert!(!doc.shapes[0].connect(other, stranger));
}

#[test]
fn test_hit_radius_is_inclusive() {
    let mut doc = Document::new();
    let (_, point) = doc.add_point(Point::new(5.0, 0.0), "default");
    let hit = HitTest::new(5.0);

    assert_eq!(hit.try_to_get_point(&doc.shapes, &doc.points, Point::ZERO, None), Some(point));
    let beyond = Point::new(-1e-9, 0.0);
    assert_eq!(hit.try_to_get_point(&doc.shapes, &doc.points, beyond, None), None);
}

#[test]
fn test_document_json_round_trip_keeps_sharing() {
    let doc = triangle();
    let json = doc.to_json().unwrap();
    let loaded = Document::from_json(&json).unwrap();

    assert_eq!(loaded.points.len(), 3);
    assert_eq!(endpoints(&loaded.shapes[0]).1, endpoints(&loaded.shapes[1]).0);
    let (a, _) = endpoints(&loaded.shapes[0]);
    assert_eq!(loaded.points.position(a), Some(Point::ZERO));
}

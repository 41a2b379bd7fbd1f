//! Intersections of a candidate line with existing document geometry.

use kurbo::{Line, Point};

use crate::document::Document;
use crate::geometry::{
    line_ellipse_intersections, line_rect_intersections, segment_intersection, segments_intersect_rect,
};
use crate::graph::Shape;

/// A crossing on the candidate line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Point,
    /// Parameter along the candidate line, `0.0` at its start.
    pub t: f64,
}

/// Finds where a candidate line crosses one kind of shape.
pub trait IntersectionFinder: std::fmt::Debug {
    /// Replace the stored intersections with those of `line`.
    fn find(&mut self, document: &Document, line: Line);

    fn intersections(&self) -> &[Intersection];

    fn clear(&mut self);
}

/// Visit every shape in the document tree.
fn each_shape(document: &Document, mut f: impl FnMut(&Shape)) {
    for shape in &document.shapes {
        shape.for_each_shape(&mut f);
    }
}

#[derive(Debug, Default)]
pub struct LineLineFinder {
    found: Vec<Intersection>,
}

impl IntersectionFinder for LineLineFinder {
    fn find(&mut self, document: &Document, line: Line) {
        self.found.clear();
        each_shape(document, |shape| {
            let Shape::Line(other) = shape else { return };
            let Some(other) = other.geometry(&document.points) else { return };
            if let Some((point, t, _)) = segment_intersection(line.p0, line.p1, other.p0, other.p1) {
                self.found.push(Intersection { point, t });
            }
        });
    }

    fn intersections(&self) -> &[Intersection] {
        &self.found
    }

    fn clear(&mut self) {
        self.found.clear();
    }
}

#[derive(Debug, Default)]
pub struct LineRectangleFinder {
    found: Vec<Intersection>,
}

impl IntersectionFinder for LineRectangleFinder {
    fn find(&mut self, document: &Document, line: Line) {
        self.found.clear();
        each_shape(document, |shape| {
            let Shape::Rectangle(rect) = shape else { return };
            let Some(rect) = rect.rect(&document.points) else { return };
            if !segments_intersect_rect(&[line.p0, line.p1], rect) {
                return;
            }
            self.found.extend(
                line_rect_intersections(line, rect)
                    .into_iter()
                    .map(|(point, t)| Intersection { point, t }),
            );
        });
    }

    fn intersections(&self) -> &[Intersection] {
        &self.found
    }

    fn clear(&mut self) {
        self.found.clear();
    }
}

#[derive(Debug, Default)]
pub struct LineEllipseFinder {
    found: Vec<Intersection>,
}

impl IntersectionFinder for LineEllipseFinder {
    fn find(&mut self, document: &Document, line: Line) {
        self.found.clear();
        each_shape(document, |shape| {
            let Shape::Ellipse(ellipse) = shape else { return };
            let Some(rect) = ellipse.rect(&document.points) else { return };
            self.found.extend(
                line_ellipse_intersections(line, rect)
                    .into_iter()
                    .map(|(point, t)| Intersection { point, t }),
            );
        });
    }

    fn intersections(&self) -> &[Intersection] {
        &self.found
    }

    fn clear(&mut self) {
        self.found.clear();
    }
}

/// Interior crossings of `line` from every finder, sorted by `t`.
///
/// Crossings at the line's own endpoints and duplicates are dropped.
pub fn split_points(document: &Document, line: Line) -> Vec<Intersection> {
    const EDGE: f64 = 1e-6;
    let mut finders: [Box<dyn IntersectionFinder>; 3] = [
        Box::new(LineLineFinder::default()),
        Box::new(LineRectangleFinder::default()),
        Box::new(LineEllipseFinder::default()),
    ];
    let mut all: Vec<Intersection> = Vec::new();
    for finder in &mut finders {
        finder.find(document, line);
        all.extend_from_slice(finder.intersections());
    }
    all.retain(|i| i.t > EDGE && i.t < 1.0 - EDGE);
    all.sort_by(|a, b| a.t.total_cmp(&b.t));
    all.dedup_by(|a, b| (a.t - b.t).abs() < EDGE);
    all
}

//! Geometry helpers shared by the shape graph, hit testing and filters.

use kurbo::{Line, Point, Rect, Vec2};

/// Tolerance used when comparing parameters and cross products.
const EPSILON: f64 = 1e-10;

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).hypot()
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    distance(point, a + seg * t)
}

/// Minimum distance from a point to a polyline (sequence of connected segments).
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => distance(point, *single),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Rotate `point` around `center` by `angle` radians.
pub fn rotate_point(point: Point, center: Point, angle: f64) -> Point {
    let (sin, cos) = angle.sin_cos();
    let v = point - center;
    center + Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Project `point` onto the infinite line through `line`.
///
/// Returns the projected point and its parameter along the line, where
/// `0.0` is `line.p0` and `1.0` is `line.p1`.
pub fn project_on_line(point: Point, line: Line) -> (Point, f64) {
    let dir = line.p1 - line.p0;
    let len_sq = dir.hypot2();
    if len_sq < f64::EPSILON {
        return (line.p0, 0.0);
    }
    let t = (point - line.p0).dot(dir) / len_sq;
    (line.p0 + dir * t, t)
}

/// Normalized rectangle spanned by two corner points.
pub fn rect_from_points(a: Point, b: Point) -> Rect {
    Rect::from_points(a, b)
}

/// Inclusive point containment (kurbo's `Rect::contains` is half-open).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    let rect = rect.abs();
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether `inner` lies entirely within `outer`, edges included.
pub fn rect_encloses(outer: Rect, inner: Rect) -> bool {
    let outer = outer.abs();
    let inner = inner.abs();
    inner.x0 >= outer.x0 && inner.x1 <= outer.x1 && inner.y0 >= outer.y0 && inner.y1 <= outer.y1
}

/// Intersection of segments a1→a2 and b1→b2.
///
/// Returns the point together with its parameter `t` on the first segment
/// and `u` on the second. Parallel and collinear segments yield `None`.
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<(Point, f64, f64)> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    if denom.abs() < EPSILON {
        return None;
    }
    let qp = b1 - a1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (-EPSILON..=1.0 + EPSILON).contains(&t) && (-EPSILON..=1.0 + EPSILON).contains(&u) {
        Some((a1 + r * t, t.clamp(0.0, 1.0), u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Test if two line segments (a-b) and (c-d) intersect, touching included.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 { (p - o).cross(q - o) };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear cases: check if endpoint lies on the other segment
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < EPSILON && on_segment(c, d, a))
        || (d2.abs() < EPSILON && on_segment(c, d, b))
        || (d3.abs() < EPSILON && on_segment(a, b, c))
        || (d4.abs() < EPSILON && on_segment(a, b, d))
}

/// Test if a polyline touches a rectangle (any vertex inside or any edge crossing).
pub fn segments_intersect_rect(points: &[Point], rect: Rect) -> bool {
    if points.iter().any(|p| rect_contains(rect, *p)) {
        return true;
    }
    let edges = rect_edges(rect);
    points.windows(2).any(|w| {
        edges
            .iter()
            .any(|edge| segments_intersect(w[0], w[1], edge.p0, edge.p1))
    })
}

/// The four edges of a rectangle, clockwise from the top-left corner.
pub fn rect_edges(rect: Rect) -> [Line; 4] {
    let rect = rect.abs();
    let tl = Point::new(rect.x0, rect.y0);
    let tr = Point::new(rect.x1, rect.y0);
    let br = Point::new(rect.x1, rect.y1);
    let bl = Point::new(rect.x0, rect.y1);
    [Line::new(tl, tr), Line::new(tr, br), Line::new(br, bl), Line::new(bl, tl)]
}

/// Points where `line` crosses the outline of `rect`, with their parameter along `line`.
///
/// Corner hits are reported once. Results are sorted by `t`.
pub fn line_rect_intersections(line: Line, rect: Rect) -> Vec<(Point, f64)> {
    let mut hits: Vec<(Point, f64)> = Vec::new();
    for edge in rect_edges(rect) {
        if let Some((point, t, _)) = segment_intersection(line.p0, line.p1, edge.p0, edge.p1) {
            if !hits.iter().any(|(_, other)| (other - t).abs() < 1e-9) {
                hits.push((point, t));
            }
        }
    }
    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits
}

/// Points where `line` crosses the ellipse inscribed in `rect`, with their parameter along `line`.
pub fn line_ellipse_intersections(line: Line, rect: Rect) -> Vec<(Point, f64)> {
    let rect = rect.abs();
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    if rx < f64::EPSILON || ry < f64::EPSILON {
        return Vec::new();
    }
    let center = rect.center();
    let dir = line.p1 - line.p0;
    let (dx, dy) = (dir.x / rx, dir.y / ry);
    let (ox, oy) = ((line.p0.x - center.x) / rx, (line.p0.y - center.y) / ry);

    let a = dx * dx + dy * dy;
    let b = 2.0 * (ox * dx + oy * dy);
    let c = ox * ox + oy * oy - 1.0;
    if a < f64::EPSILON {
        return Vec::new();
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sqrt = disc.sqrt();
    let mut roots = vec![(-b - sqrt) / (2.0 * a)];
    if sqrt > EPSILON {
        roots.push((-b + sqrt) / (2.0 * a));
    }
    roots
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .map(|t| (line.p0 + dir * t, t))
        .collect()
}

/// Round a point to the nearest grid intersection relative to `origin`.
pub fn snap_to_grid(point: Point, pitch: f64, origin: Point) -> Point {
    if pitch <= 0.0 {
        return point;
    }
    Point::new(
        origin.x + ((point.x - origin.x) / pitch).round() * pitch,
        origin.y + ((point.y - origin.y) / pitch).round() * pitch,
    )
}

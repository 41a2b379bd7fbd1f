//! Renderer trait and the document draw pass built on it.

use inkgraph_core::graph::FillRule;
use inkgraph_core::{Document, Shape, ShapeStyle};
use kurbo::{Affine, BezPath, CubicBez, Line, Point, QuadBez, Rect};
use thiserror::Error;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Offset and scale applied to world geometry by a draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub dx: f64,
    pub dy: f64,
    pub scale: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

impl Placement {
    pub fn new(dx: f64, dy: f64, scale: f64) -> Self {
        Self { dx, dy, scale }
    }

    /// Scale first, then offset.
    pub fn transform(&self) -> Affine {
        Affine::translate((self.dx, self.dy)) * Affine::scale(self.scale)
    }

    pub fn apply(&self, point: Point) -> Point {
        self.transform() * point
    }
}

/// How a handle is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Selected,
    Hovered,
}

/// Drawing backend.
///
/// Geometry arrives resolved to world coordinates along with the style it
/// is drawn with. Implementations apply the placement themselves.
pub trait Renderer {
    fn draw_line(&mut self, line: Line, style: &ShapeStyle, at: Placement);

    fn draw_cubic_bezier(&mut self, curve: CubicBez, style: &ShapeStyle, at: Placement);

    fn draw_quadratic_bezier(&mut self, curve: QuadBez, style: &ShapeStyle, at: Placement);

    /// Rational quadratic, flattened into `path`.
    fn draw_conic(&mut self, path: &BezPath, weight: f64, style: &ShapeStyle, at: Placement);

    fn draw_rectangle(&mut self, rect: Rect, style: &ShapeStyle, at: Placement);

    /// Ellipse inscribed in `rect`.
    fn draw_ellipse(&mut self, rect: Rect, style: &ShapeStyle, at: Placement);

    fn draw_path(&mut self, path: &BezPath, fill_rule: FillRule, style: &ShapeStyle, at: Placement);

    fn draw_text(&mut self, rect: Rect, text: &str, style: &ShapeStyle, at: Placement);

    /// Image resource `key` stretched over `rect`.
    fn draw_image(&mut self, rect: Rect, key: &str, style: &ShapeStyle, at: Placement);

    /// Glyph for a point shape or a templated point.
    fn draw_point(&mut self, point: Point, style: &ShapeStyle, at: Placement);

    /// Selection handle, `size` wide in world units.
    fn draw_handle(&mut self, point: Point, kind: HandleKind, size: f64, at: Placement);
}

fn dead_point(shape: &Shape) -> RendererError {
    RendererError::RenderFailed(format!(
        "{} {} references a dead point",
        shape.kind(),
        shape.id()
    ))
}

/// Draw one shape. Returns whether anything was drawn.
///
/// A shape whose style id is not in the document's library is skipped.
/// Groups are drawn child by child with the children's own styles.
pub fn draw_shape<R: Renderer + ?Sized>(
    renderer: &mut R,
    document: &Document,
    shape: &Shape,
    at: Placement,
) -> RenderResult<bool> {
    if let Shape::Group(group) = shape {
        let mut drawn = false;
        for child in &group.shapes {
            drawn |= draw_shape(renderer, document, child, at)?;
        }
        return Ok(drawn);
    }

    let Some(style) = document.styles.get(shape.style()) else {
        log::debug!(
            "Skipping {} {}: unknown style {:?}",
            shape.kind(),
            shape.id(),
            shape.style()
        );
        return Ok(false);
    };
    let points = &document.points;

    match shape {
        Shape::Point(s) => {
            let position = points.position(s.point).ok_or_else(|| dead_point(shape))?;
            renderer.draw_point(position, style, at);
        }
        Shape::Line(s) => {
            let line = s.geometry(points).ok_or_else(|| dead_point(shape))?;
            renderer.draw_line(line, style, at);
        }
        Shape::CubicBezier(s) => {
            let curve = s.geometry(points).ok_or_else(|| dead_point(shape))?;
            renderer.draw_cubic_bezier(curve, style, at);
        }
        Shape::QuadraticBezier(s) => {
            let curve = s.geometry(points).ok_or_else(|| dead_point(shape))?;
            renderer.draw_quadratic_bezier(curve, style, at);
        }
        Shape::Conic(s) => {
            if s.samples(points).is_none() {
                return Err(dead_point(shape));
            }
            renderer.draw_conic(&s.to_path(points), s.weight, style, at);
        }
        Shape::Rectangle(s) => {
            let rect = s.rect(points).ok_or_else(|| dead_point(shape))?;
            renderer.draw_rectangle(rect, style, at);
        }
        Shape::Ellipse(s) => {
            let rect = s.rect(points).ok_or_else(|| dead_point(shape))?;
            renderer.draw_ellipse(rect, style, at);
        }
        Shape::Text(s) => {
            let rect = s.rect(points).ok_or_else(|| dead_point(shape))?;
            renderer.draw_text(rect, &s.text, style, at);
        }
        Shape::Image(s) => {
            if s.key.is_empty() {
                log::debug!("Skipping image {}: no resource", shape.id());
                return Ok(false);
            }
            let rect = s.rect(points).ok_or_else(|| dead_point(shape))?;
            renderer.draw_image(rect, &s.key, style, at);
        }
        Shape::Path(s) => {
            renderer.draw_path(&s.to_path(points), s.fill_rule, style, at);
        }
        // Drawn above, child by child.
        Shape::Group(_) => return Ok(false),
    }
    Ok(true)
}

/// Draw `shapes` in order, back to front. Returns how many shapes were drawn.
///
/// Shapes with an unknown style are skipped without ending the pass. A shape
/// referencing a dead point aborts it.
pub fn draw_shapes<R: Renderer + ?Sized>(
    renderer: &mut R,
    document: &Document,
    shapes: &[Shape],
    dx: f64,
    dy: f64,
    scale: f64,
) -> RenderResult<usize> {
    let at = Placement::new(dx, dy, scale);
    let mut drawn = 0;
    for shape in shapes {
        if draw_shape(renderer, document, shape, at)? {
            drawn += 1;
        }
    }
    Ok(drawn)
}

/// Draw a glyph at every point carrying a template that names a known style.
pub fn draw_templates<R: Renderer + ?Sized>(renderer: &mut R, document: &Document, at: Placement) -> usize {
    let mut drawn = 0;
    for (id, point) in document.points.iter() {
        let Some(template) = point.template.as_deref() else {
            continue;
        };
        match document.styles.get(template) {
            Some(style) => {
                renderer.draw_point(point.position, style, at);
                drawn += 1;
            }
            None => log::debug!("Skipping template {template:?} of point {id:?}"),
        }
    }
    drawn
}

/// Full document pass: guides, shapes, then point templates.
pub fn draw_document<R: Renderer + ?Sized>(
    renderer: &mut R,
    document: &Document,
    at: Placement,
) -> RenderResult<usize> {
    let mut drawn = 0;
    for guide in &document.guides {
        if draw_shape(renderer, document, &Shape::Line(guide.clone()), at)? {
            drawn += 1;
        }
    }
    drawn += draw_shapes(renderer, document, &document.shapes, at.dx, at.dy, at.scale)?;
    drawn += draw_templates(renderer, document, at);
    Ok(drawn)
}

//! Selection tool: click and marquee selection, dragging, and point
//! connect/disconnect gestures.

use std::collections::HashSet;

use kurbo::{Point, Rect, Vec2};

use super::{ToolContext, ToolHandler};
use crate::geometry::{distance, rect_from_points};
use crate::graph::{PointId, distinct_points};
use crate::input::Modifiers;
use crate::selection::ElementId;

/// A single point being dragged on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DraggedPoint {
    pub point: PointId,
    /// Where the point was when the drag started.
    pub origin: Point,
    /// Whether the Control-drag already pulled it away from its other holders.
    pub disconnected: bool,
}

/// What the selection tool is doing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SelectPhase {
    #[default]
    Idle,
    /// Dragging a marquee rectangle.
    Selection {
        origin: Point,
        current: Point,
        /// Selection before the marquee started, restored on cancel.
        before: HashSet<ElementId>,
        additive: bool,
    },
    /// Dragging the selection.
    Move {
        last: Point,
        origin: Point,
        lone: Option<DraggedPoint>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SelectionTool {
    phase: SelectPhase,
}

impl SelectionTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &SelectPhase {
        &self.phase
    }

    /// Marquee rectangle while one is being dragged.
    pub fn marquee(&self) -> Option<Rect> {
        match self.phase {
            SelectPhase::Selection { origin, current, .. } => Some(rect_from_points(origin, current)),
            _ => None,
        }
    }

    /// The one selected point, when the selection is exactly that.
    fn lone_point(ctx: &ToolContext<'_>) -> Option<DraggedPoint> {
        if ctx.selection.len() != 1 {
            return None;
        }
        let point = ctx.selection.selected_points().next()?;
        Some(DraggedPoint {
            point,
            origin: ctx.position(point)?,
            disconnected: false,
        })
    }

    /// Translate the selected points once, then every selected root shape
    /// by the points it has not had moved yet.
    fn move_selection(ctx: &mut ToolContext<'_>, delta: Vec2) {
        let document = &mut *ctx.document;
        let mut moved = HashSet::new();
        for point in ctx.selection.selected_points() {
            if document.points.translate(point, delta) {
                moved.insert(point);
            }
        }
        for shape in document
            .shapes
            .iter_mut()
            .filter(|s| ctx.selection.is_shape_selected(s.id()))
        {
            shape.move_by(&mut document.points, &moved, delta);
            moved.extend(distinct_points([&*shape]));
        }
    }

    /// Leave the dragged point in the topmost slot holding it; every other
    /// slot, nested ones included, gets a private copy at the drag origin.
    fn pull_apart(ctx: &mut ToolContext<'_>, dragged: DraggedPoint) {
        let document = &mut *ctx.document;
        let mut keep = true;
        let mut copies = 0;
        for shape in document.shapes.iter_mut().rev() {
            copies += shape.split_point(dragged.point, dragged.origin, &mut keep, &mut document.points);
        }
        log::debug!("Disconnected {:?} from {copies} slots", dragged.point);
    }

    /// Merge the dragged point into the point it was dropped on.
    fn connect_dropped(ctx: &mut ToolContext<'_>, point: PointId) {
        let Some(position) = ctx.position(point) else {
            return;
        };
        let Some(target) = ctx.find_point(position, Some(point)) else {
            return;
        };
        let mut connected = 0;
        for shape in &mut ctx.document.shapes {
            if shape.connect(target, point) {
                connected += 1;
            }
        }
        if connected == 0 {
            return;
        }
        ctx.selection.remove(ElementId::Point(point));
        ctx.selection.select(ElementId::Point(target));
        ctx.document.prune_points(&*ctx.working);
        log::info!("Connected point {point:?} to {target:?} in {connected} shapes");
    }
}

impl ToolHandler for SelectionTool {
    fn left_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, modifiers: Modifiers) -> bool {
        let hit = ctx.hit;
        let element = hit.try_to_get_element(&ctx.document.shapes, &ctx.document.points, point);
        ctx.selection.clear_hover();

        self.phase = match element {
            Some(element) => {
                if !ctx.selection.is_selected(element) {
                    hit.try_to_select_at(
                        &ctx.document.shapes,
                        &ctx.document.points,
                        &mut *ctx.selection,
                        point,
                        modifiers,
                    );
                }
                SelectPhase::Move {
                    last: point,
                    origin: point,
                    lone: Self::lone_point(ctx),
                }
            }
            None => {
                let before = ctx.selection.selected().clone();
                let additive = modifiers.control();
                if !additive {
                    ctx.selection.clear();
                }
                SelectPhase::Selection {
                    origin: point,
                    current: point,
                    before,
                    additive,
                }
            }
        };
        ctx.capture();
        ctx.invalidate();
        true
    }

    fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, point: Point, modifiers: Modifiers) -> bool {
        match &mut self.phase {
            SelectPhase::Idle => {
                let hovered = ctx
                    .hit
                    .try_to_get_element(&ctx.document.shapes, &ctx.document.points, point);
                ctx.selection.set_hovered(hovered)
            }
            SelectPhase::Selection {
                origin,
                current,
                before,
                additive,
            } => {
                *current = point;
                let rect = rect_from_points(*origin, point);
                ctx.selection
                    .replace(if *additive { before.clone() } else { HashSet::new() });
                let hit = ctx.hit;
                hit.try_to_select(&ctx.document.shapes, &ctx.document.points, &mut *ctx.selection, rect);
                ctx.invalidate();
                true
            }
            SelectPhase::Move { last, origin, lone } => {
                let delta = point - *last;
                *last = point;
                if delta == Vec2::ZERO {
                    return false;
                }
                match lone {
                    Some(dragged) => {
                        ctx.document.points.translate(dragged.point, delta);
                        if modifiers.control()
                            && !dragged.disconnected
                            && distance(point, *origin) > ctx.settings.disconnect_radius
                        {
                            Self::pull_apart(ctx, *dragged);
                            dragged.disconnected = true;
                        }
                    }
                    None => Self::move_selection(ctx, delta),
                }
                ctx.invalidate();
                true
            }
        }
    }

    fn left_up(&mut self, ctx: &mut ToolContext<'_>, _point: Point, modifiers: Modifiers) -> bool {
        match std::mem::take(&mut self.phase) {
            SelectPhase::Idle => return false,
            SelectPhase::Move {
                lone: Some(dragged), ..
            } if modifiers.shift() && ctx.settings.try_to_connect_on_drag && !dragged.disconnected => {
                Self::connect_dropped(ctx, dragged.point);
            }
            _ => {}
        }
        ctx.release();
        ctx.invalidate();
        true
    }

    fn clean(&mut self, ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        match std::mem::take(&mut self.phase) {
            SelectPhase::Idle => return false,
            SelectPhase::Selection { before, .. } => ctx.selection.replace(before),
            SelectPhase::Move { .. } => {}
        }
        ctx.release();
        ctx.invalidate();
        true
    }

    fn is_active(&self) -> bool {
        self.phase != SelectPhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BoxShape, Figure, LineShape, PathShape, Shape, ShapeId};
    use crate::tools::testing::Harness;

    fn add_line(h: &mut Harness, a: PointId, b: PointId) -> ShapeId {
        h.document
            .add_shape(Shape::Line(LineShape::new(a, b, "default")))
    }

    fn endpoints(h: &Harness, index: usize) -> (PointId, PointId) {
        match &h.document.shapes[index] {
            Shape::Line(l) => (l.start, l.end),
            _ => panic!("expected a line"),
        }
    }

    #[test]
    fn test_click_selects_and_drag_moves() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(0.0, 0.0));
        let b = h.document.points.add(Point::new(100.0, 0.0));
        let id = add_line(&mut h, a, b);
        let mut tool = SelectionTool::new();

        h.down(&mut tool, 50.0, 0.0);
        assert!(h.selection.is_shape_selected(id));
        assert!(h.selection.is_point_selected(a));
        assert!(h.captured);

        h.drag(&mut tool, 60.0, 5.0);
        h.drag(&mut tool, 70.0, 10.0);
        h.up(&mut tool, 70.0, 10.0);

        assert_eq!(h.position(a), Point::new(20.0, 10.0));
        assert_eq!(h.position(b), Point::new(120.0, 10.0));
        assert!(!h.captured);
        assert!(!tool.is_active());
    }

    #[test]
    fn test_marquee_requires_enclosure() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(10.0, 10.0));
        let b = h.document.points.add(Point::new(40.0, 40.0));
        let inside = h
            .document
            .add_shape(Shape::Rectangle(BoxShape::new(a, b, "default")));
        let c = h.document.points.add(Point::new(80.0, 80.0));
        let d = h.document.points.add(Point::new(150.0, 150.0));
        let crossing = h
            .document
            .add_shape(Shape::Rectangle(BoxShape::new(c, d, "default")));
        let mut tool = SelectionTool::new();

        h.down(&mut tool, -20.0, -20.0);
        h.drag(&mut tool, 100.0, 100.0);
        assert_eq!(tool.marquee(), Some(Rect::new(-20.0, -20.0, 100.0, 100.0)));
        h.up(&mut tool, 100.0, 100.0);

        assert!(h.selection.is_shape_selected(inside));
        assert!(!h.selection.is_shape_selected(crossing));
    }

    #[test]
    fn test_click_on_empty_clears() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(0.0, 0.0));
        let b = h.document.points.add(Point::new(100.0, 0.0));
        add_line(&mut h, a, b);
        let mut tool = SelectionTool::new();

        h.down(&mut tool, 50.0, 0.0);
        h.up(&mut tool, 50.0, 0.0);
        assert!(!h.selection.is_empty());

        h.down(&mut tool, 50.0, 300.0);
        h.up(&mut tool, 50.0, 300.0);
        assert!(h.selection.is_empty());
    }

    #[test]
    fn test_cancel_marquee_restores_selection() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(0.0, 0.0));
        let b = h.document.points.add(Point::new(100.0, 0.0));
        let id = add_line(&mut h, a, b);
        let mut tool = SelectionTool::new();

        h.down(&mut tool, 50.0, 0.0);
        h.up(&mut tool, 50.0, 0.0);
        h.down(&mut tool, 300.0, 300.0);
        assert!(h.selection.is_empty());
        h.drag(&mut tool, 400.0, 400.0);
        assert!(h.right(&mut tool, 400.0, 400.0));

        assert!(h.selection.is_shape_selected(id));
        assert!(!h.captured);
    }

    #[test]
    fn test_shared_point_drag_moves_both_lines() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(0.0, 0.0));
        let p = h.document.points.add(Point::new(50.0, 50.0));
        let c = h.document.points.add(Point::new(100.0, 0.0));
        add_line(&mut h, a, p);
        add_line(&mut h, p, c);
        let mut tool = SelectionTool::new();

        h.down(&mut tool, 50.0, 50.0);
        assert_eq!(h.selection.len(), 1);
        h.drag(&mut tool, 50.0, 80.0);
        h.up(&mut tool, 50.0, 80.0);

        assert_eq!(endpoints(&h, 0).1, endpoints(&h, 1).0);
        assert_eq!(h.position(p), Point::new(50.0, 80.0));
        assert_eq!(h.position(a), Point::ZERO);
    }

    #[test]
    fn test_control_drag_disconnects() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(0.0, 0.0));
        let p = h.document.points.add(Point::new(50.0, 50.0));
        let c = h.document.points.add(Point::new(100.0, 0.0));
        add_line(&mut h, a, p);
        add_line(&mut h, p, c);
        let mut tool = SelectionTool::new();

        h.down(&mut tool, 50.0, 50.0);
        h.drag_with(&mut tool, 50.0, 55.0, Modifiers::CONTROL);
        // Still within the disconnect radius
        assert_eq!(endpoints(&h, 0).1, p);
        h.drag_with(&mut tool, 50.0, 80.0, Modifiers::CONTROL);
        h.up(&mut tool, 50.0, 80.0);

        let (_, first_end) = endpoints(&h, 0);
        let (second_start, _) = endpoints(&h, 1);
        assert_eq!(second_start, p);
        assert_ne!(first_end, p);
        assert_eq!(h.position(p), Point::new(50.0, 80.0));
        assert_eq!(h.position(first_end), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_control_drag_disconnects_path_joint() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(0.0, 0.0));
        let joint = h.document.points.add(Point::new(50.0, 0.0));
        let c = h.document.points.add(Point::new(50.0, 50.0));
        let mut figure = Figure::new(false, false);
        figure.shapes.push(Shape::Line(LineShape::new(a, joint, "default")));
        figure.shapes.push(Shape::Line(LineShape::new(joint, c, "default")));
        let mut path = PathShape::new("default");
        path.figures.push(figure);
        h.document.add_shape(Shape::Path(path));
        let mut tool = SelectionTool::new();

        h.down(&mut tool, 50.0, 0.0);
        assert!(h.selection.is_point_selected(joint));
        assert_eq!(h.selection.len(), 1);
        h.drag_with(&mut tool, 50.0, -40.0, Modifiers::CONTROL);
        h.up(&mut tool, 50.0, -40.0);

        let Shape::Path(p) = &h.document.shapes[0] else {
            panic!("expected a path");
        };
        let first_end = match &p.figures[0].shapes[0] {
            Shape::Line(l) => l.end,
            _ => panic!("expected a line"),
        };
        let second_start = match &p.figures[0].shapes[1] {
            Shape::Line(l) => l.start,
            _ => panic!("expected a line"),
        };
        assert_ne!(first_end, second_start);
        assert_eq!(h.position(joint), Point::new(50.0, -40.0));
        let moved = [first_end, second_start].iter().filter(|p| **p == joint).count();
        assert_eq!(moved, 1);
        let copy = if first_end == joint { second_start } else { first_end };
        assert_eq!(h.position(copy), Point::new(50.0, 0.0));
    }

    #[test]
    fn test_shift_drop_connects() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(0.0, 0.0));
        let p = h.document.points.add(Point::new(50.0, 0.0));
        let c = h.document.points.add(Point::new(100.0, 0.0));
        let d = h.document.points.add(Point::new(200.0, 0.0));
        add_line(&mut h, a, p);
        add_line(&mut h, c, d);
        let mut tool = SelectionTool::new();

        h.down(&mut tool, 50.0, 0.0);
        h.drag(&mut tool, 99.0, 0.0);
        h.up_with(&mut tool, 99.0, 0.0, Modifiers::SHIFT);

        assert_eq!(endpoints(&h, 0).1, c);
        assert!(!h.document.points.is_alive(p));
        assert_eq!(h.document.points.len(), 3);
        assert!(h.selection.is_point_selected(c));
    }

    #[test]
    fn test_hover_when_idle() {
        let mut h = Harness::new();
        let a = h.document.points.add(Point::new(0.0, 0.0));
        let b = h.document.points.add(Point::new(100.0, 0.0));
        let id = add_line(&mut h, a, b);
        let mut tool = SelectionTool::new();

        assert!(h.drag(&mut tool, 50.0, 1.0));
        assert_eq!(h.selection.hovered(), Some(ElementId::Shape(id)));
        assert!(h.selection.is_empty());
        assert!(h.drag(&mut tool, 50.0, 100.0));
        assert_eq!(h.selection.hovered(), None);
    }
}

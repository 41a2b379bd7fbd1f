//! Two-corner tools: rectangle, ellipse, circle, text and image.

use kurbo::{Point, Vec2};

use super::{ToolContext, ToolHandler};
use crate::graph::{BoxShape, ImageShape, PointId, Shape, ShapeId, TextShape};
use crate::input::Modifiers;

/// What a [`BoxTool`] draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    Rectangle,
    Ellipse,
    /// Ellipse constrained to a square box.
    Circle,
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum BoxState {
    #[default]
    Start,
    Corner {
        id: ShapeId,
        origin: PointId,
        corner: PointId,
    },
}

#[derive(Debug, Clone)]
pub struct BoxTool {
    kind: BoxKind,
    state: BoxState,
}

impl BoxTool {
    pub fn new(kind: BoxKind) -> Self {
        Self {
            kind,
            state: BoxState::Start,
        }
    }

    pub fn kind(&self) -> BoxKind {
        self.kind
    }

    fn build(&self, ctx: &ToolContext<'_>, origin: PointId, corner: PointId) -> Shape {
        let style = ctx.style.to_string();
        match self.kind {
            BoxKind::Rectangle => Shape::Rectangle(BoxShape::new(origin, corner, style)),
            BoxKind::Ellipse | BoxKind::Circle => Shape::Ellipse(BoxShape::new(origin, corner, style)),
            BoxKind::Text => Shape::Text(TextShape::new(
                origin,
                corner,
                ctx.settings.default_text.clone(),
                style,
            )),
            BoxKind::Image => Shape::Image(ImageShape::new(
                origin,
                corner,
                ctx.settings.image_key.clone(),
                style,
            )),
        }
    }

    /// Corner position after applying the square constraint for circles.
    fn constrain(&self, origin: Point, position: Point) -> Point {
        if self.kind != BoxKind::Circle {
            return position;
        }
        let delta = position - origin;
        let side = delta.x.abs().max(delta.y.abs());
        origin + Vec2::new(side.copysign(delta.x), side.copysign(delta.y))
    }

    fn place_corner(&self, ctx: &mut ToolContext<'_>, origin: PointId, corner: PointId, position: Point) {
        let origin = ctx.position(origin).unwrap_or(position);
        let position = self.constrain(origin, position);
        ctx.set_position(corner, position);
    }
}

impl ToolHandler for BoxTool {
    fn left_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let position = ctx.snap(point);
        match self.state {
            BoxState::Start => {
                let origin = ctx.point_at(position);
                let corner = ctx.new_point(position);
                let shape = self.build(ctx, origin, corner);
                let id = ctx.begin_preview(shape);
                self.state = BoxState::Corner { id, origin, corner };
            }
            BoxState::Corner { id, origin, corner } => {
                self.place_corner(ctx, origin, corner, position);
                if self.kind != BoxKind::Circle {
                    ctx.connect_preview(id, corner);
                }
                ctx.commit_preview(id);
                self.state = BoxState::Start;
            }
        }
        true
    }

    fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, point: Point, _modifiers: Modifiers) -> bool {
        let BoxState::Corner { origin, corner, .. } = self.state else {
            return false;
        };
        let position = ctx.snap(point);
        self.place_corner(ctx, origin, corner, position);
        true
    }

    fn clean(&mut self, ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        match std::mem::take(&mut self.state) {
            BoxState::Start => false,
            BoxState::Corner { id, .. } => {
                ctx.cancel_preview(id);
                true
            }
        }
    }

    fn is_active(&self) -> bool {
        self.state != BoxState::Start
    }
}

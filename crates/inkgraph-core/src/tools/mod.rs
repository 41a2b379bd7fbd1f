//! Tool system: one state machine per drawing operation.
//!
//! Tools receive pointer events together with a [`ToolContext`] borrowing the
//! document, the working (preview) container and the selection. In-progress
//! shapes live in the working container until the gesture commits; a cancel
//! removes them again and releases pointer capture.

mod boxes;
mod curve;
mod guide;
mod line;
mod path;
mod point;
mod polyline;
mod segment;
mod selection;

pub use boxes::{BoxKind, BoxTool};
pub use curve::CurveTool;
pub use guide::GuideTool;
pub use line::LineTool;
pub use path::{PathSubTool, PathTool};
pub use point::PointTool;
pub use polyline::PolyLineTool;
pub use segment::SegmentKind;
pub use selection::{SelectPhase, SelectionTool};

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::filters::{FilterContext, FilterPipeline};
use crate::graph::{PointId, Shape, ShapeId};
use crate::hit_test::HitTest;
use crate::input::Modifiers;
use crate::selection::SelectionState;
use crate::settings::EditorSettings;
use crate::style::StyleId;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Point,
    Line,
    PolyLine,
    CubicBezier,
    QuadraticBezier,
    Conic,
    Rectangle,
    Ellipse,
    Circle,
    Text,
    Image,
    Path,
    Guide,
}

/// Everything a tool may touch while handling one event.
pub struct ToolContext<'a> {
    pub document: &'a mut Document,
    /// Preview shapes of the gesture in progress.
    pub working: &'a mut Vec<Shape>,
    pub selection: &'a mut SelectionState,
    pub settings: &'a EditorSettings,
    pub filters: &'a mut FilterPipeline,
    pub hit: HitTest,
    /// Style given to new shapes.
    pub style: &'a str,
    captured: &'a mut bool,
    needs_redraw: &'a mut bool,
}

impl<'a> ToolContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        document: &'a mut Document,
        working: &'a mut Vec<Shape>,
        selection: &'a mut SelectionState,
        settings: &'a EditorSettings,
        filters: &'a mut FilterPipeline,
        hit: HitTest,
        style: &'a str,
        captured: &'a mut bool,
        needs_redraw: &'a mut bool,
    ) -> Self {
        Self {
            document,
            working,
            selection,
            settings,
            filters,
            hit,
            style,
            captured,
            needs_redraw,
        }
    }

    /// Route all following pointer events to the active tool.
    pub fn capture(&mut self) {
        *self.captured = true;
    }

    pub fn release(&mut self) {
        *self.captured = false;
    }

    pub fn is_captured(&self) -> bool {
        *self.captured
    }

    /// Request a repaint.
    pub fn invalidate(&mut self) {
        *self.needs_redraw = true;
    }

    pub fn redraw(&mut self) {
        self.invalidate();
    }

    /// Run the point filters over a raw pointer position.
    pub fn snap(&mut self, position: Point) -> Point {
        let mut point = position;
        let ctx = FilterContext::new(&*self.document, self.settings);
        if self.filters.apply(&ctx, &mut point) {
            self.invalidate();
        }
        point
    }

    /// Drop filter guide visuals.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Document point under `position`, skipping `exclude`.
    pub fn find_point(&self, position: Point, exclude: Option<PointId>) -> Option<PointId> {
        self.hit
            .try_to_get_point(&self.document.shapes, &self.document.points, position, exclude)
    }

    /// Reuse the document point under `position` when connecting is on,
    /// otherwise create a fresh one.
    pub fn point_at(&mut self, position: Point) -> PointId {
        if self.settings.connect_on_draw {
            if let Some(existing) = self.find_point(position, None) {
                log::debug!("Reusing point {existing:?}");
                return existing;
            }
        }
        self.new_point(position)
    }

    pub fn new_point(&mut self, position: Point) -> PointId {
        self.document.points.add(position)
    }

    pub fn position(&self, point: PointId) -> Option<Point> {
        self.document.points.position(point)
    }

    pub fn set_position(&mut self, point: PointId, position: Point) {
        if self.document.points.set_position(point, position) {
            self.invalidate();
        }
    }

    /// Put a new shape into the working container, its points selected.
    pub fn begin_preview(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        for point in shape.points() {
            self.selection.select_transient(point);
        }
        self.working.push(shape);
        self.capture();
        self.invalidate();
        id
    }

    pub fn preview(&self, id: ShapeId) -> Option<&Shape> {
        self.working.iter().find(|s| s.id() == id)
    }

    pub fn preview_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.working.iter_mut().find(|s| s.id() == id)
    }

    /// Connect `point` of a preview shape to the document point under it.
    ///
    /// The replaced point is left for pruning. Returns whether a connection
    /// was made.
    pub fn connect_preview(&mut self, id: ShapeId, point: PointId) -> bool {
        if !self.settings.connect_on_draw {
            return false;
        }
        let Some(position) = self.position(point) else {
            return false;
        };
        let Some(target) = self.find_point(position, Some(point)) else {
            return false;
        };
        let Some(shape) = self.working.iter_mut().find(|s| s.id() == id) else {
            return false;
        };
        if !shape.connect(target, point) {
            return false;
        }
        log::debug!("Connected {} to point {target:?}", shape.kind());
        self.selection.release_transient(point);
        self.selection.select_transient(target);
        true
    }

    /// Remove a preview shape from the working container and deselect the
    /// points the gesture selected.
    pub fn take_preview(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.working.iter().position(|s| s.id() == id)?;
        let shape = self.working.remove(index);
        for point in shape.points() {
            self.selection.release_transient(point);
        }
        self.invalidate();
        Some(shape)
    }

    /// Add a finished shape to the document.
    pub fn commit(&mut self, shape: Shape) -> ShapeId {
        log::debug!("Committed {}", shape.kind());
        self.invalidate();
        self.document.add_shape(shape)
    }

    /// End the gesture: prune points left behind and release capture.
    pub fn finish(&mut self) {
        self.document.prune_points(&*self.working);
        self.clear_filters();
        self.release();
        self.invalidate();
    }

    /// Move a preview shape into the document and end the gesture.
    pub fn commit_preview(&mut self, id: ShapeId) -> Option<ShapeId> {
        let shape = self.take_preview(id)?;
        let id = self.commit(shape);
        self.finish();
        Some(id)
    }

    /// Discard a preview shape and end the gesture.
    pub fn cancel_preview(&mut self, id: ShapeId) {
        if let Some(shape) = self.take_preview(id) {
            log::debug!("Cancelled {}", shape.kind());
        }
        self.finish();
    }
}

/// Pointer event handlers shared by every tool. Each returns whether a
/// redraw is needed.
pub trait ToolHandler {
    fn left_down(&mut self, _ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        false
    }

    fn left_up(&mut self, _ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        false
    }

    fn right_down(&mut self, ctx: &mut ToolContext<'_>, point: Point, modifiers: Modifiers) -> bool {
        self.clean(ctx, point, modifiers)
    }

    fn right_up(&mut self, _ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        false
    }

    fn pointer_move(&mut self, _ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        false
    }

    /// Abort or finish the gesture in progress, leaving nothing partial behind.
    fn clean(&mut self, _ctx: &mut ToolContext<'_>, _point: Point, _modifiers: Modifiers) -> bool {
        false
    }

    /// Whether a gesture is in progress.
    fn is_active(&self) -> bool;
}

/// The active tool's state machine.
#[derive(Debug, Clone)]
pub enum Tool {
    Select(SelectionTool),
    Point(PointTool),
    Line(LineTool),
    PolyLine(PolyLineTool),
    Curve(CurveTool),
    Box(BoxTool),
    Path(PathTool),
    Guide(GuideTool),
}

impl Tool {
    pub fn for_kind(kind: ToolKind, settings: &EditorSettings) -> Self {
        match kind {
            ToolKind::Select => Tool::Select(SelectionTool::new()),
            ToolKind::Point => Tool::Point(PointTool),
            ToolKind::Line => Tool::Line(LineTool::new()),
            ToolKind::PolyLine => Tool::PolyLine(PolyLineTool::new()),
            ToolKind::CubicBezier => Tool::Curve(CurveTool::new(SegmentKind::Cubic)),
            ToolKind::QuadraticBezier => Tool::Curve(CurveTool::new(SegmentKind::Quadratic)),
            ToolKind::Conic => Tool::Curve(CurveTool::new(SegmentKind::Conic(settings.conic_weight))),
            ToolKind::Rectangle => Tool::Box(BoxTool::new(BoxKind::Rectangle)),
            ToolKind::Ellipse => Tool::Box(BoxTool::new(BoxKind::Ellipse)),
            ToolKind::Circle => Tool::Box(BoxTool::new(BoxKind::Circle)),
            ToolKind::Text => Tool::Box(BoxTool::new(BoxKind::Text)),
            ToolKind::Image => Tool::Box(BoxTool::new(BoxKind::Image)),
            ToolKind::Path => Tool::Path(PathTool::new(settings.path_sub_tool)),
            ToolKind::Guide => Tool::Guide(GuideTool::new()),
        }
    }

    pub fn handler(&mut self) -> &mut dyn ToolHandler {
        match self {
            Tool::Select(t) => t,
            Tool::Point(t) => t,
            Tool::Line(t) => t,
            Tool::PolyLine(t) => t,
            Tool::Curve(t) => t,
            Tool::Box(t) => t,
            Tool::Path(t) => t,
            Tool::Guide(t) => t,
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Tool::Select(t) => t.is_active(),
            Tool::Point(t) => t.is_active(),
            Tool::Line(t) => t.is_active(),
            Tool::PolyLine(t) => t.is_active(),
            Tool::Curve(t) => t.is_active(),
            Tool::Box(t) => t.is_active(),
            Tool::Path(t) => t.is_active(),
            Tool::Guide(t) => t.is_active(),
        }
    }
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    pub(crate) tool: Tool,
    /// Style to apply to new shapes.
    pub current_style: StyleId,
}

impl ToolManager {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            current_tool: ToolKind::default(),
            tool: Tool::for_kind(ToolKind::default(), settings),
            current_style: settings.default_style.clone(),
        }
    }

    /// Replace the active tool. The caller cleans the old one first.
    pub fn set_tool(&mut self, kind: ToolKind, settings: &EditorSettings) {
        self.current_tool = kind;
        self.tool = Tool::for_kind(kind, settings);
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    /// Switch the path tool's delegate. The segment in progress, if any, is
    /// dropped on the next event.
    pub fn set_path_sub_tool(&mut self, sub_tool: PathSubTool) -> bool {
        match &mut self.tool {
            Tool::Path(path) => {
                path.set_sub_tool(sub_tool);
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.tool.is_active()
    }
}

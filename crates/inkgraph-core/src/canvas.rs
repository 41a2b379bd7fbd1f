//! Canvas: the document plus the runtime editing state around it.

use kurbo::Point;

use crate::document::Document;
use crate::editing::Clipboard;
use crate::filters::FilterPipeline;
use crate::graph::Shape;
use crate::hit_test::HitTest;
use crate::input::{Modifiers, MouseButton, PointerEvent};
use crate::selection::SelectionState;
use crate::settings::EditorSettings;
use crate::tools::{PathSubTool, ToolContext, ToolHandler, ToolKind, ToolManager};

type ToolEvent = fn(&mut dyn ToolHandler, &mut ToolContext<'_>, Point, Modifiers) -> bool;

/// A document being edited.
#[derive(Debug)]
pub struct Canvas {
    /// The document being edited.
    pub document: Document,
    /// Preview shapes of the gesture in progress, drawn over the document.
    pub working: Vec<Shape>,
    pub selection: SelectionState,
    pub settings: EditorSettings,
    /// Tool manager.
    pub tools: ToolManager,
    pub filters: FilterPipeline,
    /// View scale. Only the hit radius depends on it.
    pub zoom: f64,
    pub(crate) clipboard: Option<Clipboard>,
    captured: bool,
    needs_redraw: bool,
    last_pointer: Point,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::default())
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        Self::with_document(Document::new(), settings)
    }

    /// Create a canvas with an existing document.
    pub fn with_document(document: Document, settings: EditorSettings) -> Self {
        Self {
            document,
            working: Vec::new(),
            selection: SelectionState::new(),
            tools: ToolManager::new(&settings),
            settings,
            filters: FilterPipeline::default(),
            zoom: 1.0,
            clipboard: None,
            captured: false,
            needs_redraw: true,
            last_pointer: Point::ZERO,
        }
    }

    /// Hit testing at the current zoom.
    pub fn hit_test(&self) -> HitTest {
        HitTest::for_zoom(self.settings.hit_radius, self.zoom)
    }

    /// Set the current tool, cancelling the gesture of the previous one.
    pub fn set_tool(&mut self, kind: ToolKind) {
        if self.tools.is_active() {
            self.clean(self.last_pointer, Modifiers::empty());
        }
        self.tools.set_tool(kind, &self.settings);
        log::debug!("Tool set to {kind:?}");
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    /// Switch the path tool's delegate and remember it as the default.
    pub fn set_path_sub_tool(&mut self, sub_tool: PathSubTool) {
        self.settings.path_sub_tool = sub_tool;
        self.tools.set_path_sub_tool(sub_tool);
    }

    /// Whether the active tool holds pointer capture.
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub(crate) fn request_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Read and reset the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    fn dispatch(&mut self, point: Point, modifiers: Modifiers, event: ToolEvent) -> bool {
        self.last_pointer = point;
        let hit = self.hit_test();
        let mut ctx = ToolContext::new(
            &mut self.document,
            &mut self.working,
            &mut self.selection,
            &self.settings,
            &mut self.filters,
            hit,
            &self.tools.current_style,
            &mut self.captured,
            &mut self.needs_redraw,
        );
        let redraw = event(self.tools.tool.handler(), &mut ctx, point, modifiers);
        if redraw {
            self.needs_redraw = true;
        }
        redraw
    }

    pub fn left_down(&mut self, point: Point, modifiers: Modifiers) -> bool {
        self.dispatch(point, modifiers, |tool, ctx, p, m| tool.left_down(ctx, p, m))
    }

    pub fn left_up(&mut self, point: Point, modifiers: Modifiers) -> bool {
        self.dispatch(point, modifiers, |tool, ctx, p, m| tool.left_up(ctx, p, m))
    }

    pub fn right_down(&mut self, point: Point, modifiers: Modifiers) -> bool {
        self.dispatch(point, modifiers, |tool, ctx, p, m| tool.right_down(ctx, p, m))
    }

    pub fn right_up(&mut self, point: Point, modifiers: Modifiers) -> bool {
        self.dispatch(point, modifiers, |tool, ctx, p, m| tool.right_up(ctx, p, m))
    }

    pub fn pointer_move(&mut self, point: Point, modifiers: Modifiers) -> bool {
        self.dispatch(point, modifiers, |tool, ctx, p, m| tool.pointer_move(ctx, p, m))
    }

    /// Cancel the gesture in progress.
    pub fn clean(&mut self, point: Point, modifiers: Modifiers) -> bool {
        self.dispatch(point, modifiers, |tool, ctx, p, m| tool.clean(ctx, p, m))
    }

    /// Route a pointer event to the matching handler.
    pub fn handle_pointer_event(&mut self, event: PointerEvent, modifiers: Modifiers) -> bool {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => self.left_down(position, modifiers),
            PointerEvent::Down {
                position,
                button: MouseButton::Right,
            } => self.right_down(position, modifiers),
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => self.left_up(position, modifiers),
            PointerEvent::Up {
                position,
                button: MouseButton::Right,
            } => self.right_up(position, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position, modifiers),
        }
    }
}

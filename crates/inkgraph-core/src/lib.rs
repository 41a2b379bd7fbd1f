//! InkGraph Core Library
//!
//! Shape graph over a shared point arena, hit testing, selection, point
//! filters and the tool state machines of the InkGraph vector editor.

pub mod canvas;
pub mod document;
pub mod editing;
pub mod filters;
pub mod geometry;
pub mod graph;
pub mod hit_test;
pub mod input;
pub mod intersections;
pub mod selection;
pub mod settings;
pub mod storage;
pub mod style;
pub mod tools;

pub use canvas::Canvas;
pub use document::Document;
pub use editing::Clipboard;
pub use filters::{FilterPipeline, GridFilter, LineSnapFilter, PointFilter};
pub use graph::{GraphError, GraphResult, PointArena, PointId, Shape, ShapeId};
pub use hit_test::HitTest;
pub use input::{Modifiers, MouseButton, PointerEvent};
pub use selection::{ElementId, SelectionState};
pub use settings::{EditorSettings, SettingsError, GRID_SIZE};
pub use style::{DEFAULT_STYLE, GUIDE_STYLE, ShapeStyle, StyleId, StyleLibrary};
pub use tools::{PathSubTool, ToolKind, ToolManager};

//! Scripted editing sessions.
//!
//! A script is a JSON array of entries. Pointer entries drive the active
//! tool, command entries run editing commands:
//!
//! ```json
//! [
//!   { "tool": "Line", "event": "left_down", "x": 0, "y": 0 },
//!   { "event": "left_down", "x": 100, "y": 0, "modifiers": "SHIFT" },
//!   { "command": "select_all" }
//! ]
//! ```

use std::path::{Path, PathBuf};

use inkgraph_core::storage::{FileStorage, Storage, StorageError};
use inkgraph_core::{Canvas, Document, Modifiers, PathSubTool, SettingsError, ToolKind};
use inkgraph_render::{Placement, RecordingRenderer, RendererError, SelectionDecorator, draw_canvas};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors of a headless run.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Usage: {0}")]
    Usage(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Render(#[from] RendererError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Pointer event a script entry delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    Move,
    /// Cancel the gesture in progress.
    Clean,
}

/// Editing command a script entry runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Copy,
    Cut,
    Paste,
    Delete,
    Group,
    Ungroup,
    SelectAll,
    DeselectAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptEntry {
    Pointer {
        /// Tool to switch to before delivering the event.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<ToolKind>,
        event: EventKind,
        x: f64,
        y: f64,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Command {
        command: Command,
    },
    SubTool {
        sub_tool: PathSubTool,
    },
    /// Rotate the selection, in degrees.
    Rotate {
        rotate: f64,
    },
}

pub fn parse_script(json: &str) -> SessionResult<Vec<ScriptEntry>> {
    Ok(serde_json::from_str(json)?)
}

pub fn read_script(path: &Path) -> SessionResult<Vec<ScriptEntry>> {
    let json = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&json)
}

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub events: usize,
    pub commands: usize,
    pub redraws: usize,
}

/// A canvas driven by script entries.
#[derive(Debug)]
pub struct Session {
    pub canvas: Canvas,
}

impl Session {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    /// Apply one entry. Returns whether the canvas wants a redraw.
    pub fn apply(&mut self, entry: &ScriptEntry) -> bool {
        match *entry {
            ScriptEntry::Pointer {
                tool,
                event,
                x,
                y,
                modifiers,
            } => {
                if let Some(kind) = tool {
                    if kind != self.canvas.current_tool() {
                        self.canvas.set_tool(kind);
                    }
                }
                let point = Point::new(x, y);
                match event {
                    EventKind::LeftDown => self.canvas.left_down(point, modifiers),
                    EventKind::LeftUp => self.canvas.left_up(point, modifiers),
                    EventKind::RightDown => self.canvas.right_down(point, modifiers),
                    EventKind::RightUp => self.canvas.right_up(point, modifiers),
                    EventKind::Move => self.canvas.pointer_move(point, modifiers),
                    EventKind::Clean => self.canvas.clean(point, modifiers),
                }
            }
            ScriptEntry::Command { command } => self.run_command(command),
            ScriptEntry::SubTool { sub_tool } => {
                self.canvas.set_path_sub_tool(sub_tool);
                false
            }
            ScriptEntry::Rotate { rotate } => self.canvas.rotate_selected(rotate.to_radians()) > 0,
        }
    }

    fn run_command(&mut self, command: Command) -> bool {
        log::debug!("Running {command:?}");
        let canvas = &mut self.canvas;
        match command {
            Command::Copy => {
                canvas.copy();
                false
            }
            Command::Cut => canvas.cut() > 0,
            Command::Paste => !canvas.paste().is_empty(),
            Command::Delete => canvas.delete_selected() > 0,
            Command::Group => canvas.group_selected().is_some(),
            Command::Ungroup => !canvas.ungroup_selected().is_empty(),
            Command::SelectAll => canvas.select_all(),
            Command::DeselectAll => canvas.deselect_all(),
        }
    }

    /// Apply every entry in order.
    pub fn run(&mut self, entries: &[ScriptEntry]) -> SessionSummary {
        let mut summary = SessionSummary::default();
        for entry in entries {
            match entry {
                ScriptEntry::Command { .. } | ScriptEntry::Rotate { .. } => summary.commands += 1,
                _ => summary.events += 1,
            }
            if self.apply(entry) {
                summary.redraws += 1;
            }
        }
        // Leave no gesture half done.
        if self.canvas.tools.is_active() {
            let last = entries.iter().rev().find_map(|entry| match entry {
                ScriptEntry::Pointer { x, y, .. } => Some(Point::new(*x, *y)),
                _ => None,
            });
            self.canvas.clean(last.unwrap_or(Point::ZERO), Modifiers::empty());
        }
        log::info!(
            "Replayed {} events and {} commands ({} redraws)",
            summary.events,
            summary.commands,
            summary.redraws
        );
        summary
    }

    /// Draw the canvas through a recording renderer.
    pub fn render(&self) -> SessionResult<RecordingRenderer> {
        let mut renderer = RecordingRenderer::new();
        let drawn = draw_canvas(
            &mut renderer,
            &self.canvas,
            &SelectionDecorator::new(),
            Placement::new(0.0, 0.0, self.canvas.zoom),
        )?;
        log::info!("Rendered {drawn} shapes in {} draw calls", renderer.commands().len());
        Ok(renderer)
    }
}

/// Storage rooted at a file's directory, plus the file's id in it.
fn storage_for(path: &Path) -> SessionResult<(FileStorage, String)> {
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SessionError::Usage(format!("not a document path: {}", path.display())))?
        .to_string();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok((FileStorage::new(dir.to_path_buf())?, id))
}

pub async fn load_document(path: &Path) -> SessionResult<Document> {
    let (storage, id) = storage_for(path)?;
    Ok(storage.load(&id).await?)
}

pub async fn save_document(path: &Path, document: &Document) -> SessionResult<()> {
    let (storage, id) = storage_for(path)?;
    storage.save(&id, document).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkgraph_core::Shape;

    const TRIANGLE: &str = r#"[
        { "tool": "PolyLine", "event": "left_down", "x": 0, "y": 0 },
        { "event": "left_down", "x": 100, "y": 0 },
        { "event": "left_down", "x": 50, "y": 80 },
        { "event": "right_down", "x": 50, "y": 80 }
    ]"#;

    #[test]
    fn test_parse_entries() {
        let entries = parse_script(
            r#"[
                { "tool": "Line", "event": "left_down", "x": 1, "y": 2, "modifiers": "SHIFT | CONTROL" },
                { "command": "select_all" },
                { "sub_tool": "CubicBezier" },
                { "rotate": 90 }
            ]"#,
        )
        .unwrap();
        assert_eq!(
            entries[0],
            ScriptEntry::Pointer {
                tool: Some(ToolKind::Line),
                event: EventKind::LeftDown,
                x: 1.0,
                y: 2.0,
                modifiers: Modifiers::SHIFT | Modifiers::CONTROL,
            }
        );
        assert_eq!(entries[1], ScriptEntry::Command { command: Command::SelectAll });
        assert_eq!(entries[2], ScriptEntry::SubTool { sub_tool: PathSubTool::CubicBezier });
        assert_eq!(entries[3], ScriptEntry::Rotate { rotate: 90.0 });
    }

    #[test]
    fn test_bad_script_is_an_error() {
        assert!(matches!(parse_script(r#"[{ "event": "jump" }]"#), Err(SessionError::Script(_))));
    }

    #[test]
    fn test_line_session() {
        let entries = parse_script(
            r#"[
                { "tool": "Line", "event": "left_down", "x": 0, "y": 0 },
                { "event": "move", "x": 50, "y": 50 },
                { "event": "left_down", "x": 100, "y": 100 }
            ]"#,
        )
        .unwrap();
        let mut session = Session::new(Canvas::new());
        let summary = session.run(&entries);

        assert_eq!(summary.events, 3);
        assert_eq!(summary.commands, 0);
        assert_eq!(session.canvas.document.len(), 1);
        assert!(matches!(session.canvas.document.shapes[0], Shape::Line(_)));
    }

    #[test]
    fn test_unfinished_gesture_is_cleaned() {
        let entries = parse_script(r#"[{ "tool": "Rectangle", "event": "left_down", "x": 5, "y": 5 }]"#).unwrap();
        let mut session = Session::new(Canvas::new());
        session.run(&entries);

        assert!(session.canvas.working.is_empty());
        assert!(session.canvas.document.is_empty());
        assert!(session.canvas.document.points.is_empty());
    }

    #[test]
    fn test_commands_run_in_order() {
        let mut entries = parse_script(TRIANGLE).unwrap();
        entries.extend(
            parse_script(r#"[{ "command": "select_all" }, { "command": "copy" }, { "command": "paste" }]"#).unwrap(),
        );
        let mut session = Session::new(Canvas::new());
        let summary = session.run(&entries);

        assert_eq!(summary.commands, 3);
        assert_eq!(session.canvas.document.len(), 4);
        assert_eq!(session.canvas.selection.selected_shapes().count(), 2);
    }

    #[test]
    fn test_render_counts_draw_calls() {
        let entries = parse_script(
            r#"[
                { "tool": "Rectangle", "event": "left_down", "x": 0, "y": 0 },
                { "event": "left_down", "x": 40, "y": 30 }
            ]"#,
        )
        .unwrap();
        let mut session = Session::new(Canvas::new());
        session.run(&entries);

        let renderer = session.render().unwrap();
        assert_eq!(renderer.count("rectangle"), 1);
    }

    #[test]
    fn test_document_round_trip_through_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drawing.json");
        let mut session = Session::new(Canvas::new());
        session.run(&parse_script(TRIANGLE).unwrap());

        pollster::block_on(save_document(&path, &session.canvas.document)).unwrap();
        assert!(path.exists());
        let loaded = pollster::block_on(load_document(&path)).unwrap();
        assert_eq!(loaded.len(), session.canvas.document.len());
        assert_eq!(loaded.points.len(), session.canvas.document.points.len());
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = pollster::block_on(load_document(&dir.path().join("absent.json")));
        assert!(matches!(result, Err(SessionError::Storage(StorageError::NotFound(_)))));
    }
}

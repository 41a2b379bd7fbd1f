//! Editor settings: hit radius, snapping, connect behavior and tool defaults.

use std::fs;
use std::path::Path;

use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::style::{DEFAULT_STYLE, StyleId};
use crate::tools::PathSubTool;

/// Hit radius in screen pixels.
pub const DEFAULT_HIT_RADIUS: f64 = 6.0;

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Distance within which the line filter snaps, in world units.
pub const LINE_SNAP_THRESHOLD: f64 = 8.0;

/// Drag distance past which a Control-drag disconnects the dragged point.
pub const DISCONNECT_RADIUS: f64 = 10.0;

/// Weight given to new conic segments.
pub const DEFAULT_CONIC_WEIGHT: f64 = 0.707_106_781_186_547_6;

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// User-tunable editor behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Hit radius in screen pixels; divided by zoom before use.
    pub hit_radius: f64,
    pub grid_pitch: f64,
    pub grid_origin: Point,
    /// Round new coordinates to the grid.
    pub grid_snap: bool,
    /// Snap new coordinates to guides and existing points.
    pub line_snap: bool,
    pub line_snap_threshold: f64,
    /// Reuse an existing point under the cursor when drawing.
    pub connect_on_draw: bool,
    /// Shift-drag of a lone point connects it to the point it is dropped on.
    pub try_to_connect_on_drag: bool,
    pub disconnect_radius: f64,
    /// Split new lines where they cross existing lines, rectangles and ellipses.
    pub split_on_intersection: bool,
    /// Style given to newly drawn shapes.
    pub default_style: StyleId,
    pub path_sub_tool: PathSubTool,
    pub conic_weight: f64,
    /// Content of new text boxes.
    pub default_text: String,
    /// Resource key of new images.
    pub image_key: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            hit_radius: DEFAULT_HIT_RADIUS,
            grid_pitch: GRID_SIZE,
            grid_origin: Point::ZERO,
            grid_snap: false,
            line_snap: false,
            line_snap_threshold: LINE_SNAP_THRESHOLD,
            connect_on_draw: true,
            try_to_connect_on_drag: true,
            disconnect_radius: DISCONNECT_RADIUS,
            split_on_intersection: false,
            default_style: DEFAULT_STYLE.to_string(),
            path_sub_tool: PathSubTool::default(),
            conic_weight: DEFAULT_CONIC_WEIGHT,
            default_text: "Text".to_string(),
            image_key: String::new(),
        }
    }
}

impl EditorSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EditorSettings::default();
        assert!(!settings.grid_snap);
        assert!(!settings.line_snap);
        assert!(settings.connect_on_draw);
        assert!((settings.grid_pitch - GRID_SIZE).abs() < f64::EPSILON);
        assert_eq!(settings.default_style, DEFAULT_STYLE);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = EditorSettings::from_json(r#"{ "grid_snap": true, "grid_pitch": 10.0 }"#).unwrap();
        assert!(settings.grid_snap);
        assert!((settings.grid_pitch - 10.0).abs() < f64::EPSILON);
        assert!((settings.hit_radius - DEFAULT_HIT_RADIUS).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            EditorSettings::from_json("{ not json"),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = EditorSettings::default();
        settings.split_on_intersection = true;
        settings.save(&path).unwrap();

        let loaded = EditorSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = EditorSettings::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }
}

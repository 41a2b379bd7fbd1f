//! Styles referenced by id from shapes.

use std::collections::HashMap;

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Identifier a shape uses to reference a [`ShapeStyle`] in a [`StyleLibrary`].
pub type StyleId = String;

/// Style every new library starts with.
pub const DEFAULT_STYLE: &str = "default";

/// Style used for guide lines.
pub const GUIDE_STYLE: &str = "guide";

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Visual properties shared by every shape that references this style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke color.
    pub stroke_color: SerializableColor,
    /// Stroke width.
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    pub fill_color: Option<SerializableColor>,
    /// Dash pattern (empty = solid).
    #[serde(default)]
    pub dashes: Vec<f64>,
    /// Font size used by text shapes.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_font_size() -> f64 {
    16.0
}

impl ShapeStyle {
    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Color {
        with_opacity(self.stroke_color, self.opacity)
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill_color.map(|c| with_opacity(c, self.opacity))
    }

    /// Builder: set the fill color.
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    /// Builder: set the stroke color and width.
    pub fn with_stroke(mut self, color: Color, width: f64) -> Self {
        self.stroke_color = color.into();
        self.stroke_width = width;
        self
    }
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (color.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            dashes: Vec::new(),
            font_size: default_font_size(),
            opacity: 1.0,
        }
    }
}

/// Named styles of a document.
///
/// Point templates are resolved through the same table: a point whose
/// template id names a style gets a glyph drawn with that style.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleLibrary {
    styles: HashMap<StyleId, ShapeStyle>,
}

impl StyleLibrary {
    /// Library with no entries at all.
    pub fn empty() -> Self {
        Self {
            styles: HashMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&ShapeStyle> {
        self.styles.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut ShapeStyle> {
        self.styles.get_mut(id)
    }

    /// Add or replace a style. Returns the previous entry.
    pub fn insert(&mut self, id: impl Into<StyleId>, style: ShapeStyle) -> Option<ShapeStyle> {
        self.styles.insert(id.into(), style)
    }

    pub fn remove(&mut self, id: &str) -> Option<ShapeStyle> {
        self.styles.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

impl Default for StyleLibrary {
    fn default() -> Self {
        let mut library = Self::empty();
        library.insert(DEFAULT_STYLE, ShapeStyle::default());
        library.insert(
            GUIDE_STYLE,
            ShapeStyle {
                stroke_color: SerializableColor::new(0, 160, 255, 255),
                stroke_width: 1.0,
                dashes: vec![4.0, 4.0],
                ..ShapeStyle::default()
            },
        );
        library
    }
}

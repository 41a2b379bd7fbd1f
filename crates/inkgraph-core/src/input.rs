//! Pointer events and modifier keys delivered by the host shell.

use kurbo::Point;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Modifier keys held during a pointer event.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        const SHIFT   = 0b0000_0001;
        const CONTROL = 0b0000_0010;
        const ALT     = 0b0000_0100;
        const META    = 0b0000_1000;
    }
}

impl Modifiers {
    pub fn shift(self) -> bool {
        self.contains(Self::SHIFT)
    }

    pub fn control(self) -> bool {
        self.contains(Self::CONTROL)
    }
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

/// Pointer event in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Up { position: Point, button: MouseButton },
    Move { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Up { position, .. }
            | PointerEvent::Move { position } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_queries() {
        let mods = Modifiers::SHIFT | Modifiers::CONTROL;
        assert!(mods.shift());
        assert!(mods.control());
        assert!(!Modifiers::empty().shift());
    }

    #[test]
    fn test_event_json() {
        let event = PointerEvent::Down {
            position: Point::new(1.0, 2.0),
            button: MouseButton::Left,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: PointerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.position(), Point::new(1.0, 2.0));

        let mods: Modifiers = serde_json::from_str("\"SHIFT | CONTROL\"").unwrap();
        assert_eq!(mods, Modifiers::SHIFT | Modifiers::CONTROL);
    }
}

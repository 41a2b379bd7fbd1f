//! Selected and hovered elements.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::graph::{PointId, ShapeId};

/// Something the user can select: a shape or a single shared point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementId {
    Shape(ShapeId),
    Point(PointId),
}

impl ElementId {
    pub fn as_shape(self) -> Option<ShapeId> {
        match self {
            ElementId::Shape(id) => Some(id),
            ElementId::Point(_) => None,
        }
    }

    pub fn as_point(self) -> Option<PointId> {
        match self {
            ElementId::Point(id) => Some(id),
            ElementId::Shape(_) => None,
        }
    }
}

impl From<PointId> for ElementId {
    fn from(id: PointId) -> Self {
        ElementId::Point(id)
    }
}

/// Selection state shared by every tool.
///
/// Hover is tracked apart from the selected set: it decorates an element
/// without selecting it, and can be cleared on its own.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    /// Currently selected elements.
    selected: HashSet<ElementId>,
    /// Element currently under the pointer.
    hovered: Option<ElementId>,
    /// Points selected only for the gesture in progress.
    transient: HashSet<PointId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an element is selected.
    pub fn is_selected(&self, element: ElementId) -> bool {
        self.selected.contains(&element)
    }

    pub fn is_shape_selected(&self, id: ShapeId) -> bool {
        self.is_selected(ElementId::Shape(id))
    }

    pub fn is_point_selected(&self, id: PointId) -> bool {
        self.is_selected(ElementId::Point(id))
    }

    /// Selected or hovered: anything that should get a decoration.
    pub fn is_decorated(&self, element: ElementId) -> bool {
        self.hovered == Some(element) || self.is_selected(element)
    }

    /// Add an element. Returns `true` if it was not selected yet.
    pub fn select(&mut self, element: ElementId) -> bool {
        self.selected.insert(element)
    }

    /// Remove an element. Returns `true` if it was selected.
    pub fn deselect(&mut self, element: ElementId) -> bool {
        self.selected.remove(&element)
    }

    /// Select a point on behalf of the gesture in progress.
    ///
    /// Returns `true` if it was not selected yet. Only such points are
    /// deselected again by [`release_transient`](Self::release_transient).
    pub fn select_transient(&mut self, point: PointId) -> bool {
        let added = self.select(ElementId::Point(point));
        if added {
            self.transient.insert(point);
        }
        added
    }

    /// Deselect a point selected by [`select_transient`](Self::select_transient).
    /// Points selected before the gesture stay selected.
    pub fn release_transient(&mut self, point: PointId) -> bool {
        self.transient.remove(&point) && self.deselect(ElementId::Point(point))
    }

    /// Clear the selection. Hover is left alone.
    pub fn clear(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        self.transient.clear();
        changed
    }

    /// Replace the whole selection.
    pub fn replace(&mut self, elements: HashSet<ElementId>) {
        self.selected = elements;
        self.transient.clear();
    }

    /// Get all selected elements.
    pub fn selected(&self) -> &HashSet<ElementId> {
        &self.selected
    }

    /// Selected shape ids, in no particular order.
    pub fn selected_shapes(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.selected.iter().filter_map(|e| e.as_shape())
    }

    /// Selected point ids, in no particular order.
    pub fn selected_points(&self) -> impl Iterator<Item = PointId> + '_ {
        self.selected.iter().filter_map(|e| e.as_point())
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Get the hovered element (if any).
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Set the hovered element. Returns `true` if it changed.
    pub fn set_hovered(&mut self, element: Option<ElementId>) -> bool {
        let changed = self.hovered != element;
        self.hovered = element;
        changed
    }

    pub fn clear_hover(&mut self) -> bool {
        self.set_hovered(None)
    }

    /// Forget an element that no longer exists.
    pub fn remove(&mut self, element: ElementId) {
        self.selected.remove(&element);
        if let ElementId::Point(point) = element {
            self.transient.remove(&point);
        }
        if self.hovered == Some(element) {
            self.hovered = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_select_is_idempotent() {
        let mut selection = SelectionState::new();
        let id = ElementId::Shape(Uuid::new_v4());
        assert!(selection.select(id));
        assert!(!selection.select(id));
        assert_eq!(selection.len(), 1);
        assert!(selection.deselect(id));
        assert!(!selection.deselect(id));
    }

    #[test]
    fn test_hover_is_not_selection() {
        let mut selection = SelectionState::new();
        let id = ElementId::Shape(Uuid::new_v4());
        assert!(selection.set_hovered(Some(id)));
        assert!(!selection.is_selected(id));
        assert!(selection.is_decorated(id));
        assert!(selection.is_empty());

        selection.select(id);
        assert!(selection.clear_hover());
        assert!(selection.is_selected(id));
    }

    #[test]
    fn test_clear_keeps_hover() {
        let mut selection = SelectionState::new();
        let a = ElementId::Shape(Uuid::new_v4());
        let b = ElementId::Shape(Uuid::new_v4());
        selection.select(a);
        selection.set_hovered(Some(b));

        assert!(selection.clear());
        assert!(!selection.clear());
        assert_eq!(selection.hovered(), Some(b));
    }

    #[test]
    fn test_transient_release_keeps_prior_selection() {
        let mut selection = SelectionState::new();
        let mut arena = crate::graph::PointArena::new();
        let kept = arena.add(kurbo::Point::ZERO);
        let fresh = arena.add(kurbo::Point::new(1.0, 1.0));
        selection.select(ElementId::Point(kept));

        assert!(!selection.select_transient(kept));
        assert!(selection.select_transient(fresh));
        assert!(!selection.release_transient(kept));
        assert!(selection.release_transient(fresh));

        assert!(selection.is_point_selected(kept));
        assert!(!selection.is_point_selected(fresh));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_remove_drops_hover() {
        let mut selection = SelectionState::new();
        let a = ElementId::Shape(Uuid::new_v4());
        selection.select(a);
        selection.set_hovered(Some(a));
        selection.remove(a);
        assert!(selection.is_empty());
        assert!(selection.hovered().is_none());
    }
}

//! Editing commands over the current selection.
//!
//! Every command takes `&mut Canvas`, so the selection cannot change under
//! a command while it runs.

use std::collections::HashSet;

use kurbo::{Point, Rect};

use crate::canvas::Canvas;
use crate::geometry::rotate_point;
use crate::graph::{GroupShape, PointArena, PointId, Shape, ShapeId, copy_shapes};
use crate::selection::ElementId;

/// Copied shapes with their own point arena, independent of the document.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    pub points: PointArena,
    pub shapes: Vec<Shape>,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl Canvas {
    /// Selected root shapes, in z-order.
    fn selected_roots(&self) -> Vec<ShapeId> {
        self.document
            .shapes
            .iter()
            .map(Shape::id)
            .filter(|id| self.selection.is_shape_selected(*id))
            .collect()
    }

    pub fn clipboard(&self) -> Option<&Clipboard> {
        self.clipboard.as_ref()
    }

    /// Copy the selected shapes. Returns how many reached the clipboard.
    pub fn copy(&mut self) -> usize {
        let ids: HashSet<ShapeId> = self.selected_roots().into_iter().collect();
        let selected: Vec<Shape> = self.document.root_shapes(&ids).cloned().collect();
        if selected.is_empty() {
            return 0;
        }
        let mut clipboard = Clipboard::default();
        let (shapes, _) = copy_shapes(&selected, &self.document.points, &mut clipboard.points);
        let count = shapes.len();
        clipboard.shapes = shapes;
        self.clipboard = Some(clipboard);
        log::info!("Copied {count} shapes");
        count
    }

    /// Copy, then delete the selection.
    pub fn cut(&mut self) -> usize {
        let count = self.copy();
        self.delete_selected();
        count
    }

    /// Add a fresh copy of the clipboard and select it.
    pub fn paste(&mut self) -> Vec<ShapeId> {
        let Some(clipboard) = self.clipboard.as_ref().filter(|c| !c.is_empty()) else {
            return Vec::new();
        };
        let (copies, _) = copy_shapes(&clipboard.shapes, &clipboard.points, &mut self.document.points);
        self.selection.clear();
        let mut ids = Vec::with_capacity(copies.len());
        for shape in copies {
            shape.select(&mut self.selection);
            ids.push(self.document.add_shape(shape));
        }
        self.request_redraw();
        log::info!("Pasted {} shapes", ids.len());
        ids
    }

    /// Delete every selected element, then drop points nothing references.
    ///
    /// Shapes go first, so a selected point of a deleted shape is simply gone
    /// by the time its turn comes.
    pub fn delete_selected(&mut self) -> usize {
        let mut elements: Vec<ElementId> = self.selection.selected().iter().copied().collect();
        elements.sort_by_key(|e| matches!(e, ElementId::Point(_)));
        let mut removed = 0;
        for element in elements {
            if let ElementId::Point(point) = element {
                if !self.document.points.is_alive(point) {
                    continue;
                }
            }
            if self.document.remove_element(element) {
                removed += 1;
            }
        }
        self.selection.clear();
        self.selection.clear_hover();
        self.document.prune_points(&self.working);
        if removed > 0 {
            self.request_redraw();
            log::info!("Deleted {removed} elements");
        }
        removed
    }

    /// Move the selected root shapes into a new group and select it.
    ///
    /// Bare points are not grouped; they stay where they are.
    pub fn group_selected(&mut self) -> Option<ShapeId> {
        let ids = self.selected_roots();
        let members: Vec<ShapeId> = ids
            .into_iter()
            .filter(|id| {
                self.document
                    .find_shape(*id)
                    .is_some_and(|s| !matches!(s, Shape::Point(_)))
            })
            .collect();
        if members.is_empty() {
            return None;
        }
        let shapes: Vec<Shape> = members
            .iter()
            .filter_map(|id| self.document.remove_shape(*id))
            .collect();
        let group = GroupShape::new(shapes, self.tools.current_style.clone());
        let group = Shape::Group(group);
        self.selection.clear();
        group.select(&mut self.selection);
        let id = self.document.add_shape(group);
        self.request_redraw();
        log::info!("Grouped {} shapes into {id}", members.len());
        Some(id)
    }

    /// Replace each selected group by its children, in place.
    pub fn ungroup_selected(&mut self) -> Vec<ShapeId> {
        let groups: Vec<ShapeId> = self
            .selected_roots()
            .into_iter()
            .filter(|id| matches!(self.document.find_shape(*id), Some(Shape::Group(_))))
            .collect();
        let mut children = Vec::new();
        for group_id in groups {
            let Some(index) = self.document.shapes.iter().position(|s| s.id() == group_id) else {
                continue;
            };
            let Shape::Group(group) = self.document.shapes.remove(index) else {
                continue;
            };
            self.selection.remove(ElementId::Shape(group_id));
            let members = group.into_children();
            for (offset, child) in members.into_iter().enumerate() {
                child.select(&mut self.selection);
                children.push(child.id());
                self.document.shapes.insert(index + offset, child);
            }
            log::info!("Ungrouped {group_id}");
        }
        if !children.is_empty() {
            self.document.prune_points(&self.working);
            self.request_redraw();
        }
        children
    }

    /// Rotate the selection by `angle` radians around the center of its
    /// points. Shared points turn once. Returns how many points moved.
    pub fn rotate_selected(&mut self, angle: f64) -> usize {
        let mut seen = HashSet::new();
        let mut targets: Vec<(PointId, Point)> = Vec::new();
        for element in self.selection.selected() {
            let points: Vec<PointId> = match element {
                ElementId::Point(point) => vec![*point],
                ElementId::Shape(id) => self
                    .document
                    .find_shape(*id)
                    .map(|s| s.points().collect())
                    .unwrap_or_default(),
            };
            for point in points {
                if !seen.insert(point) {
                    continue;
                }
                if let Some(position) = self.document.points.position(point) {
                    targets.push((point, position));
                }
            }
        }
        let Some(bounds) = targets
            .iter()
            .map(|(_, p)| Rect::from_points(*p, *p))
            .reduce(|a, b| a.union(b))
        else {
            return 0;
        };
        let center = bounds.center();
        for (point, position) in &targets {
            self.document
                .points
                .set_position(*point, rotate_point(*position, center, angle));
        }
        self.request_redraw();
        log::info!("Rotated {} points by {angle} rad", targets.len());
        targets.len()
    }

    /// Select every root shape and its points.
    pub fn select_all(&mut self) -> bool {
        let mut changed = false;
        for shape in &self.document.shapes {
            changed |= shape.select(&mut self.selection);
        }
        if changed {
            self.request_redraw();
        }
        changed
    }

    pub fn deselect_all(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.request_redraw();
        }
        changed
    }
}

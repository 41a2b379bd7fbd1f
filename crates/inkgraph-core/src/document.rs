//! The persisted drawing: point arena, root shapes, guides and styles.

use std::collections::HashSet;

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::graph::{
    LineShape, PointArena, PointId, PointShape, Shape, ShapeId, distinct_points, remove_element,
};
use crate::selection::ElementId;
use crate::style::StyleLibrary;

/// A drawing document.
///
/// `shapes` is the root container, back to front: the last shape is drawn on top.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// Every point referenced by the document's shapes.
    pub points: PointArena,
    /// Root shapes in z-order (back to front).
    pub shapes: Vec<Shape>,
    /// Guide lines used by snapping.
    #[serde(default)]
    pub guides: Vec<LineShape>,
    /// Styles referenced by id from shapes.
    #[serde(default)]
    pub styles: StyleLibrary,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            points: PointArena::new(),
            shapes: Vec::new(),
            guides: Vec::new(),
            styles: StyleLibrary::default(),
        }
    }

    /// Add a shape on top of the root container.
    pub fn add_shape(&mut self, mut shape: Shape) -> ShapeId {
        let id = shape.id();
        shape.set_owner(None);
        shape.adopt_points(&mut self.points);
        self.shapes.push(shape);
        id
    }

    /// Place a free point shape at `position`.
    pub fn add_point(&mut self, position: Point, style: &str) -> (ShapeId, PointId) {
        let point = self.points.add(position);
        let id = self.add_shape(Shape::Point(PointShape::new(point, style)));
        (id, point)
    }

    /// Remove a root shape. No-op if absent.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id() == id)?;
        Some(self.shapes.remove(index))
    }

    /// Whether `id` is a root shape.
    pub fn contains_shape(&self, id: ShapeId) -> bool {
        self.shapes.iter().any(|s| s.id() == id)
    }

    /// Find a shape anywhere in the tree.
    pub fn find_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find_map(|s| s.find(id))
    }

    pub fn find_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find_map(|s| s.find_mut(id))
    }

    /// Root shapes whose ids are in `ids`, in z-order.
    pub fn root_shapes<'a>(&'a self, ids: &'a HashSet<ShapeId>) -> impl Iterator<Item = &'a Shape> {
        self.shapes.iter().filter(move |s| ids.contains(&s.id()))
    }

    pub fn add_guide(&mut self, guide: LineShape) -> ShapeId {
        let id = guide.meta.id;
        for point in [guide.start, guide.end] {
            if self.points.owner(point).is_none() {
                self.points.set_owner(point, Some(id));
            }
        }
        self.guides.push(guide);
        id
    }

    pub fn remove_guide(&mut self, id: ShapeId) -> Option<LineShape> {
        let index = self.guides.iter().position(|g| g.meta.id == id)?;
        Some(self.guides.remove(index))
    }

    /// Remove a selected element wherever it lives.
    ///
    /// Root shapes and guides are removed directly. Otherwise the element is
    /// searched for as an extra point of a connectable shape, as a segment
    /// of a path figure, or as a group member; emptied figures, paths and
    /// groups are removed with it.
    pub fn remove_element(&mut self, element: ElementId) -> bool {
        if let ElementId::Shape(id) = element {
            if self.remove_guide(id).is_some() {
                return true;
            }
        }
        remove_element(&mut self.shapes, element)
    }

    /// Points reachable from the root shapes, the guides and `extra` shapes.
    pub fn reachable_points(&self, extra: &[Shape]) -> HashSet<PointId> {
        let mut reachable: HashSet<PointId> = distinct_points(&self.shapes).into_iter().collect();
        reachable.extend(distinct_points(extra));
        for guide in &self.guides {
            reachable.insert(guide.start);
            reachable.insert(guide.end);
            reachable.extend(guide.points.iter().copied());
        }
        reachable
    }

    /// Drop points no shape references any more.
    ///
    /// `extra` holds shapes outside the document (the working container)
    /// whose points must survive.
    pub fn prune_points(&mut self, extra: &[Shape]) -> usize {
        let reachable = self.reachable_points(extra);
        let pruned = self.points.retain_reachable(&reachable);
        if pruned > 0 {
            log::debug!("Pruned {pruned} dangling points");
        }
        pruned
    }

    /// Bring a shape to the front (topmost).
    pub fn bring_to_front(&mut self, id: ShapeId) -> bool {
        match self.remove_shape(id) {
            Some(shape) => {
                self.shapes.push(shape);
                true
            }
            None => false,
        }
    }

    /// Send a shape to the back (bottommost).
    pub fn send_to_back(&mut self, id: ShapeId) -> bool {
        match self.remove_shape(id) {
            Some(shape) => {
                self.shapes.insert(0, shape);
                true
            }
            None => false,
        }
    }

    /// Get the bounding box of all shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.shapes
            .iter()
            .filter_map(|s| s.bounds(&self.points))
            .reduce(|a, b| a.union(b))
    }

    /// Whether a shape needs repainting, accounting for moved points.
    pub fn is_dirty(&self) -> bool {
        self.shapes.iter().any(|s| s.is_dirty(&self.points))
    }

    /// Reset dirty flags after a render pass.
    pub fn clear_dirty(&mut self) {
        for shape in &mut self.shapes {
            shape.clear_dirty();
        }
        self.points.clear_dirty();
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Serialize the document to JSON.
    ///
    /// Points serialize once, in the arena; shapes refer to them by handle.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

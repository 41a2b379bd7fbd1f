//! Shape graph: shapes holding handles into a shared point arena.

mod arena;
mod curve;
mod group;
mod line;
mod path;
mod point;
mod rect;

pub use arena::{GraphPoint, PointArena, PointId};
pub use curve::{ConicShape, CubicBezierShape, QuadraticBezierShape};
pub use group::GroupShape;
pub use line::LineShape;
pub use path::{Figure, FillRule, PathShape};
pub use point::PointShape;
pub use rect::{BoxShape, ImageShape, TextShape};

use std::collections::{HashMap, HashSet};

use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::selection::{ElementId, SelectionState};
use crate::style::StyleId;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Broken graph invariants. These point at a bug in the caller, not bad input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Point is not alive: {0:?}")]
    StalePoint(PointId),
    #[error("Path has no segments")]
    EmptyPath,
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Corrupt point arena: {0}")]
    CorruptArena(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Fields every shape carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeMeta {
    pub(crate) id: ShapeId,
    /// Style reference, resolved through the document's style library.
    pub style: StyleId,
    /// Container this shape lives in (`None` at the document root).
    #[serde(default)]
    pub owner: Option<ShapeId>,
    #[serde(skip)]
    pub(crate) dirty: bool,
}

impl ShapeMeta {
    pub fn new(style: impl Into<StyleId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            style: style.into(),
            owner: None,
            dirty: true,
        }
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    fn meta(&self) -> &ShapeMeta;

    fn meta_mut(&mut self) -> &mut ShapeMeta;

    /// Get the unique identifier.
    fn id(&self) -> ShapeId {
        self.meta().id
    }

    fn style(&self) -> &str {
        &self.meta().style
    }

    /// Mark the shape's cached rendering stale.
    fn invalidate(&mut self) {
        self.meta_mut().dirty = true;
    }
}

/// Shapes whose geometry is defined by a fixed list of point roles.
pub trait Structural: ShapeTrait {
    /// Structural points in role order.
    fn structural(&self) -> Vec<PointId>;

    fn structural_mut(&mut self) -> Vec<&mut PointId>;

    /// Replace the structural `target` with `point`, sharing it.
    ///
    /// Fails when `point` already plays a role on this shape or `target` plays none.
    fn connect(&mut self, point: PointId, target: PointId) -> bool {
        if point == target || self.structural().contains(&point) {
            return false;
        }
        let Some(slot) = self.structural_mut().into_iter().find(|slot| **slot == target) else {
            return false;
        };
        *slot = point;
        self.invalidate();
        true
    }

    /// Replace the structural `point` with a fresh copy at the same position.
    ///
    /// Returns the copy, or `None` when `point` plays no role on this shape.
    fn disconnect_point(&mut self, point: PointId, arena: &mut PointArena) -> Option<PointId> {
        if !self.structural().contains(&point) {
            return None;
        }
        let copy = arena.copy_point(point)?;
        arena.set_owner(copy, Some(self.id()));
        for slot in self.structural_mut() {
            if *slot == point {
                *slot = copy;
            }
        }
        self.invalidate();
        Some(copy)
    }

    /// Privatize every structural point.
    fn disconnect(&mut self, arena: &mut PointArena) -> bool {
        let mut changed = false;
        for point in self.structural() {
            changed |= self.disconnect_point(point, arena).is_some();
        }
        changed
    }
}

/// Shapes carrying an explicit list of extra attachment points.
pub trait Connectable: Structural {
    fn extra_points(&self) -> &[PointId];

    fn extra_points_mut(&mut self) -> &mut Vec<PointId>;

    /// Attach a free point. Fails if it already plays any role on this shape.
    fn attach(&mut self, point: PointId) -> bool {
        if self.structural().contains(&point) || self.extra_points().contains(&point) {
            return false;
        }
        self.extra_points_mut().push(point);
        self.invalidate();
        true
    }

    /// Detach an extra point. No-op if it is not attached.
    fn detach(&mut self, point: PointId) -> bool {
        let points = self.extra_points_mut();
        let Some(index) = points.iter().position(|p| *p == point) else {
            return false;
        };
        points.remove(index);
        self.invalidate();
        true
    }
}

/// Enum wrapper for all shape types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Shape {
    Point(PointShape),
    Line(LineShape),
    CubicBezier(CubicBezierShape),
    QuadraticBezier(QuadraticBezierShape),
    Conic(ConicShape),
    Rectangle(BoxShape),
    Ellipse(BoxShape),
    Text(TextShape),
    Image(ImageShape),
    Path(PathShape),
    Group(GroupShape),
}

impl Shape {
    pub fn meta(&self) -> &ShapeMeta {
        match self {
            Shape::Point(s) => s.meta(),
            Shape::Line(s) => s.meta(),
            Shape::CubicBezier(s) => s.meta(),
            Shape::QuadraticBezier(s) => s.meta(),
            Shape::Conic(s) => s.meta(),
            Shape::Rectangle(s) | Shape::Ellipse(s) => s.meta(),
            Shape::Text(s) => s.meta(),
            Shape::Image(s) => s.meta(),
            Shape::Path(s) => s.meta(),
            Shape::Group(s) => s.meta(),
        }
    }

    pub fn meta_mut(&mut self) -> &mut ShapeMeta {
        match self {
            Shape::Point(s) => s.meta_mut(),
            Shape::Line(s) => s.meta_mut(),
            Shape::CubicBezier(s) => s.meta_mut(),
            Shape::QuadraticBezier(s) => s.meta_mut(),
            Shape::Conic(s) => s.meta_mut(),
            Shape::Rectangle(s) | Shape::Ellipse(s) => s.meta_mut(),
            Shape::Text(s) => s.meta_mut(),
            Shape::Image(s) => s.meta_mut(),
            Shape::Path(s) => s.meta_mut(),
            Shape::Group(s) => s.meta_mut(),
        }
    }

    pub fn id(&self) -> ShapeId {
        self.meta().id
    }

    pub fn style(&self) -> &str {
        &self.meta().style
    }

    pub fn set_style(&mut self, style: impl Into<StyleId>) {
        let meta = self.meta_mut();
        meta.style = style.into();
        meta.dirty = true;
    }

    pub fn owner(&self) -> Option<ShapeId> {
        self.meta().owner
    }

    pub fn set_owner(&mut self, owner: Option<ShapeId>) {
        self.meta_mut().owner = owner;
    }

    /// Short name of the variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Point(_) => "point",
            Shape::Line(_) => "line",
            Shape::CubicBezier(_) => "cubic",
            Shape::QuadraticBezier(_) => "quadratic",
            Shape::Conic(_) => "conic",
            Shape::Rectangle(_) => "rectangle",
            Shape::Ellipse(_) => "ellipse",
            Shape::Text(_) => "text",
            Shape::Image(_) => "image",
            Shape::Path(_) => "path",
            Shape::Group(_) => "group",
        }
    }

    fn as_structural_mut(&mut self) -> Option<&mut dyn Structural> {
        match self {
            Shape::Point(s) => Some(s),
            Shape::Line(s) => Some(s),
            Shape::CubicBezier(s) => Some(s),
            Shape::QuadraticBezier(s) => Some(s),
            Shape::Conic(s) => Some(s),
            Shape::Rectangle(s) | Shape::Ellipse(s) => Some(s),
            Shape::Text(s) => Some(s),
            Shape::Image(s) => Some(s),
            Shape::Path(_) | Shape::Group(_) => None,
        }
    }

    pub fn as_connectable(&self) -> Option<&dyn Connectable> {
        match self {
            Shape::Line(s) => Some(s),
            Shape::CubicBezier(s) => Some(s),
            Shape::QuadraticBezier(s) => Some(s),
            Shape::Conic(s) => Some(s),
            Shape::Rectangle(s) | Shape::Ellipse(s) => Some(s),
            Shape::Text(s) => Some(s),
            Shape::Image(s) => Some(s),
            Shape::Group(s) => Some(s),
            Shape::Point(_) | Shape::Path(_) => None,
        }
    }

    pub fn as_connectable_mut(&mut self) -> Option<&mut dyn Connectable> {
        match self {
            Shape::Line(s) => Some(s),
            Shape::CubicBezier(s) => Some(s),
            Shape::QuadraticBezier(s) => Some(s),
            Shape::Conic(s) => Some(s),
            Shape::Rectangle(s) | Shape::Ellipse(s) => Some(s),
            Shape::Text(s) => Some(s),
            Shape::Image(s) => Some(s),
            Shape::Group(s) => Some(s),
            Shape::Point(_) | Shape::Path(_) => None,
        }
    }

    /// Direct children of a container shape.
    pub fn children(&self) -> Box<dyn Iterator<Item = &Shape> + '_> {
        match self {
            Shape::Group(g) => Box::new(g.shapes.iter()),
            Shape::Path(p) => Box::new(p.figures.iter().flat_map(|f| f.shapes.iter())),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn children_mut(&mut self) -> Box<dyn Iterator<Item = &mut Shape> + '_> {
        match self {
            Shape::Group(g) => Box::new(g.shapes.iter_mut()),
            Shape::Path(p) => Box::new(p.figures.iter_mut().flat_map(|f| f.shapes.iter_mut())),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Structural points of this shape, not descending into children.
    pub fn structural_points(&self) -> Vec<PointId> {
        match self {
            Shape::Point(s) => s.structural(),
            Shape::Line(s) => s.structural(),
            Shape::CubicBezier(s) => s.structural(),
            Shape::QuadraticBezier(s) => s.structural(),
            Shape::Conic(s) => s.structural(),
            Shape::Rectangle(s) | Shape::Ellipse(s) => s.structural(),
            Shape::Text(s) => s.structural(),
            Shape::Image(s) => s.structural(),
            Shape::Path(_) | Shape::Group(_) => Vec::new(),
        }
    }

    /// Points held by this shape itself: structural then extra.
    pub fn own_points(&self) -> Vec<PointId> {
        let mut points = self.structural_points();
        if let Some(c) = self.as_connectable() {
            points.extend_from_slice(c.extra_points());
        }
        points
    }

    /// All points this shape transitively holds, structural then extra.
    ///
    /// A point shared between two children is yielded once per reference.
    pub fn points(&self) -> Box<dyn Iterator<Item = PointId> + '_> {
        match self {
            Shape::Group(g) => Box::new(
                g.shapes
                    .iter()
                    .flat_map(|s| s.points())
                    .chain(g.points.iter().copied()),
            ),
            Shape::Path(_) => Box::new(self.children().flat_map(|s| s.points())),
            _ => Box::new(self.own_points().into_iter()),
        }
    }

    /// Visit every point slot of this shape and its children.
    pub fn for_each_point_mut(&mut self, f: &mut dyn FnMut(&mut PointId)) {
        for child in self.children_mut() {
            child.for_each_point_mut(f);
        }
        if let Some(s) = self.as_structural_mut() {
            for slot in s.structural_mut() {
                f(slot);
            }
        }
        if let Some(c) = self.as_connectable_mut() {
            for slot in c.extra_points_mut() {
                f(slot);
            }
        }
    }

    /// Visit this shape and every descendant, parents first.
    pub fn for_each_shape(&self, f: &mut dyn FnMut(&Shape)) {
        f(self);
        for child in self.children() {
            child.for_each_shape(f);
        }
    }

    fn for_each_structural_mut(&mut self, f: &mut dyn FnMut(&mut PointId)) {
        for child in self.children_mut() {
            child.for_each_structural_mut(f);
        }
        if let Some(s) = self.as_structural_mut() {
            for slot in s.structural_mut() {
                f(slot);
            }
        }
    }

    fn all_structural_points(&self) -> Vec<PointId> {
        let mut points = Vec::new();
        self.for_each_shape(&mut |s| points.extend(s.structural_points()));
        points
    }

    /// Whether `element` names this shape itself.
    ///
    /// A point element names a free [`PointShape`] holding that point.
    pub fn is_element(&self, element: ElementId) -> bool {
        match element {
            ElementId::Shape(id) => self.id() == id,
            ElementId::Point(point) => matches!(self, Shape::Point(s) if s.point == point),
        }
    }

    /// Find this shape or a descendant by id.
    pub fn find(&self, id: ShapeId) -> Option<&Shape> {
        if self.id() == id {
            return Some(self);
        }
        self.children().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        if self.id() == id {
            return Some(self);
        }
        self.children_mut().find_map(|child| child.find_mut(id))
    }

    /// Containers left without children.
    pub fn is_empty_container(&self) -> bool {
        match self {
            Shape::Group(g) => g.shapes.is_empty(),
            Shape::Path(p) => p.figures.is_empty(),
            _ => false,
        }
    }

    /// Start point of a segment shape.
    pub fn first_point(&self) -> Option<PointId> {
        match self {
            Shape::Point(s) => Some(s.point),
            Shape::Line(s) => Some(s.start),
            Shape::CubicBezier(s) => Some(s.point1),
            Shape::QuadraticBezier(s) => Some(s.point1),
            Shape::Conic(s) => Some(s.point1),
            _ => None,
        }
    }

    /// End point of a segment shape.
    pub fn last_point(&self) -> Option<PointId> {
        match self {
            Shape::Point(s) => Some(s.point),
            Shape::Line(s) => Some(s.end),
            Shape::CubicBezier(s) => Some(s.point4),
            Shape::QuadraticBezier(s) => Some(s.point3),
            Shape::Conic(s) => Some(s.point3),
            _ => None,
        }
    }

    pub fn bounds(&self, arena: &PointArena) -> Option<Rect> {
        match self {
            Shape::Point(s) => s.bounds(arena),
            Shape::Line(s) => s.bounds(arena),
            Shape::CubicBezier(s) => s.bounds(arena),
            Shape::QuadraticBezier(s) => s.bounds(arena),
            Shape::Conic(s) => s.bounds(arena),
            Shape::Rectangle(s) | Shape::Ellipse(s) => s.rect(arena),
            Shape::Text(s) => s.rect(arena),
            Shape::Image(s) => s.rect(arena),
            Shape::Path(s) => s.bounds(arena),
            Shape::Group(s) => s.bounds(arena),
        }
    }

    /// Check if a point (in world coordinates) hits this shape.
    pub fn hit_test(&self, arena: &PointArena, point: Point, tolerance: f64) -> bool {
        match self {
            Shape::Point(s) => s.hit_test(arena, point, tolerance),
            Shape::Line(s) => s.hit_test(arena, point, tolerance),
            Shape::CubicBezier(s) => s.hit_test(arena, point, tolerance),
            Shape::QuadraticBezier(s) => s.hit_test(arena, point, tolerance),
            Shape::Conic(s) => s.hit_test(arena, point, tolerance),
            Shape::Rectangle(s) => s.hit_rectangle(arena, point, tolerance),
            Shape::Ellipse(s) => s.hit_ellipse(arena, point, tolerance),
            Shape::Text(s) => s.hit_test(arena, point, tolerance),
            Shape::Image(s) => s.hit_test(arena, point, tolerance),
            Shape::Path(s) => s.hit_test(arena, point, tolerance),
            Shape::Group(s) => s.hit_test(arena, point, tolerance),
        }
    }

    /// Get the path representation for rendering.
    pub fn to_path(&self, arena: &PointArena) -> BezPath {
        match self {
            Shape::Point(s) => s.to_path(arena),
            Shape::Line(s) => s.to_path(arena),
            Shape::CubicBezier(s) => s.to_path(arena),
            Shape::QuadraticBezier(s) => s.to_path(arena),
            Shape::Conic(s) => s.to_path(arena),
            Shape::Rectangle(s) => s.rectangle_path(arena),
            Shape::Ellipse(s) => s.ellipse_path(arena),
            Shape::Text(s) => s
                .rect(arena)
                .map(|r| kurbo::Shape::to_path(&r, 0.1))
                .unwrap_or_default(),
            Shape::Image(s) => s
                .rect(arena)
                .map(|r| kurbo::Shape::to_path(&r, 0.1))
                .unwrap_or_default(),
            Shape::Path(s) => s.to_path(arena),
            Shape::Group(s) => s.to_path(arena),
        }
    }

    pub fn invalidate(&mut self) {
        self.meta_mut().dirty = true;
    }

    /// Whether this shape, a descendant, or any of its points changed.
    pub fn is_dirty(&self, arena: &PointArena) -> bool {
        self.meta().dirty
            || self.children().any(|c| c.is_dirty(arena))
            || self.points().any(|p| arena.is_dirty(p))
    }

    pub fn clear_dirty(&mut self) {
        self.meta_mut().dirty = false;
        for child in self.children_mut() {
            child.clear_dirty();
        }
    }

    /// Translate every distinct point not in `exclude` by `delta`.
    ///
    /// `exclude` holds points the caller has already moved, so that a point
    /// shared by several moved shapes is only translated once.
    pub fn move_by(&mut self, arena: &mut PointArena, exclude: &HashSet<PointId>, delta: Vec2) {
        for point in distinct_points([&*self]) {
            if !exclude.contains(&point) {
                arena.translate(point, delta);
            }
        }
        self.invalidate();
    }

    /// Mark this shape and all its points selected.
    pub fn select(&self, selection: &mut SelectionState) -> bool {
        let mut changed = selection.select(ElementId::Shape(self.id()));
        for point in self.points() {
            changed |= selection.select(ElementId::Point(point));
        }
        changed
    }

    pub fn deselect(&self, selection: &mut SelectionState) -> bool {
        let mut changed = selection.deselect(ElementId::Shape(self.id()));
        for point in self.points() {
            changed |= selection.deselect(ElementId::Point(point));
        }
        changed
    }

    /// Share `point` in place of the structural `target`.
    ///
    /// Containers forward to every child; the result tells whether any
    /// child took the point.
    pub fn connect(&mut self, point: PointId, target: PointId) -> bool {
        match self {
            Shape::Group(_) | Shape::Path(_) => {
                let mut connected = false;
                for child in self.children_mut() {
                    connected |= child.connect(point, target);
                }
                if connected {
                    self.invalidate();
                }
                connected
            }
            _ => self
                .as_structural_mut()
                .is_some_and(|s| s.connect(point, target)),
        }
    }

    /// Privatize the structural `point`, returning its fresh copy.
    ///
    /// Inside a container every child referencing `point` gets the same copy.
    pub fn disconnect_point(&mut self, point: PointId, arena: &mut PointArena) -> Option<PointId> {
        match self {
            Shape::Group(_) | Shape::Path(_) => {
                if !self.all_structural_points().contains(&point) {
                    return None;
                }
                let copy = arena.copy_point(point)?;
                arena.set_owner(copy, Some(self.id()));
                self.for_each_structural_mut(&mut |slot| {
                    if *slot == point {
                        *slot = copy;
                    }
                });
                self.invalidate();
                Some(copy)
            }
            _ => self.as_structural_mut()?.disconnect_point(point, arena),
        }
    }

    /// Give each structural slot holding `point`, here or in a descendant, its
    /// own copy placed at `position`. While `keep` is set the first slot found
    /// keeps `point` and clears it. Returns how many copies were made.
    pub fn split_point(&mut self, point: PointId, position: Point, keep: &mut bool, arena: &mut PointArena) -> usize {
        let mut copies = 0;
        for child in self.children_mut() {
            copies += child.split_point(point, position, keep, arena);
        }
        let id = self.id();
        if let Some(s) = self.as_structural_mut() {
            for slot in s.structural_mut() {
                if *slot != point {
                    continue;
                }
                if *keep {
                    *keep = false;
                    continue;
                }
                let Some(copy) = arena.copy_point(point) else {
                    continue;
                };
                arena.set_position(copy, position);
                arena.set_owner(copy, Some(id));
                *slot = copy;
                copies += 1;
            }
        }
        if copies > 0 {
            self.invalidate();
        }
        copies
    }

    /// Privatize every structural point of this shape and its children.
    pub fn disconnect(&mut self, arena: &mut PointArena) -> bool {
        match self {
            Shape::Group(_) | Shape::Path(_) => {
                let mut seen = HashSet::new();
                let points: Vec<PointId> = self
                    .all_structural_points()
                    .into_iter()
                    .filter(|p| seen.insert(*p))
                    .collect();
                let mut changed = false;
                for point in points {
                    changed |= self.disconnect_point(point, arena).is_some();
                }
                changed
            }
            _ => self.as_structural_mut().is_some_and(|s| s.disconnect(arena)),
        }
    }

    /// Set each point's owner to the shape holding it, where still unowned.
    pub fn adopt_points(&self, arena: &mut PointArena) {
        self.for_each_shape(&mut |shape| {
            for point in shape.own_points() {
                if arena.owner(point).is_none() {
                    arena.set_owner(point, Some(shape.id()));
                }
            }
        });
    }

    /// Give this shape and every descendant a fresh id, recording `old → new`.
    fn regenerate_ids(&mut self, ids: &mut HashMap<ShapeId, ShapeId>) {
        let new_id = Uuid::new_v4();
        let meta = self.meta_mut();
        ids.insert(meta.id, new_id);
        meta.id = new_id;
        meta.dirty = true;
        for child in self.children_mut() {
            child.regenerate_ids(ids);
            child.set_owner(Some(new_id));
        }
    }

    /// Deep copy with fresh ids.
    ///
    /// With a map, points are copied through it, so points shared inside the
    /// copied batch stay shared in the copy. Without one every point
    /// reference gets its own copy.
    pub fn copy(&self, arena: &mut PointArena, map: Option<&mut PointMap>) -> Shape {
        let mut copy = self.clone();
        let mut ids = HashMap::new();
        copy.regenerate_ids(&mut ids);
        copy.set_owner(None);

        match map {
            Some(map) => {
                copy.for_each_point_mut(&mut |slot| *slot = map.get_or_copy(*slot, arena));
                map.shapes.extend(ids.iter().map(|(old, new)| (*old, *new)));
                fix_owners(&copy, arena, |owner| map.shapes.get(&owner).copied(), |id| {
                    map.is_copied_shape(id)
                });
            }
            None => {
                copy.for_each_point_mut(&mut |slot| {
                    if let Some(fresh) = arena.copy_point(*slot) {
                        *slot = fresh;
                    }
                });
                let new_ids: HashSet<ShapeId> = ids.values().copied().collect();
                fix_owners(&copy, arena, |owner| ids.get(&owner).copied(), |id| {
                    new_ids.contains(&id)
                });
            }
        }
        copy
    }
}

/// Point owners inside a fresh copy: follow the shape id map, otherwise hand
/// the point to the copied shape that references it.
fn fix_owners(
    copy: &Shape,
    arena: &mut PointArena,
    mapped: impl Fn(ShapeId) -> Option<ShapeId>,
    is_copy: impl Fn(ShapeId) -> bool,
) {
    copy.for_each_shape(&mut |shape| {
        for point in shape.own_points() {
            let owner = match arena.owner(point) {
                Some(owner) if is_copy(owner) => continue,
                Some(owner) => mapped(owner).unwrap_or(shape.id()),
                None => shape.id(),
            };
            arena.set_owner(point, Some(owner));
        }
    });
}

/// Distinct points of `shapes`, deduplicated by identity, in first-seen order.
pub fn distinct_points<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Vec<PointId> {
    let mut seen = HashSet::new();
    shapes
        .into_iter()
        .flat_map(|s| s.points())
        .filter(|p| seen.insert(*p))
        .collect()
}

/// Identity map built while copying a batch of shapes.
#[derive(Debug, Clone, Default)]
pub struct PointMap {
    forward: HashMap<PointId, PointId>,
    backward: HashMap<PointId, PointId>,
    shapes: HashMap<ShapeId, ShapeId>,
}

impl PointMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy every snapshotted point into `dst` once.
    pub fn from_snapshot(snapshot: Vec<(PointId, GraphPoint)>, dst: &mut PointArena) -> Self {
        let mut map = Self::new();
        for (original, point) in snapshot {
            let copy = dst.insert(point);
            map.insert(original, copy);
        }
        map
    }

    pub fn insert(&mut self, original: PointId, copy: PointId) {
        self.forward.insert(original, copy);
        self.backward.insert(copy, original);
    }

    /// Copy of `original`, if it has one.
    pub fn get(&self, original: PointId) -> Option<PointId> {
        self.forward.get(&original).copied()
    }

    /// Original of `copy`, if it is one.
    pub fn original(&self, copy: PointId) -> Option<PointId> {
        self.backward.get(&copy).copied()
    }

    /// Copy of a shape id made through this map.
    pub fn shape(&self, original: ShapeId) -> Option<ShapeId> {
        self.shapes.get(&original).copied()
    }

    fn is_copied_shape(&self, id: ShapeId) -> bool {
        self.shapes.values().any(|v| *v == id)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    fn get_or_copy(&mut self, original: PointId, arena: &mut PointArena) -> PointId {
        if let Some(copy) = self.get(original) {
            return copy;
        }
        match arena.copy_point(original) {
            Some(copy) => {
                self.insert(original, copy);
                copy
            }
            None => {
                log::error!("Copying stale point {original:?}");
                original
            }
        }
    }
}

/// Copy a batch of shapes from `src` into `dst`, keeping shared points shared.
///
/// Bare point shapes are dropped from the result.
pub fn copy_shapes(shapes: &[Shape], src: &PointArena, dst: &mut PointArena) -> (Vec<Shape>, PointMap) {
    let snapshot = src.snapshot(&distinct_points(shapes));
    copy_through(shapes, snapshot, dst)
}

/// [`copy_shapes`] with source and destination in the same arena.
pub fn copy_shapes_within(shapes: &[Shape], arena: &mut PointArena) -> (Vec<Shape>, PointMap) {
    let snapshot = arena.snapshot(&distinct_points(shapes));
    copy_through(shapes, snapshot, arena)
}

fn copy_through(
    shapes: &[Shape],
    snapshot: Vec<(PointId, GraphPoint)>,
    dst: &mut PointArena,
) -> (Vec<Shape>, PointMap) {
    let mut map = PointMap::from_snapshot(snapshot, dst);
    let copies = shapes
        .iter()
        .map(|shape| shape.copy(dst, Some(&mut map)))
        .filter(|copy| !matches!(copy, Shape::Point(_)))
        .collect();
    (copies, map)
}

/// Remove `element` from a container or any container nested in it.
///
/// A point element matches a free point shape, or an extra point of a
/// connectable shape. Containers emptied by the removal are dropped too.
pub fn remove_element(shapes: &mut Vec<Shape>, element: ElementId) -> bool {
    if let Some(index) = shapes.iter().position(|s| s.is_element(element)) {
        shapes.remove(index);
        return true;
    }
    let Some(index) = shapes.iter_mut().position(|s| s.remove_descendant(element)) else {
        return false;
    };
    if shapes[index].is_empty_container() {
        shapes.remove(index);
    }
    true
}

impl Shape {
    fn remove_descendant(&mut self, element: ElementId) -> bool {
        let removed = match self {
            Shape::Group(g) => {
                if remove_element(&mut g.shapes, element) {
                    true
                } else if let ElementId::Point(point) = element {
                    g.detach(point)
                } else {
                    false
                }
            }
            Shape::Path(p) => {
                match p
                    .figures
                    .iter_mut()
                    .position(|f| remove_element(&mut f.shapes, element))
                {
                    Some(index) => {
                        if p.figures[index].is_empty() {
                            p.figures.remove(index);
                        }
                        true
                    }
                    None => false,
                }
            }
            _ => match (element, self.as_connectable_mut()) {
                (ElementId::Point(point), Some(c)) => c.detach(point),
                _ => false,
            },
        };
        if removed {
            self.invalidate();
        }
        removed
    }
}

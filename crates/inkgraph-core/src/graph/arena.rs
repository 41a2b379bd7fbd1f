//! Document-scoped storage for shared points.
//!
//! Shapes never own point coordinates directly; they hold [`PointId`] handles
//! into a [`PointArena`]. Two shapes referencing the same handle share the point,
//! so moving it moves both.

use std::collections::HashSet;

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

use super::{GraphError, ShapeId};

/// Handle to a point in a [`PointArena`].
///
/// A slot index plus a generation counter. Freed slots are reused with a bumped
/// generation, so a stale handle never aliases a newer point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(u32, u32);

impl PointId {
    const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Generation of the slot this handle was issued for.
    pub const fn generation(self) -> u32 {
        self.1
    }
}

/// A point stored in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPoint {
    /// Position in world coordinates.
    pub position: Point,
    /// Optional template id drawn at this location (handle glyph).
    #[serde(default)]
    pub template: Option<String>,
    /// Shape this point belongs to; `None` for a free point.
    #[serde(default)]
    pub owner: Option<ShapeId>,
    #[serde(skip)]
    dirty: bool,
}

impl GraphPoint {
    /// Create a free point at `position`.
    pub fn new(position: Point) -> Self {
        Self {
            position,
            template: None,
            owner: None,
            dirty: true,
        }
    }

    /// Create a point owned by `owner`.
    pub fn owned(position: Point, owner: ShapeId) -> Self {
        Self {
            owner: Some(owner),
            ..Self::new(position)
        }
    }

    /// Whether the point moved since the last [`PointArena::clear_dirty`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot {
    generation: u32,
    point: GraphPoint,
}

/// Generational arena of [`GraphPoint`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawArena")]
pub struct PointArena {
    slots: Vec<Option<Slot>>,
    // last generation per slot, persists across frees
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

/// Arena as loaded, before its bookkeeping is checked.
#[derive(Deserialize)]
struct RawArena {
    slots: Vec<Option<Slot>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
}

impl TryFrom<RawArena> for PointArena {
    type Error = GraphError;

    fn try_from(raw: RawArena) -> Result<Self, Self::Error> {
        let RawArena {
            slots,
            generations,
            free_list,
        } = raw;
        if slots.len() != generations.len() {
            return Err(GraphError::CorruptArena(format!(
                "{} slots but {} generations",
                slots.len(),
                generations.len()
            )));
        }
        for (idx, slot) in slots.iter().enumerate() {
            if let Some(slot) = slot {
                if slot.generation > generations[idx] {
                    return Err(GraphError::CorruptArena(format!(
                        "slot {idx} is ahead of its generation"
                    )));
                }
            }
        }
        let mut free = HashSet::new();
        for &idx in &free_list {
            match slots.get(idx) {
                Some(None) if free.insert(idx) => {}
                Some(None) => return Err(GraphError::CorruptArena(format!("slot {idx} freed twice"))),
                Some(Some(_)) => return Err(GraphError::CorruptArena(format!("free slot {idx} is live"))),
                None => return Err(GraphError::CorruptArena(format!("free slot {idx} out of range"))),
            }
        }
        Ok(Self {
            slots,
            generations,
            free_list,
        })
    }
}

impl PointArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a point and return its handle.
    pub fn insert(&mut self, point: GraphPoint) -> PointId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            let idx = self.slots.len();
            self.slots.push(None);
            self.generations.push(1);
            (idx, 1)
        };
        self.slots[idx] = Some(Slot { generation, point });
        PointId::new(idx as u32, generation)
    }

    /// Insert a free point at `position`.
    pub fn add(&mut self, position: Point) -> PointId {
        self.insert(GraphPoint::new(position))
    }

    /// Remove a point. Stale handles are ignored.
    pub fn remove(&mut self, id: PointId) -> Option<GraphPoint> {
        if !self.is_alive(id) {
            return None;
        }
        let slot = self.slots[id.idx()].take()?;
        self.free_list.push(id.idx());
        Some(slot.point)
    }

    /// Whether `id` refers to a live point.
    pub fn is_alive(&self, id: PointId) -> bool {
        matches!(
            self.slots.get(id.idx()),
            Some(Some(slot)) if slot.generation == id.generation()
        )
    }

    pub fn get(&self, id: PointId) -> Option<&GraphPoint> {
        match self.slots.get(id.idx()) {
            Some(Some(slot)) if slot.generation == id.generation() => Some(&slot.point),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: PointId) -> Option<&mut GraphPoint> {
        match self.slots.get_mut(id.idx()) {
            Some(Some(slot)) if slot.generation == id.generation() => Some(&mut slot.point),
            _ => None,
        }
    }

    /// Position of a live point.
    pub fn position(&self, id: PointId) -> Option<Point> {
        self.get(id).map(|p| p.position)
    }

    /// Move a point to `position`. Returns `false` for a stale handle.
    pub fn set_position(&mut self, id: PointId, position: Point) -> bool {
        match self.get_mut(id) {
            Some(point) => {
                point.position = position;
                point.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Translate a point by `delta`. Returns `false` for a stale handle.
    pub fn translate(&mut self, id: PointId, delta: Vec2) -> bool {
        match self.get_mut(id) {
            Some(point) => {
                point.position += delta;
                point.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Owner back-reference of a point.
    pub fn owner(&self, id: PointId) -> Option<ShapeId> {
        self.get(id).and_then(|p| p.owner)
    }

    pub fn set_owner(&mut self, id: PointId, owner: Option<ShapeId>) {
        if let Some(point) = self.get_mut(id) {
            point.owner = owner;
        }
    }

    /// Insert an unshared copy of `id` at the same coordinates.
    pub fn copy_point(&mut self, id: PointId) -> Option<PointId> {
        let mut copy = self.get(id)?.clone();
        copy.dirty = true;
        Some(self.insert(copy))
    }

    /// Number of live points.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live points with their handles.
    pub fn iter(&self) -> impl Iterator<Item = (PointId, &GraphPoint)> + '_ {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|slot| (PointId::new(idx as u32, slot.generation), &slot.point))
        })
    }

    /// Remove every point not in `reachable`. Returns how many were pruned.
    pub fn retain_reachable(&mut self, reachable: &HashSet<PointId>) -> usize {
        let dead: Vec<PointId> = self
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !reachable.contains(id))
            .collect();
        for id in &dead {
            self.remove(*id);
        }
        dead.len()
    }

    /// Clone the live points among `ids`, in order. Stale handles are skipped.
    pub fn snapshot(&self, ids: &[PointId]) -> Vec<(PointId, GraphPoint)> {
        ids.iter()
            .filter_map(|id| self.get(*id).map(|p| (*id, p.clone())))
            .collect()
    }

    /// Whether any live point moved since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self, id: PointId) -> bool {
        self.get(id).is_some_and(|p| p.dirty)
    }

    pub fn clear_dirty(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.point.dirty = false;
        }
    }
}

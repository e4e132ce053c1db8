//! Authoritative structure state management utilities.

use std::collections::BTreeMap;

use dune_skirmish_core::{HouseId, StructureId, StructureKind, TileIndex};

/// Lifecycle state of a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructureState {
    /// Waiting for orders.
    Idle,
}

/// Snapshot of a structure stored inside the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureRecord {
    /// Identifier allocated by the world for the structure.
    pub id: StructureId,
    /// Owner of the structure.
    pub house: HouseId,
    /// Kind of structure that was constructed.
    pub kind: StructureKind,
    /// Upper-left tile of the footprint.
    pub origin: TileIndex,
    /// Remaining hit points.
    pub hit_points: u16,
    /// Whether the structure loses hit points over time.
    pub degrades: bool,
    /// Lifecycle state.
    pub state: StructureState,
}

/// Registry that stores structures and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct StructureRegistry {
    entries: BTreeMap<StructureId, StructureRecord>,
    next_structure_id: StructureId,
}

impl StructureRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_structure_id: StructureId::new(0),
        }
    }

    /// Records a freshly constructed structure at full strength.
    pub(crate) fn insert(
        &mut self,
        house: HouseId,
        kind: StructureKind,
        origin: TileIndex,
    ) -> StructureId {
        let id = self.next_structure_id;
        self.next_structure_id = StructureId::new(id.get() + 1);
        let _ = self.entries.insert(
            id,
            StructureRecord {
                id,
                house,
                kind,
                origin,
                hit_points: kind.hit_points(),
                degrades: false,
                state: StructureState::Idle,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: StructureId) -> Option<&StructureRecord> {
        self.entries.get(&id)
    }

    /// Iterates structures in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &StructureRecord> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

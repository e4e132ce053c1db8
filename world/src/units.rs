//! Authoritative unit state management utilities.

use std::collections::BTreeMap;

use dune_skirmish_core::{HouseId, TileIndex, UnitId, UnitKind, UnitOrder};

/// Snapshot of a unit stored inside the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitRecord {
    /// Identifier allocated by the world for the unit.
    pub id: UnitId,
    /// Owner of the unit.
    pub house: HouseId,
    /// Kind of unit.
    pub kind: UnitKind,
    /// Tile occupied by the unit.
    pub tile: TileIndex,
    /// Standing order issued at creation.
    pub order: UnitOrder,
}

/// Registry that stores units and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct UnitRegistry {
    entries: BTreeMap<UnitId, UnitRecord>,
    next_unit_id: UnitId,
}

impl UnitRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_unit_id: UnitId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        house: HouseId,
        kind: UnitKind,
        tile: TileIndex,
        order: UnitOrder,
    ) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get() + 1);
        let _ = self.entries.insert(
            id,
            UnitRecord {
                id,
                house,
                kind,
                tile,
                order,
            },
        );
        id
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &UnitRecord> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_increase_with_each_unit() {
        let mut registry = UnitRegistry::new();
        let tile = TileIndex::from_xy(9, 9).expect("tile on map");
        let mcv = registry.insert(HouseId::Atreides, UnitKind::Mcv, tile, UnitOrder::Guard);
        let worm = registry.insert(HouseId::Neutral, UnitKind::Sandworm, tile, UnitOrder::Ambush);

        assert_eq!(mcv.get() + 1, worm.get());
        let kinds: Vec<UnitKind> = registry.iter().map(|unit| unit.kind).collect();
        assert_eq!(kinds, vec![UnitKind::Mcv, UnitKind::Sandworm]);
    }
}

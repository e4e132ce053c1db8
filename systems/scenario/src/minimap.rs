//! Minimap snapshot captured once a scenario is assembled.

use dune_skirmish_core::{HouseId, TerrainClass, TileIndex, MAP_SIZE, MAP_TILE_COUNT};
use dune_skirmish_world::{query, World};

/// What the minimap shows for a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MinimapCell {
    /// Bare ground, slabs and walls.
    Terrain(TerrainClass),
    /// Part of a structure footprint.
    Structure(HouseId),
    /// A unit standing on the tile.
    Unit(HouseId),
}

/// Row-major grid of minimap cells covering the whole map.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MinimapSnapshot {
    cells: Vec<MinimapCell>,
}

impl MinimapSnapshot {
    /// Captures the current state of the world.
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let mut cells: Vec<MinimapCell> = TileIndex::all()
            .map(|tile| {
                let state = query::tile(world, tile);
                match (state.structure(), state.owner()) {
                    (Some(_), Some(owner)) => MinimapCell::Structure(owner),
                    _ => MinimapCell::Terrain(query::landscape(world, tile)),
                }
            })
            .collect();
        for unit in query::units(world) {
            cells[unit.tile.index()] = MinimapCell::Unit(unit.house);
        }
        Self { cells }
    }

    /// Cell of a single tile.
    #[must_use]
    pub fn cell(&self, tile: TileIndex) -> MinimapCell {
        self.cells[tile.index()]
    }

    /// Every cell in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[MinimapCell] {
        &self.cells
    }

    /// Rows of the map from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[MinimapCell]> {
        self.cells.chunks(usize::from(MAP_SIZE))
    }
}

impl Default for MinimapSnapshot {
    fn default() -> Self {
        Self {
            cells: vec![MinimapCell::Terrain(TerrainClass::Sand); MAP_TILE_COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dune_skirmish_core::{Brain, Command, StructureKind, TeamId, TerrainGrid, UnitKind, UnitOrder};
    use dune_skirmish_world as world;

    #[test]
    fn units_and_structures_cover_the_terrain() {
        let terrain = TerrainGrid::from_parts(
            vec![TerrainClass::Rock; MAP_TILE_COUNT],
            vec![0; MAP_TILE_COUNT],
        )
        .expect("full grid");
        let mut world = World::new();
        let mut events = Vec::new();
        let origin = TileIndex::from_xy(10, 10).expect("tile on map");
        let scout = TileIndex::from_xy(20, 20).expect("tile on map");
        for command in [
            Command::LoadTerrain { terrain },
            Command::RegisterHouse {
                house: HouseId::Ordos,
                brain: Brain::Cpu,
                team: TeamId::new(3),
                credits: 1000,
            },
            Command::PlaceStructure {
                house: HouseId::Ordos,
                kind: StructureKind::Windtrap,
                origin,
            },
            Command::SpawnUnit {
                house: HouseId::Ordos,
                kind: UnitKind::RaiderTrike,
                tile: scout,
                order: UnitOrder::Guard,
            },
        ] {
            world::apply(&mut world, command, &mut events);
        }

        let snapshot = MinimapSnapshot::capture(&world);
        let corner = TileIndex::from_xy(11, 11).expect("tile on map");
        assert_eq!(snapshot.cell(corner), MinimapCell::Structure(HouseId::Ordos));
        assert_eq!(snapshot.cell(scout), MinimapCell::Unit(HouseId::Ordos));
        assert_eq!(
            snapshot.cell(TileIndex::from_xy(0, 0).expect("tile on map")),
            MinimapCell::Terrain(TerrainClass::Rock)
        );
        assert_eq!(snapshot.rows().count(), usize::from(MAP_SIZE));
    }
}

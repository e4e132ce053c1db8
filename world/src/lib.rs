#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Dune skirmish map generator.
//!
//! The world owns the tile grid, the house roster and the structure and unit
//! registries of one generation attempt. Systems never touch this state
//! directly: they submit [`Command`] values through [`apply`] and read the
//! outcome from the broadcast [`Event`] values or through [`query`].

mod placement;
mod structures;
mod units;

use std::collections::BTreeMap;

use dune_skirmish_core::{
    Brain, Command, Event, HouseId, PlayableArea, TeamId, TerrainClass, TileIndex,
    MAP_TILE_COUNT,
};

pub use structures::{StructureRecord, StructureState};
pub use units::UnitRecord;

use structures::StructureRegistry;
use units::UnitRegistry;

/// State of a single map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub(crate) ground: TerrainClass,
    pub(crate) sprite: u16,
    pub(crate) structure: Option<dune_skirmish_core::StructureId>,
    pub(crate) unit: Option<dune_skirmish_core::UnitId>,
    pub(crate) owner: Option<HouseId>,
}

impl Tile {
    const EMPTY: Self = Self {
        ground: TerrainClass::Sand,
        sprite: 0,
        structure: None,
        unit: None,
        owner: None,
    };

    /// Ground terrain, ignoring any structure standing on it.
    #[must_use]
    pub const fn ground(&self) -> TerrainClass {
        self.ground
    }

    /// Renderer sprite index assigned by the terrain synthesizer.
    #[must_use]
    pub const fn sprite(&self) -> u16 {
        self.sprite
    }

    /// Structure covering the tile, if any.
    #[must_use]
    pub const fn structure(&self) -> Option<dune_skirmish_core::StructureId> {
        self.structure
    }

    /// Unit standing on the tile, if any.
    #[must_use]
    pub const fn unit(&self) -> Option<dune_skirmish_core::UnitId> {
        self.unit
    }

    /// House owning the structure, slab or wall on the tile, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<HouseId> {
        self.owner
    }
}

/// House registered for the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HouseRecord {
    /// Identity of the house.
    pub house: HouseId,
    /// Controller of the house.
    pub brain: Brain,
    /// Team of the house.
    pub team: TeamId,
    /// Starting credits.
    pub credits: u16,
}

/// Represents the authoritative skirmish world state.
#[derive(Debug)]
pub struct World {
    area: PlayableArea,
    tiles: Vec<Tile>,
    houses: BTreeMap<HouseId, HouseRecord>,
    structures: StructureRegistry,
    units: UnitRegistry,
}

impl World {
    /// Creates an empty world covered in sand.
    #[must_use]
    pub fn new() -> Self {
        Self {
            area: PlayableArea::SKIRMISH,
            tiles: vec![Tile::EMPTY; MAP_TILE_COUNT],
            houses: BTreeMap::new(),
            structures: StructureRegistry::new(),
            units: UnitRegistry::new(),
        }
    }

    pub(crate) fn tile(&self, tile: TileIndex) -> &Tile {
        &self.tiles[tile.index()]
    }

    fn tile_mut(&mut self, tile: TileIndex) -> &mut Tile {
        &mut self.tiles[tile.index()]
    }

    /// The neutral house owns desert life and never registers.
    pub(crate) fn knows_house(&self, house: HouseId) -> bool {
        house == HouseId::Neutral || self.houses.contains_key(&house)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ResetWorld => {
            *world = World::new();
            out_events.push(Event::WorldReset);
        }
        Command::LoadTerrain { terrain } => {
            for (tile, (ground, sprite)) in world
                .tiles
                .iter_mut()
                .zip(terrain.classes().iter().zip(terrain.sprites()))
            {
                tile.ground = *ground;
                tile.sprite = *sprite;
                tile.owner = None;
            }
            out_events.push(Event::TerrainLoaded);
        }
        Command::RegisterHouse {
            house,
            brain,
            team,
            credits,
        } => {
            let _ = world.houses.insert(
                house,
                HouseRecord {
                    house,
                    brain,
                    team,
                    credits,
                },
            );
            out_events.push(Event::HouseRegistered { house, brain, team });
        }
        Command::PlaceStructure {
            house,
            kind,
            origin,
        } => match placement::structure_tiles(world, house, kind, origin) {
            Ok(tiles) => {
                let structure = world.structures.insert(house, kind, origin);
                for tile in tiles {
                    let state = world.tile_mut(tile);
                    state.structure = Some(structure);
                    state.owner = Some(house);
                }
                out_events.push(Event::StructurePlaced {
                    structure,
                    house,
                    kind,
                    origin,
                });
            }
            Err(reason) => out_events.push(Event::StructureRejected {
                house,
                kind,
                origin,
                reason,
            }),
        },
        Command::LaySlab { house, tile } => match placement::slab(world, house, tile) {
            Ok(()) => {
                let state = world.tile_mut(tile);
                state.ground = TerrainClass::ConcreteSlab;
                state.owner = Some(house);
                out_events.push(Event::SlabLaid { house, tile });
            }
            Err(reason) => out_events.push(Event::GroundworkRejected {
                house,
                tile,
                reason,
            }),
        },
        Command::RaiseWall { house, tile } => match placement::wall(world, house, tile) {
            Ok(()) => {
                let state = world.tile_mut(tile);
                state.ground = TerrainClass::Wall;
                state.owner = Some(house);
                out_events.push(Event::WallRaised { house, tile });
            }
            Err(reason) => out_events.push(Event::GroundworkRejected {
                house,
                tile,
                reason,
            }),
        },
        Command::SpawnUnit {
            house,
            kind,
            tile,
            order,
        } => match placement::unit(world, house, kind, tile) {
            Ok(()) => {
                let unit = world.units.insert(house, kind, tile, order);
                world.tile_mut(tile).unit = Some(unit);
                out_events.push(Event::UnitSpawned {
                    unit,
                    house,
                    kind,
                    tile,
                });
            }
            Err(reason) => out_events.push(Event::UnitRejected {
                house,
                kind,
                tile,
                reason,
            }),
        },
        Command::EnrichSpice { tile } => {
            let state = world.tile_mut(tile);
            if state.structure.is_some() {
                return;
            }
            if let Some(terrain) = state.ground.enriched() {
                state.ground = terrain;
                out_events.push(Event::SpiceEnriched { tile, terrain });
            }
        }
        Command::PlantSpiceBloom { tile } => match placement::bloom(world, tile) {
            Ok(()) => {
                world.tile_mut(tile).ground = TerrainClass::SpiceBloom;
                out_events.push(Event::SpiceBloomPlanted { tile });
            }
            Err(reason) => out_events.push(Event::SpiceBloomRejected { tile, reason }),
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use dune_skirmish_core::{
        HouseId, PlacementError, PlayableArea, StructureId, StructureKind, TerrainClass,
        TileIndex, UnitId, UnitKind,
    };

    use super::{placement, HouseRecord, StructureRecord, Tile, UnitRecord, World};

    /// Rectangle in which anything may be placed.
    #[must_use]
    pub fn playable_area(world: &World) -> PlayableArea {
        world.area
    }

    /// Copy of the state of a single tile.
    #[must_use]
    pub fn tile(world: &World, tile: TileIndex) -> Tile {
        *world.tile(tile)
    }

    /// Terrain class of the tile, reporting [`TerrainClass::Structure`] under structures.
    #[must_use]
    pub fn landscape(world: &World, tile: TileIndex) -> TerrainClass {
        let state = world.tile(tile);
        if state.structure.is_some() {
            TerrainClass::Structure
        } else {
            state.ground
        }
    }

    /// Landscape of every tile in row-major order.
    #[must_use]
    pub fn landscape_grid(world: &World) -> Vec<TerrainClass> {
        TileIndex::all()
            .map(|tile| landscape(world, tile))
            .collect()
    }

    /// Reports whether the tile is unoccupied ground a base may grow over.
    #[must_use]
    pub fn is_buildable(world: &World, tile: TileIndex) -> bool {
        let state = world.tile(tile);
        state.unit.is_none() && landscape(world, tile).is_buildable_ground()
    }

    /// Checks whether a structure could be anchored at `origin`.
    pub fn structure_placement(
        world: &World,
        house: HouseId,
        kind: StructureKind,
        origin: TileIndex,
    ) -> Result<(), PlacementError> {
        placement::structure_tiles(world, house, kind, origin).map(|_| ())
    }

    /// Checks whether a concrete slab could be laid on the tile.
    pub fn slab_placement(
        world: &World,
        house: HouseId,
        tile: TileIndex,
    ) -> Result<(), PlacementError> {
        placement::slab(world, house, tile)
    }

    /// Checks whether a unit could be deployed on the tile.
    pub fn unit_placement(
        world: &World,
        house: HouseId,
        kind: UnitKind,
        tile: TileIndex,
    ) -> Result<(), PlacementError> {
        placement::unit(world, house, kind, tile)
    }

    /// Houses registered for the match, in house order.
    pub fn houses(world: &World) -> impl Iterator<Item = &HouseRecord> {
        world.houses.values()
    }

    /// Registration of a single house.
    #[must_use]
    pub fn house(world: &World, house: HouseId) -> Option<&HouseRecord> {
        world.houses.get(&house)
    }

    /// Reports whether two houses fight on the same side.
    ///
    /// Houses outside the roster are only allied with themselves.
    #[must_use]
    pub fn are_allied(world: &World, left: HouseId, right: HouseId) -> bool {
        if left == right {
            return true;
        }
        match (world.houses.get(&left), world.houses.get(&right)) {
            (Some(left), Some(right)) => left.team == right.team,
            _ => false,
        }
    }

    /// Structures in identifier order.
    pub fn structures(world: &World) -> impl Iterator<Item = &StructureRecord> {
        world.structures.iter()
    }

    /// Looks up a single structure.
    #[must_use]
    pub fn structure(world: &World, id: StructureId) -> Option<&StructureRecord> {
        world.structures.get(id)
    }

    /// Number of structures on the map.
    #[must_use]
    pub fn structure_count(world: &World) -> usize {
        world.structures.len()
    }

    /// Units in identifier order.
    pub fn units(world: &World) -> impl Iterator<Item = &UnitRecord> {
        world.units.iter()
    }

    /// Unit standing on the tile, if any.
    #[must_use]
    pub fn unit_at(world: &World, tile: TileIndex) -> Option<UnitId> {
        world.tile(tile).unit
    }

    /// Distances from a tile to the nearest structures of each side.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct StructureDistances {
        /// Nearest structure of the house or one of its allies.
        pub ally: Option<u16>,
        /// Nearest structure of any other house.
        pub enemy: Option<u16>,
    }

    /// Measures the distance from `tile` to the closest allied and enemy structure anchors.
    #[must_use]
    pub fn nearest_structures(world: &World, house: HouseId, tile: TileIndex) -> StructureDistances {
        let mut distances = StructureDistances::default();
        for structure in world.structures.iter() {
            let distance = structure.origin.distance(tile);
            let slot = if are_allied(world, house, structure.house) {
                &mut distances.ally
            } else {
                &mut distances.enemy
            };
            *slot = Some(slot.map_or(distance, |current| current.min(distance)));
        }
        distances
    }
}

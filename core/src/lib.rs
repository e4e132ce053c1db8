#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Dune skirmish map generator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the generation systems. Systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Placement requests that the world
//! refuses are reported as rejection events rather than errors, so systems
//! can keep searching for another tile.

mod config;
mod random;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use config::{
    CampaignTier, ConfigError, GenerationMode, LandscapeParams, LoseCondition, MapSeed, MatchKind,
    PlayerConfig, SkirmishConfig, StartingArmy,
};
pub use random::SkirmishRng;

/// Number of tiles along each edge of the map.
pub const MAP_SIZE: u16 = 64;

/// Total number of tiles stored in the map.
pub const MAP_TILE_COUNT: usize = (MAP_SIZE as usize) * (MAP_SIZE as usize);

/// Cardinal steps in the order up, right, down, left.
pub const CARDINAL_STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Packed location of a single map tile (`y * 64 + x`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex(u16);

impl TileIndex {
    /// Creates a tile index from column and row coordinates, if they lie on the map.
    #[must_use]
    pub const fn from_xy(x: u16, y: u16) -> Option<Self> {
        if x < MAP_SIZE && y < MAP_SIZE {
            Some(Self(y * MAP_SIZE + x))
        } else {
            None
        }
    }

    /// Creates a tile index from its packed representation, if it lies on the map.
    #[must_use]
    pub const fn from_packed(packed: u16) -> Option<Self> {
        if (packed as usize) < MAP_TILE_COUNT {
            Some(Self(packed))
        } else {
            None
        }
    }

    /// Retrieves the packed representation of the tile.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Position of the tile inside dense per-tile storage.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Zero-based column of the tile.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.0 % MAP_SIZE
    }

    /// Zero-based row of the tile.
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.0 / MAP_SIZE
    }

    /// Returns the tile displaced by the provided deltas, or `None` when it leaves the map.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let x = i32::from(self.x()) + dx;
        let y = i32::from(self.y()) + dy;
        let x = u16::try_from(x).ok()?;
        let y = u16::try_from(y).ok()?;
        Self::from_xy(x, y)
    }

    /// Distance metric used for placement decisions: the longer axis plus half the shorter.
    #[must_use]
    pub fn distance(self, other: TileIndex) -> u16 {
        let dx = self.x().abs_diff(other.x());
        let dy = self.y().abs_diff(other.y());
        if dx > dy {
            dx + dy / 2
        } else {
            dy + dx / 2
        }
    }

    /// Iterates the in-map 4-connected neighbours in up, right, down, left order.
    pub fn neighbors(self) -> impl Iterator<Item = TileIndex> {
        CARDINAL_STEPS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// Iterates every tile of the map in row-major order.
    pub fn all() -> impl Iterator<Item = TileIndex> {
        (0..MAP_SIZE).flat_map(|y| (0..MAP_SIZE).map(move |x| Self(y * MAP_SIZE + x)))
    }
}

/// Rectangle of the map in which generation may place anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayableArea {
    min_x: u16,
    min_y: u16,
    width: u16,
    height: u16,
}

impl PlayableArea {
    /// Playable rectangle used by skirmish and multiplayer maps.
    pub const SKIRMISH: Self = Self::new(1, 1, 62, 62);

    /// Creates a playable rectangle anchored at the provided minimum corner.
    #[must_use]
    pub const fn new(min_x: u16, min_y: u16, width: u16, height: u16) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// Leftmost playable column.
    #[must_use]
    pub const fn min_x(&self) -> u16 {
        self.min_x
    }

    /// Topmost playable row.
    #[must_use]
    pub const fn min_y(&self) -> u16 {
        self.min_y
    }

    /// Number of playable columns.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Number of playable rows.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Reports whether the tile lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, tile: TileIndex) -> bool {
        let x = tile.x();
        let y = tile.y();
        x >= self.min_x
            && x < self.min_x + self.width
            && y >= self.min_y
            && y < self.min_y + self.height
    }

    /// Reports whether the tile keeps the provided margins from every edge of the rectangle.
    #[must_use]
    pub const fn contains_with_margin(&self, tile: TileIndex, margin_x: u16, margin_y: u16) -> bool {
        let x = tile.x();
        let y = tile.y();
        x >= self.min_x + margin_x
            && x + margin_x < self.min_x + self.width
            && y >= self.min_y + margin_y
            && y + margin_y < self.min_y + self.height
    }

    /// Iterates the tiles of the rectangle in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = TileIndex> {
        let area = *self;
        (area.min_y..area.min_y + area.height).flat_map(move |y| {
            (area.min_x..area.min_x + area.width).filter_map(move |x| TileIndex::from_xy(x, y))
        })
    }
}

impl Default for PlayableArea {
    fn default() -> Self {
        Self::SKIRMISH
    }
}

/// Terrain class of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TerrainClass {
    /// Open sand.
    Sand,
    /// Sand dunes.
    Dune,
    /// Solid rock that supports construction.
    Rock,
    /// Impassable mountain range.
    Mountain,
    /// Harvestable spice.
    Spice,
    /// Dense, harvestable spice.
    ThickSpice,
    /// A concrete slab laid onto the ground.
    ConcreteSlab,
    /// A defensive wall segment.
    Wall,
    /// Ground covered by a structure footprint.
    Structure,
    /// A spice bloom waiting to erupt.
    SpiceBloom,
}

impl TerrainClass {
    /// Reports whether spice may spread onto the terrain.
    #[must_use]
    pub const fn can_become_spice(self) -> bool {
        matches!(
            self,
            Self::Sand | Self::Dune | Self::Spice | Self::ThickSpice
        )
    }

    /// Reports whether the terrain is plain sand or dunes.
    #[must_use]
    pub const fn is_sand_like(self) -> bool {
        matches!(self, Self::Sand | Self::Dune)
    }

    /// Reports whether the terrain counts as buildable ground when it is unoccupied.
    #[must_use]
    pub const fn is_buildable_ground(self) -> bool {
        matches!(
            self,
            Self::Sand | Self::Dune | Self::Rock | Self::ConcreteSlab
        )
    }

    /// Reports whether a structure footprint may rest on the terrain.
    #[must_use]
    pub const fn supports_structure(self) -> bool {
        matches!(self, Self::Rock | Self::ConcreteSlab)
    }

    /// Reports whether a concrete slab may be laid on the terrain.
    #[must_use]
    pub const fn accepts_slab(self) -> bool {
        matches!(self, Self::Sand | Self::Dune | Self::Rock)
    }

    /// Reports whether the terrain seals off a pocket of buildable ground.
    #[must_use]
    pub const fn seals_region(self) -> bool {
        matches!(self, Self::Mountain | Self::Wall | Self::Structure)
    }

    /// Reports whether ground units may not be deployed onto the terrain.
    #[must_use]
    pub const fn blocks_deployment(self) -> bool {
        matches!(
            self,
            Self::Mountain | Self::Wall | Self::Structure | Self::SpiceBloom
        )
    }

    /// Reports whether sandworms may roam the terrain.
    #[must_use]
    pub const fn is_worm_habitat(self) -> bool {
        matches!(
            self,
            Self::Sand | Self::Dune | Self::Spice | Self::ThickSpice | Self::SpiceBloom
        )
    }

    /// Terrain after one more step of spice, or `None` when spice cannot grow here.
    #[must_use]
    pub const fn enriched(self) -> Option<Self> {
        match self {
            Self::Sand | Self::Dune => Some(Self::Spice),
            Self::Spice => Some(Self::ThickSpice),
            _ => None,
        }
    }
}

/// Synthesized terrain for every tile of the map, paired with renderer sprite indices.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainGrid {
    classes: Vec<TerrainClass>,
    sprites: Vec<u16>,
}

impl TerrainGrid {
    /// Creates a grid from per-tile classes and sprite indices.
    ///
    /// Returns `None` unless both slices cover exactly [`MAP_TILE_COUNT`] tiles.
    #[must_use]
    pub fn from_parts(classes: Vec<TerrainClass>, sprites: Vec<u16>) -> Option<Self> {
        if classes.len() != MAP_TILE_COUNT || sprites.len() != MAP_TILE_COUNT {
            return None;
        }
        Some(Self { classes, sprites })
    }

    /// Terrain class of the tile.
    #[must_use]
    pub fn class(&self, tile: TileIndex) -> TerrainClass {
        self.classes[tile.index()]
    }

    /// Renderer sprite index of the tile.
    #[must_use]
    pub fn sprite(&self, tile: TileIndex) -> u16 {
        self.sprites[tile.index()]
    }

    /// Dense row-major view of every terrain class.
    #[must_use]
    pub fn classes(&self) -> &[TerrainClass] {
        &self.classes
    }

    /// Dense row-major view of every sprite index.
    #[must_use]
    pub fn sprites(&self) -> &[u16] {
        &self.sprites
    }
}

impl Default for TerrainGrid {
    fn default() -> Self {
        Self {
            classes: vec![TerrainClass::Sand; MAP_TILE_COUNT],
            sprites: vec![0; MAP_TILE_COUNT],
        }
    }
}

/// Great houses and factions that may own objects on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseId {
    /// House Harkonnen.
    Harkonnen,
    /// House Atreides.
    Atreides,
    /// House Ordos.
    Ordos,
    /// The Fremen.
    Fremen,
    /// The Sardaukar.
    Sardaukar,
    /// The Mercenaries.
    Mercenary,
    /// Unaligned desert life such as sandworms.
    Neutral,
}

impl HouseId {
    /// Houses that can be assigned a player in the lobby, in generation order.
    pub const PLAYABLE: [HouseId; 6] = [
        HouseId::Harkonnen,
        HouseId::Atreides,
        HouseId::Ordos,
        HouseId::Fremen,
        HouseId::Sardaukar,
        HouseId::Mercenary,
    ];

    /// Zero-based index of the house.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit identifying the house inside availability masks.
    #[must_use]
    pub const fn mask_bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Infantry squad trained by the house.
    #[must_use]
    pub const fn infantry_squad(self) -> UnitKind {
        match self {
            Self::Atreides => UnitKind::Infantry,
            _ => UnitKind::Troopers,
        }
    }

    /// Light scout vehicle built by the house.
    #[must_use]
    pub const fn light_vehicle(self) -> UnitKind {
        match self {
            Self::Atreides => UnitKind::Trike,
            Self::Ordos => UnitKind::RaiderTrike,
            _ => UnitKind::Quad,
        }
    }

    /// Special vehicle unlocked by the House of IX.
    #[must_use]
    pub const fn ix_vehicle(self) -> UnitKind {
        match self {
            Self::Atreides => UnitKind::SonicTank,
            Self::Ordos => UnitKind::Deviator,
            _ => UnitKind::Devastator,
        }
    }
}

/// Controller driving a house.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Brain {
    /// The house does not take part in the match.
    #[default]
    None,
    /// The local human player.
    Human,
    /// A computer opponent or ally.
    Cpu,
}

/// Team a house belongs to; houses on the same team are allied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(u8);

impl TeamId {
    /// Largest team number offered by the lobby.
    pub const MAX: u8 = 6;

    /// Creates a new team identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric team.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

/// Width and height of a structure in tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    width: u16,
    height: u16,
}

impl Footprint {
    /// Creates a new footprint.
    #[must_use]
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Number of columns covered.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Number of rows covered.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Tiles covered when anchored at `origin`, or `None` if any of them leaves the map.
    #[must_use]
    pub fn covered_tiles(&self, origin: TileIndex) -> Option<Vec<TileIndex>> {
        let mut tiles = Vec::with_capacity(usize::from(self.width) * usize::from(self.height));
        for dy in 0..self.height {
            for dx in 0..self.width {
                tiles.push(origin.offset(i32::from(dx), i32::from(dy))?);
            }
        }
        Some(tiles)
    }
}

/// Structures an AI base may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StructureKind {
    /// Construction yard.
    ConstructionYard,
    /// Windtrap power plant.
    Windtrap,
    /// Spice refinery.
    Refinery,
    /// Spice storage silo.
    Silo,
    /// Radar outpost.
    Outpost,
    /// Light vehicle factory.
    LightFactory,
    /// Heavy vehicle factory.
    HeavyFactory,
    /// High-tech factory.
    HighTech,
    /// House of IX research centre.
    HouseOfIx,
    /// Palace.
    Palace,
    /// Gun turret.
    Turret,
    /// Rocket turret.
    RocketTurret,
    /// Infantry barracks.
    Barracks,
    /// Trooper training facility.
    WorTrooper,
}

impl StructureKind {
    /// Footprint of the structure.
    #[must_use]
    pub const fn footprint(self) -> Footprint {
        match self {
            Self::Turret | Self::RocketTurret => Footprint::new(1, 1),
            Self::Refinery | Self::HeavyFactory | Self::HighTech => Footprint::new(3, 2),
            Self::Palace => Footprint::new(3, 3),
            Self::ConstructionYard
            | Self::Windtrap
            | Self::Silo
            | Self::Outpost
            | Self::LightFactory
            | Self::HouseOfIx
            | Self::Barracks
            | Self::WorTrooper => Footprint::new(2, 2),
        }
    }

    /// Hit points of an undamaged structure.
    #[must_use]
    pub const fn hit_points(self) -> u16 {
        match self {
            Self::ConstructionYard => 400,
            Self::Windtrap => 200,
            Self::Refinery => 450,
            Self::Silo => 150,
            Self::Outpost => 500,
            Self::LightFactory => 350,
            Self::HeavyFactory => 200,
            Self::HighTech => 400,
            Self::HouseOfIx => 400,
            Self::Palace => 1000,
            Self::Turret => 200,
            Self::RocketTurret => 200,
            Self::Barracks => 300,
            Self::WorTrooper => 400,
        }
    }

    /// Reports whether the structure produces units.
    #[must_use]
    pub const fn is_factory(self) -> bool {
        matches!(
            self,
            Self::LightFactory | Self::HeavyFactory | Self::Barracks | Self::WorTrooper
        )
    }
}

/// Units that generation may place or schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Mobile construction vehicle.
    Mcv,
    /// Squad of troopers.
    Troopers,
    /// Squad of light infantry.
    Infantry,
    /// Trike.
    Trike,
    /// Ordos raider trike.
    RaiderTrike,
    /// Quad.
    Quad,
    /// Combat tank.
    Tank,
    /// Siege tank.
    SiegeTank,
    /// Rocket launcher.
    Launcher,
    /// Harkonnen devastator.
    Devastator,
    /// Atreides sonic tank.
    SonicTank,
    /// Ordos deviator.
    Deviator,
    /// Spice harvester.
    Harvester,
    /// Carryall.
    Carryall,
    /// Ornithopter.
    Ornithopter,
    /// Sandworm.
    Sandworm,
}

impl UnitKind {
    /// Reports whether the unit is a foot soldier squad able to climb mountains.
    #[must_use]
    pub const fn is_infantry(self) -> bool {
        matches!(self, Self::Troopers | Self::Infantry)
    }
}

/// Standing order given to a freshly placed unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitOrder {
    /// Hold position and return fire.
    Guard,
    /// Patrol and engage anything within the surrounding area.
    AreaGuard,
    /// Lie in wait until something comes close.
    Ambush,
}

/// Unique identifier assigned to a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Clears terrain, houses, structures and units.
    ResetWorld,
    /// Replaces the terrain of every tile.
    LoadTerrain {
        /// Terrain produced by the synthesizer.
        terrain: TerrainGrid,
    },
    /// Adds a house to the match roster.
    RegisterHouse {
        /// House joining the match.
        house: HouseId,
        /// Controller of the house.
        brain: Brain,
        /// Team the house plays for.
        team: TeamId,
        /// Starting credits.
        credits: u16,
    },
    /// Requests construction of a structure anchored at `origin`.
    PlaceStructure {
        /// Owner of the structure.
        house: HouseId,
        /// Type of structure.
        kind: StructureKind,
        /// Upper-left tile of the footprint.
        origin: TileIndex,
    },
    /// Requests a single concrete slab.
    LaySlab {
        /// Owner of the slab.
        house: HouseId,
        /// Tile receiving the slab.
        tile: TileIndex,
    },
    /// Requests a single wall segment.
    RaiseWall {
        /// Owner of the wall.
        house: HouseId,
        /// Tile receiving the wall.
        tile: TileIndex,
    },
    /// Requests a unit at the provided tile.
    SpawnUnit {
        /// Owner of the unit.
        house: HouseId,
        /// Type of unit.
        kind: UnitKind,
        /// Tile the unit occupies.
        tile: TileIndex,
        /// Standing order of the unit.
        order: UnitOrder,
    },
    /// Raises the spice level of a single tile by one step.
    EnrichSpice {
        /// Tile receiving spice.
        tile: TileIndex,
    },
    /// Turns a sand tile into a spice bloom.
    PlantSpiceBloom {
        /// Tile receiving the bloom.
        tile: TileIndex,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the world was cleared.
    WorldReset,
    /// Confirms that new terrain was loaded.
    TerrainLoaded,
    /// Confirms that a house joined the roster.
    HouseRegistered {
        /// House that joined.
        house: HouseId,
        /// Controller of the house.
        brain: Brain,
        /// Team of the house.
        team: TeamId,
    },
    /// Confirms that a structure was created.
    StructurePlaced {
        /// Identifier assigned by the world.
        structure: StructureId,
        /// Owner of the structure.
        house: HouseId,
        /// Type of structure.
        kind: StructureKind,
        /// Upper-left tile of the footprint.
        origin: TileIndex,
    },
    /// Reports that a structure request was refused.
    StructureRejected {
        /// Owner named in the request.
        house: HouseId,
        /// Type of structure requested.
        kind: StructureKind,
        /// Requested anchor tile.
        origin: TileIndex,
        /// Reason the request failed.
        reason: PlacementError,
    },
    /// Confirms that a slab was laid.
    SlabLaid {
        /// Owner of the slab.
        house: HouseId,
        /// Tile covered by the slab.
        tile: TileIndex,
    },
    /// Confirms that a wall segment was raised.
    WallRaised {
        /// Owner of the wall.
        house: HouseId,
        /// Tile covered by the wall.
        tile: TileIndex,
    },
    /// Reports that a slab or wall request was refused.
    GroundworkRejected {
        /// Owner named in the request.
        house: HouseId,
        /// Requested tile.
        tile: TileIndex,
        /// Reason the request failed.
        reason: PlacementError,
    },
    /// Confirms that a unit was created.
    UnitSpawned {
        /// Identifier assigned by the world.
        unit: UnitId,
        /// Owner of the unit.
        house: HouseId,
        /// Type of unit.
        kind: UnitKind,
        /// Tile occupied by the unit.
        tile: TileIndex,
    },
    /// Reports that a unit request was refused.
    UnitRejected {
        /// Owner named in the request.
        house: HouseId,
        /// Type of unit requested.
        kind: UnitKind,
        /// Requested tile.
        tile: TileIndex,
        /// Reason the request failed.
        reason: PlacementError,
    },
    /// Confirms that the spice level of a tile rose.
    SpiceEnriched {
        /// Tile whose terrain changed.
        tile: TileIndex,
        /// Terrain of the tile after the change.
        terrain: TerrainClass,
    },
    /// Confirms that a spice bloom was planted.
    SpiceBloomPlanted {
        /// Tile holding the bloom.
        tile: TileIndex,
    },
    /// Reports that a spice bloom request was refused.
    SpiceBloomRejected {
        /// Requested tile.
        tile: TileIndex,
        /// Reason the request failed.
        reason: PlacementError,
    },
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// Part of the request lies outside the playable area.
    OutOfBounds,
    /// A structure or wall already covers a requested tile.
    Occupied,
    /// A unit stands on a requested tile.
    UnitPresent,
    /// The terrain of a requested tile does not allow the placement.
    UnsuitableTerrain,
    /// The owning house has not been registered.
    UnknownHouse,
}

/// Structured reasons a generation attempt failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The terrain produced no island large enough to build on.
    #[error("terrain left no buildable island of at least {minimum} tiles")]
    NoIslands {
        /// Minimum island size in tiles.
        minimum: usize,
    },
    /// Every island was consumed before a house finished its base.
    #[error("no unclaimed island left while placing the base of {house:?}")]
    IslandPoolExhausted {
        /// House whose base was being placed.
        house: HouseId,
    },
    /// A house could not place its base within the attempt ceiling.
    #[error("{house:?} still had {remaining} structures to place after {attempts} attempts")]
    BasePlacementExhausted {
        /// House whose base was being placed.
        house: HouseId,
        /// Number of structures that were never placed.
        remaining: usize,
        /// Attempts spent.
        attempts: u32,
    },
    /// No fair start location exists for a human house.
    #[error("no start location for {house:?} after {attempts} attempts")]
    StartLocationNotFound {
        /// House searching for a start location.
        house: HouseId,
        /// Attempts spent.
        attempts: u32,
    },
    /// The generation mode requested that generation stop.
    #[error("map generation is stopped")]
    Stopped,
    /// The configuration cannot describe a valid match.
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

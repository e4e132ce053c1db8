#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Partitions buildable terrain into disjoint connected islands.
//!
//! Islands live in one shared arena of [`BuildableTile`] records sized to the
//! whole map. Each island owns a contiguous range of the arena, and
//! subdividing a consumed island writes its sub-islands back into that same
//! range. Tiles are discovered breadth-first, so every record also remembers
//! which tile of its island discovered it, forming a tree rooted at the first
//! record of the range.

use dune_skirmish_core::{
    Command, Event, HouseId, PlayableArea, SkirmishRng, TileIndex, CARDINAL_STEPS, MAP_TILE_COUNT,
};
use dune_skirmish_world::{self as world, query, World};

/// Smallest region kept as an island.
pub const MIN_ISLAND_TILES: usize = 50;

/// Identifier of an island inside an [`IslandPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IslandId(usize);

impl IslandId {
    /// Creates a new island identifier.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric identifier.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Flood-fill discovery record of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildableTile {
    tile: TileIndex,
    parent: usize,
}

impl BuildableTile {
    const EMPTY: Self = Self {
        tile: match TileIndex::from_packed(0) {
            Some(tile) => tile,
            None => unreachable!(),
        },
        parent: 0,
    };

    /// Tile described by the record.
    #[must_use]
    pub const fn tile(&self) -> TileIndex {
        self.tile
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.tile.x()
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.tile.y()
    }

    /// Island-relative index of the record that discovered this tile; the root points at itself.
    #[must_use]
    pub const fn parent(&self) -> usize {
        self.parent
    }
}

/// Contiguous range of the arena holding one island.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Island {
    start: usize,
    end: usize,
    used: bool,
}

impl Island {
    /// First arena index of the island.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last arena index of the island.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of tiles in the island.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Reports whether the island holds no tiles.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Reports whether a house already built on, or subdivided, the island.
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        self.used
    }
}

/// Owner of the island arena, labels and scratch buffers of one generation run.
#[derive(Debug)]
pub struct IslandPool {
    arena: Vec<BuildableTile>,
    islands: Vec<Island>,
    labels: Vec<Option<IslandId>>,
    marks: Vec<u32>,
    stamp: u32,
    unclaimed: usize,
    seeds: Vec<TileIndex>,
}

impl IslandPool {
    /// Creates an empty pool with map-sized buffers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            arena: vec![BuildableTile::EMPTY; MAP_TILE_COUNT],
            islands: Vec::new(),
            labels: vec![None; MAP_TILE_COUNT],
            marks: vec![0; MAP_TILE_COUNT],
            stamp: 0,
            unclaimed: 0,
            seeds: Vec::with_capacity(MAP_TILE_COUNT),
        }
    }

    /// Resets the pool to a single unclaimed island covering every tile of `area`.
    ///
    /// The island is not yet connected; [`IslandPool::divide`] splits it into
    /// real islands.
    pub fn seed_playable_area(&mut self, area: PlayableArea) -> IslandId {
        self.islands.clear();
        self.labels.fill(None);
        self.marks.fill(0);
        self.stamp = 0;

        let root = IslandId::new(0);
        let mut end = 0;
        for tile in area.tiles() {
            self.arena[end] = BuildableTile { tile, parent: 0 };
            self.labels[tile.index()] = Some(root);
            end += 1;
        }
        self.islands.push(Island {
            start: 0,
            end,
            used: false,
        });
        self.unclaimed = 1;
        root
    }

    /// Every island ever recorded, claimed or not, in creation order.
    #[must_use]
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Looks up a single island.
    #[must_use]
    pub fn island(&self, id: IslandId) -> Island {
        self.islands[id.get()]
    }

    /// Discovery records of an island, in breadth-first order from its root.
    #[must_use]
    pub fn tiles(&self, id: IslandId) -> &[BuildableTile] {
        let island = self.island(id);
        &self.arena[island.start..island.end]
    }

    /// Island currently owning the tile, if any.
    #[must_use]
    pub fn label(&self, tile: TileIndex) -> Option<IslandId> {
        self.labels[tile.index()]
    }

    /// Number of islands nobody has claimed yet.
    #[must_use]
    pub fn unclaimed_count(&self) -> usize {
        self.unclaimed
    }

    /// Unclaimed islands in creation order.
    pub fn unclaimed(&self) -> impl Iterator<Item = (IslandId, &Island)> {
        self.islands
            .iter()
            .enumerate()
            .filter(|(_, island)| !island.used)
            .map(|(index, island)| (IslandId::new(index), island))
    }

    /// Picks one unclaimed island uniformly at random.
    pub fn pick_unclaimed(&self, rng: &mut SkirmishRng) -> Option<IslandId> {
        if self.unclaimed == 0 {
            return None;
        }
        let pick = rng.range_index(0, self.unclaimed - 1);
        self.unclaimed().nth(pick).map(|(id, _)| id)
    }

    /// Re-floods an island from one of its own tiles so its records are ordered around that tile.
    ///
    /// # Panics
    ///
    /// Panics when the flood does not rediscover exactly the recorded tiles,
    /// which means the island was modified behind the pool's back.
    pub fn refill_from(
        &mut self,
        world: &World,
        rng: &mut SkirmishRng,
        id: IslandId,
        seed: TileIndex,
    ) -> usize {
        let island = self.island(id);
        let area = self.flood(world, rng, id, seed, island.start);
        assert_eq!(
            area,
            island.len(),
            "re-flood of island {} found {area} of {} tiles",
            id.get(),
            island.len()
        );
        area
    }

    /// Splits a consumed island into the islands left among its remaining buildable tiles.
    ///
    /// Regions of at least [`MIN_ISLAND_TILES`] become new unclaimed islands.
    /// Smaller regions are dropped; when `walls_for` names a house, dropped
    /// regions sealed on every side are filled with that house's walls so
    /// nothing gets trapped inside.
    pub fn divide(
        &mut self,
        world: &mut World,
        rng: &mut SkirmishRng,
        id: IslandId,
        walls_for: Option<HouseId>,
        out_events: &mut Vec<Event>,
    ) {
        let consumed = self.island(id);
        let mut start = consumed.start;

        self.seeds.clear();
        self.seeds.extend(
            self.arena[consumed.start..consumed.end]
                .iter()
                .map(|record| record.tile),
        );

        for index in 0..self.seeds.len() {
            let seed = self.seeds[index];
            let area = self.flood(world, rng, id, seed, start);
            if area == 0 {
                continue;
            }

            if area >= MIN_ISLAND_TILES {
                let created = IslandId::new(self.islands.len());
                self.relabel(start, start + area, Some(created));
                self.islands.push(Island {
                    start,
                    end: start + area,
                    used: false,
                });
                self.unclaimed += 1;
                tracing::debug!(
                    target: "dune_skirmish::regions",
                    island = created.get(),
                    tiles = area,
                    "regions.island_created"
                );
                start += area;
                continue;
            }

            self.relabel(start, start + area, None);
            let Some(house) = walls_for else {
                continue;
            };
            let pocket: Vec<TileIndex> = self.arena[start..start + area]
                .iter()
                .map(|record| record.tile)
                .collect();
            if !is_enclosed(world, &pocket) {
                continue;
            }
            tracing::debug!(
                target: "dune_skirmish::regions",
                house = ?house,
                tiles = area,
                "regions.pocket_walled"
            );
            for tile in pocket {
                world::apply(world, Command::RaiseWall { house, tile }, out_events);
            }
        }

        for index in 0..self.seeds.len() {
            let tile = self.seeds[index];
            if self.labels[tile.index()] == Some(id) {
                self.labels[tile.index()] = None;
            }
        }

        self.islands[id.get()].used = true;
        self.unclaimed -= 1;
    }

    fn relabel(&mut self, start: usize, end: usize, label: Option<IslandId>) {
        for record in &self.arena[start..end] {
            self.labels[record.tile.index()] = label;
        }
    }

    /// Breadth-first flood over buildable tiles labelled `source`, writing records from `dest`.
    fn flood(
        &mut self,
        world: &World,
        rng: &mut SkirmishRng,
        source: IslandId,
        seed: TileIndex,
        dest: usize,
    ) -> usize {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.marks.fill(0);
            self.stamp = 1;
        }

        if !self.accepts(world, source, seed) {
            return 0;
        }
        self.arena[dest] = BuildableTile {
            tile: seed,
            parent: 0,
        };
        self.marks[seed.index()] = self.stamp;
        let mut discovered = 1;

        let mut cursor = 0;
        while cursor < discovered {
            let current = self.arena[dest + cursor].tile;
            let rotation = usize::from(rng.byte() & 0x3);
            for turn in 0..CARDINAL_STEPS.len() {
                let (dx, dy) = CARDINAL_STEPS[(rotation + turn) & 0x3];
                let Some(next) = current.offset(dx, dy) else {
                    continue;
                };
                if !self.accepts(world, source, next) {
                    continue;
                }
                self.arena[dest + discovered] = BuildableTile {
                    tile: next,
                    parent: cursor,
                };
                self.marks[next.index()] = self.stamp;
                discovered += 1;
            }
            cursor += 1;
        }
        discovered
    }

    fn accepts(&self, world: &World, source: IslandId, tile: TileIndex) -> bool {
        self.labels[tile.index()] == Some(source)
            && self.marks[tile.index()] != self.stamp
            && query::is_buildable(world, tile)
    }
}

impl Default for IslandPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports whether every tile bordering the region is mountain, wall or structure.
///
/// Neighbours beyond the map edge do not count as openings.
#[must_use]
pub fn is_enclosed(world: &World, region: &[TileIndex]) -> bool {
    let mut inside = vec![false; MAP_TILE_COUNT];
    for tile in region {
        inside[tile.index()] = true;
    }
    region.iter().all(|tile| {
        tile.neighbors().all(|neighbour| {
            inside[neighbour.index()] || query::landscape(world, neighbour).seals_region()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dune_skirmish_core::{TerrainClass, TerrainGrid, MAP_SIZE};

    fn world_from(rows: impl Fn(u16, u16) -> TerrainClass) -> World {
        let mut classes = Vec::with_capacity(MAP_TILE_COUNT);
        for tile in TileIndex::all() {
            classes.push(rows(tile.x(), tile.y()));
        }
        let terrain =
            TerrainGrid::from_parts(classes, vec![0; MAP_TILE_COUNT]).expect("full grid");
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(&mut world, Command::LoadTerrain { terrain }, &mut events);
        world
    }

    #[test]
    fn open_rock_becomes_one_island() {
        let mut world = world_from(|_, _| TerrainClass::Rock);
        let mut pool = IslandPool::new();
        let mut rng = SkirmishRng::new(5);
        let mut events = Vec::new();
        let root = pool.seed_playable_area(PlayableArea::SKIRMISH);
        assert!(!pool.island(root).is_empty());
        pool.divide(&mut world, &mut rng, root, None, &mut events);

        assert_eq!(pool.unclaimed_count(), 1);
        let (id, island) = pool.unclaimed().next().expect("one island");
        assert!(!island.is_empty());
        assert_eq!(island.len(), 62 * 62);
        assert_eq!(pool.tiles(id)[0].parent(), 0);
        assert!(pool.island(root).is_claimed());
        assert!(events.is_empty());
    }

    #[test]
    fn mountain_ridge_splits_the_map() {
        let ridge = MAP_SIZE / 2;
        let mut world = world_from(|x, _| {
            if x == ridge {
                TerrainClass::Mountain
            } else {
                TerrainClass::Sand
            }
        });
        let mut pool = IslandPool::new();
        let mut rng = SkirmishRng::new(9);
        let mut events = Vec::new();
        let root = pool.seed_playable_area(PlayableArea::SKIRMISH);
        pool.divide(&mut world, &mut rng, root, None, &mut events);

        let sizes: Vec<usize> = pool.unclaimed().map(|(_, island)| island.len()).collect();
        assert_eq!(sizes, vec![31 * 62, 30 * 62]);
    }

    #[test]
    fn enclosure_ignores_the_map_edge() {
        let world = world_from(|x, y| {
            if x <= 1 && y <= 1 {
                TerrainClass::Rock
            } else {
                TerrainClass::Mountain
            }
        });
        let corner: Vec<TileIndex> = [(0, 0), (1, 0), (0, 1), (1, 1)]
            .into_iter()
            .map(|(x, y)| TileIndex::from_xy(x, y).expect("tile on map"))
            .collect();
        assert!(is_enclosed(&world, &corner));

        let open = world_from(|_, _| TerrainClass::Rock);
        assert!(!is_enclosed(&open, &corner));
    }
}

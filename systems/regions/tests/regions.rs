use std::collections::BTreeSet;

use dune_skirmish_core::{
    Brain, Command, Event, HouseId, LandscapeParams, PlayableArea, SkirmishRng, TeamId,
    TerrainClass, TerrainGrid, TileIndex, MAP_TILE_COUNT,
};
use dune_skirmish_system_regions::{IslandId, IslandPool, MIN_ISLAND_TILES};
use dune_skirmish_system_terrain::TerrainSynthesizer;
use dune_skirmish_world::{self as world, query, World};

fn synthesized_world(seed: u32) -> (World, SkirmishRng) {
    let mut rng = SkirmishRng::new(seed);
    let terrain = TerrainSynthesizer::new().synthesize(&mut rng, LandscapeParams::default());
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadTerrain { terrain }, &mut events);
    (world, rng)
}

fn painted_world(paint: impl Fn(u16, u16) -> TerrainClass) -> World {
    let classes = TileIndex::all().map(|tile| paint(tile.x(), tile.y())).collect();
    let terrain = TerrainGrid::from_parts(classes, vec![0; MAP_TILE_COUNT]).expect("full grid");
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadTerrain { terrain }, &mut events);
    world
}

fn partitioned(seed: u32) -> (World, IslandPool) {
    let (mut world, mut rng) = synthesized_world(seed);
    let mut pool = IslandPool::new();
    let mut events = Vec::new();
    let root = pool.seed_playable_area(PlayableArea::SKIRMISH);
    pool.divide(&mut world, &mut rng, root, None, &mut events);
    (world, pool)
}

#[test]
fn unclaimed_islands_partition_the_buildable_tiles() {
    for seed in [1, 12345, 777, 0x7FFF] {
        let (world, pool) = partitioned(seed);
        let mut seen = BTreeSet::new();

        for (id, island) in pool.unclaimed() {
            assert!(
                island.len() >= MIN_ISLAND_TILES,
                "seed {seed}: island {} too small",
                id.get()
            );
            for record in pool.tiles(id) {
                let tile = record.tile();
                assert!(query::is_buildable(&world, tile), "seed {seed}: {tile:?} unbuildable");
                assert!(seen.insert(tile), "seed {seed}: {tile:?} in two islands");
                assert_eq!(pool.label(tile), Some(id), "seed {seed}: label mismatch");
            }
        }

        for tile in PlayableArea::SKIRMISH.tiles() {
            if !query::is_buildable(&world, tile) || seen.contains(&tile) {
                continue;
            }
            assert_eq!(
                pool.label(tile),
                None,
                "seed {seed}: buildable {tile:?} outside any island must be discarded"
            );
        }
    }
}

#[test]
fn parent_chains_reach_the_root_through_neighbours() {
    let (world, pool) = partitioned(12345);
    for (id, _) in pool.unclaimed() {
        let tiles = pool.tiles(id);
        assert_eq!(tiles[0].parent(), 0, "root must point at itself");
        for (index, record) in tiles.iter().enumerate().skip(1) {
            let parent = tiles[record.parent()];
            assert!(record.parent() < index, "parents are discovered first");
            assert_eq!(
                parent.tile().distance(record.tile()),
                1,
                "parent of {:?} must be a 4-neighbour",
                record.tile()
            );
            assert!(query::is_buildable(&world, parent.tile()));
        }
    }
}

#[test]
fn identical_seeds_partition_identically() {
    let (_, first) = partitioned(4242);
    let (_, second) = partitioned(4242);

    let collect = |pool: &IslandPool| -> Vec<Vec<TileIndex>> {
        pool.unclaimed()
            .map(|(id, _)| pool.tiles(id).iter().map(|record| record.tile()).collect())
            .collect()
    };
    assert_eq!(collect(&first), collect(&second), "partition diverged between runs");
}

#[test]
fn refill_reorders_an_island_around_the_seed() {
    let (world, mut pool) = partitioned(12345);
    let (id, island) = pool
        .unclaimed()
        .max_by_key(|(_, island)| island.len())
        .map(|(id, island)| (id, *island))
        .expect("seed 12345 yields islands");
    let before: BTreeSet<TileIndex> = pool.tiles(id).iter().map(|record| record.tile()).collect();

    let seed = pool.tiles(id)[island.len() / 2].tile();
    let mut rng = SkirmishRng::new(99);
    let area = pool.refill_from(&world, &mut rng, id, seed);

    assert_eq!(area, island.len());
    assert_eq!(pool.tiles(id)[0].tile(), seed, "refill must root the island at the seed");
    let after: BTreeSet<TileIndex> = pool.tiles(id).iter().map(|record| record.tile()).collect();
    assert_eq!(before, after, "refill must not change island membership");
}

#[test]
fn sealed_pockets_are_walled_for_the_dividing_house() {
    let inside = |x: u16, y: u16| (10..=12).contains(&x) && (10..=12).contains(&y);
    let ring = |x: u16, y: u16| (9..=13).contains(&x) && (9..=13).contains(&y);
    let mut world = painted_world(|x, y| {
        if inside(x, y) {
            TerrainClass::Rock
        } else if ring(x, y) {
            TerrainClass::Mountain
        } else {
            TerrainClass::Sand
        }
    });
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::RegisterHouse {
            house: HouseId::Ordos,
            brain: Brain::Cpu,
            team: TeamId::new(3),
            credits: 1000,
        },
        &mut events,
    );

    let mut pool = IslandPool::new();
    let mut rng = SkirmishRng::new(3);
    let root = pool.seed_playable_area(PlayableArea::SKIRMISH);
    events.clear();
    pool.divide(&mut world, &mut rng, root, Some(HouseId::Ordos), &mut events);

    let walls = events
        .iter()
        .filter(|event| matches!(event, Event::WallRaised { house: HouseId::Ordos, .. }))
        .count();
    assert_eq!(walls, 9, "the 3x3 pocket should be walled in");
    let centre = TileIndex::from_xy(11, 11).expect("tile on map");
    assert_eq!(query::landscape(&world, centre), TerrainClass::Wall);
    assert_eq!(pool.unclaimed_count(), 1, "the open desert remains one island");
}

#[test]
fn pockets_open_to_the_desert_are_discarded_without_walls() {
    let inside = |x: u16, y: u16| (30..=32).contains(&x) && (30..=32).contains(&y);
    let ring = |x: u16, y: u16| (29..=33).contains(&x) && (29..=33).contains(&y);
    let mut world = painted_world(|x, y| {
        if inside(x, y) {
            TerrainClass::Rock
        } else if ring(x, y) {
            TerrainClass::Spice
        } else {
            TerrainClass::Mountain
        }
    });
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::RegisterHouse {
            house: HouseId::Harkonnen,
            brain: Brain::Cpu,
            team: TeamId::new(1),
            credits: 1000,
        },
        &mut events,
    );

    let mut pool = IslandPool::new();
    let mut rng = SkirmishRng::new(11);
    let root = pool.seed_playable_area(PlayableArea::SKIRMISH);
    events.clear();
    pool.divide(&mut world, &mut rng, root, Some(HouseId::Harkonnen), &mut events);

    assert!(events.is_empty(), "spice is not a seal, so no walls are raised");
    let centre = TileIndex::from_xy(31, 31).expect("tile on map");
    assert_eq!(query::landscape(&world, centre), TerrainClass::Rock);
    assert_eq!(pool.label(centre), None, "small regions are dropped from the pool");
    assert_eq!(pool.unclaimed_count(), 0);
}

#[test]
fn picking_from_an_exhausted_pool_yields_nothing() {
    let mut world = painted_world(|_, _| TerrainClass::Mountain);
    let mut pool = IslandPool::new();
    let mut rng = SkirmishRng::new(1);
    let mut events = Vec::new();
    let root = pool.seed_playable_area(PlayableArea::SKIRMISH);
    assert_eq!(pool.pick_unclaimed(&mut rng), Some(IslandId::new(0)));

    pool.divide(&mut world, &mut rng, root, None, &mut events);
    assert_eq!(pool.unclaimed_count(), 0);
    assert_eq!(pool.pick_unclaimed(&mut rng), None);
}

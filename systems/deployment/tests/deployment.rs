use dune_skirmish_core::{
    Brain, CampaignTier, Command, Event, HouseId, PlacementError, PlayableArea, SkirmishRng,
    StartingArmy, StructureKind, TeamId, TerrainClass, TerrainGrid, TileIndex, UnitKind,
    UnitOrder, MAP_TILE_COUNT,
};
use dune_skirmish_system_deployment::{
    ArmyDeployer, GarrisonDeployer, StartLocationFinder, GARRISON_SIZE, MARGIN_X, MARGIN_Y,
};
use dune_skirmish_system_regions::IslandPool;
use dune_skirmish_world::{self as world, query, World};

fn tile(x: u16, y: u16) -> TileIndex {
    TileIndex::from_xy(x, y).expect("tile on map")
}

fn painted_world(paint: impl Fn(u16, u16) -> TerrainClass) -> World {
    let classes = TileIndex::all().map(|tile| paint(tile.x(), tile.y())).collect();
    let terrain = TerrainGrid::from_parts(classes, vec![0; MAP_TILE_COUNT]).expect("full grid");
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::LoadTerrain { terrain }, &mut events);
    for (house, brain, team) in [
        (HouseId::Atreides, Brain::Human, 2),
        (HouseId::Harkonnen, Brain::Cpu, 1),
    ] {
        world::apply(
            &mut world,
            Command::RegisterHouse {
                house,
                brain,
                team: TeamId::new(team),
                credits: 1000,
            },
            &mut events,
        );
    }
    world
}

fn place(world: &mut World, house: HouseId, kind: StructureKind, origin: TileIndex) {
    let mut events = Vec::new();
    world::apply(world, Command::PlaceStructure { house, kind, origin }, &mut events);
    assert!(
        matches!(events.as_slice(), [Event::StructurePlaced { .. }]),
        "{kind:?} should fit at {origin:?}"
    );
}

fn partition(world: &mut World, rng: &mut SkirmishRng) -> IslandPool {
    let mut pool = IslandPool::new();
    let mut events = Vec::new();
    let root = pool.seed_playable_area(PlayableArea::SKIRMISH);
    pool.divide(world, rng, root, None, &mut events);
    pool
}

#[test]
fn start_location_keeps_clear_of_enemy_bases() {
    let mut world = painted_world(|_, _| TerrainClass::Rock);
    place(&mut world, HouseId::Harkonnen, StructureKind::ConstructionYard, tile(10, 10));
    let mut rng = SkirmishRng::new(12345);
    let pool = partition(&mut world, &mut rng);

    let finder = StartLocationFinder::for_team_count(2);
    let start = finder
        .find(&world, &pool, &mut rng, HouseId::Atreides)
        .expect("open rock leaves room for a start");

    assert!(start.distance(tile(10, 10)) >= finder.threshold());
    assert!(PlayableArea::SKIRMISH.contains_with_margin(start, MARGIN_X, MARGIN_Y));
}

#[test]
fn allied_structures_do_not_block_a_start() {
    let mut world = painted_world(|_, _| TerrainClass::Rock);
    place(&mut world, HouseId::Atreides, StructureKind::Windtrap, tile(30, 30));
    let mut rng = SkirmishRng::new(8);
    let pool = partition(&mut world, &mut rng);

    let finder = StartLocationFinder::new(200);
    assert!(
        finder.find(&world, &pool, &mut rng, HouseId::Atreides).is_some(),
        "own structures are never a threat"
    );
}

#[test]
fn crowded_maps_report_no_start_location() {
    let mut world = painted_world(|_, _| TerrainClass::Rock);
    place(&mut world, HouseId::Harkonnen, StructureKind::Windtrap, tile(30, 30));
    let mut rng = SkirmishRng::new(8);
    let pool = partition(&mut world, &mut rng);

    let finder = StartLocationFinder::new(200);
    assert_eq!(finder.find(&world, &pool, &mut rng, HouseId::Atreides), None);
}

#[test]
fn large_army_deploys_the_full_kit_once() {
    let mut world = painted_world(|_, _| TerrainClass::Sand);
    let mut events = Vec::new();
    ArmyDeployer::new().deploy(
        &mut world,
        HouseId::Atreides,
        tile(30, 30),
        StartingArmy::Large,
        &mut events,
    );

    let units: Vec<_> = query::units(&world).collect();
    assert_eq!(units.len(), 7);
    assert_eq!(
        units.iter().filter(|unit| unit.kind == UnitKind::Mcv).count(),
        1,
        "exactly one MCV"
    );
    assert_eq!(units[0].tile, tile(30, 30), "the MCV sits on the start tile");
    assert_eq!(units[1].tile, tile(26, 30));
    assert!(units
        .iter()
        .all(|unit| unit.house == HouseId::Atreides && unit.order == UnitOrder::Guard));
}

#[test]
fn small_army_stops_after_the_troopers() {
    let mut world = painted_world(|_, _| TerrainClass::Sand);
    let mut events = Vec::new();
    ArmyDeployer::new().deploy(
        &mut world,
        HouseId::Atreides,
        tile(30, 30),
        StartingArmy::Small,
        &mut events,
    );

    let kinds: Vec<UnitKind> = query::units(&world).map(|unit| unit.kind).collect();
    assert_eq!(kinds, vec![UnitKind::Mcv, UnitKind::Troopers]);
}

#[test]
fn kit_units_step_around_mountains() {
    let mut world = painted_world(|x, y| {
        if y == 30 && (25..=27).contains(&x) {
            TerrainClass::Mountain
        } else {
            TerrainClass::Sand
        }
    });
    let mut events = Vec::new();
    ArmyDeployer::new().deploy(
        &mut world,
        HouseId::Atreides,
        tile(30, 30),
        StartingArmy::Small,
        &mut events,
    );

    let troopers = query::units(&world)
        .find(|unit| unit.kind == UnitKind::Troopers)
        .expect("troopers deployed");
    assert_eq!(troopers.tile, tile(24, 30), "first clear column on the nominal row");
}

#[test]
fn kit_units_without_room_are_refused_rather_than_stacked() {
    let mut world = painted_world(|x, y| {
        if (x, y) == (30, 30) {
            TerrainClass::Sand
        } else {
            TerrainClass::Mountain
        }
    });
    let mut events = Vec::new();
    ArmyDeployer::new().deploy(
        &mut world,
        HouseId::Atreides,
        tile(30, 30),
        StartingArmy::Small,
        &mut events,
    );

    let kinds: Vec<UnitKind> = query::units(&world).map(|unit| unit.kind).collect();
    assert_eq!(kinds, vec![UnitKind::Mcv]);
    assert!(matches!(
        events.last(),
        Some(Event::UnitRejected {
            kind: UnitKind::Troopers,
            reason: PlacementError::UnitPresent,
            ..
        })
    ));
}

#[test]
fn garrison_gathers_around_the_factories() {
    let mut world = painted_world(|_, _| TerrainClass::Rock);
    place(&mut world, HouseId::Harkonnen, StructureKind::ConstructionYard, tile(20, 20));
    place(&mut world, HouseId::Harkonnen, StructureKind::LightFactory, tile(23, 20));
    let mut rng = SkirmishRng::new(99);
    let mut events = Vec::new();

    let deployed = GarrisonDeployer::new().deploy(
        &mut world,
        &mut rng,
        HouseId::Harkonnen,
        CampaignTier::new(2),
        &mut events,
    );

    assert_eq!(deployed, GARRISON_SIZE);
    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::UnitSpawned { .. }))
        .count();
    assert_eq!(spawned, deployed, "only accepted spawns are counted");
    assert_eq!(query::units(&world).count(), deployed);
    let origins: Vec<TileIndex> = query::structures(&world).map(|record| record.origin).collect();
    for unit in query::units(&world) {
        assert_eq!(unit.house, HouseId::Harkonnen);
        assert_eq!(unit.kind, UnitKind::Quad, "light factories build quads for Harkonnen");
        assert_eq!(unit.order, UnitOrder::AreaGuard);
        assert!(origins.iter().any(|origin| origin.distance(unit.tile) <= 8));
    }
}

#[test]
fn bases_without_factories_get_no_garrison() {
    let mut world = painted_world(|_, _| TerrainClass::Rock);
    place(&mut world, HouseId::Harkonnen, StructureKind::ConstructionYard, tile(20, 20));
    let mut rng = SkirmishRng::new(99);
    let mut events = Vec::new();

    let deployed = GarrisonDeployer::new().deploy(
        &mut world,
        &mut rng,
        HouseId::Harkonnen,
        CampaignTier::new(2),
        &mut events,
    );
    assert_eq!(deployed, 0);
    assert_eq!(query::units(&world).count(), 0);
}

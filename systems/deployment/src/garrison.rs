//! Starting garrison of CPU houses.

use dune_skirmish_core::{
    CampaignTier, Command, Event, HouseId, SkirmishRng, StructureKind, TerrainClass, TileIndex,
    UnitKind, UnitOrder,
};
use dune_skirmish_world::{self as world, query, World};

/// Units every CPU house with a factory starts with.
pub const GARRISON_SIZE: usize = 8;

/// Random tiles drawn per garrison unit before the garrison is cut short.
pub const MAX_GARRISON_DRAWS: u32 = 100;

const MAX_FACTORIES: usize = 8;
const MAX_BASE_DISTANCE: u16 = 8;

/// Units a factory of `house` can produce at the given tier.
#[must_use]
pub fn factory_products(kind: StructureKind, house: HouseId, tier: CampaignTier) -> Vec<UnitKind> {
    match kind {
        StructureKind::LightFactory => vec![house.light_vehicle()],
        StructureKind::HeavyFactory => {
            let mut products = vec![UnitKind::Tank];
            if tier.get() >= 5 {
                products.push(UnitKind::Launcher);
            }
            if tier.get() >= 6 {
                products.push(UnitKind::SiegeTank);
            }
            products
        }
        StructureKind::Barracks => vec![house.infantry_squad()],
        StructureKind::WorTrooper => vec![UnitKind::Troopers],
        _ => Vec::new(),
    }
}

/// Scatters a garrison around the base of a CPU house.
#[derive(Debug, Default)]
pub struct GarrisonDeployer {
    factories: Vec<StructureKind>,
}

impl GarrisonDeployer {
    /// Creates a new deployer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns up to [`GARRISON_SIZE`] units near the structures of `house`, returning how many the world accepted.
    ///
    /// Houses without a factory get no garrison.
    pub fn deploy(
        &mut self,
        world: &mut World,
        rng: &mut SkirmishRng,
        house: HouseId,
        tier: CampaignTier,
        out_events: &mut Vec<Event>,
    ) -> usize {
        self.factories.clear();
        self.factories.extend(
            query::structures(world)
                .filter(|structure| structure.house == house && structure.kind.is_factory())
                .map(|structure| structure.kind)
                .take(MAX_FACTORIES),
        );
        if self.factories.is_empty() {
            return 0;
        }

        let mut deployed = 0;
        for _ in 0..GARRISON_SIZE {
            let Some(tile) = pick_garrison_tile(world, rng, house) else {
                tracing::debug!(
                    target: "dune_skirmish::deployment",
                    house = ?house,
                    deployed,
                    "deployment.garrison_cut_short"
                );
                break;
            };

            let kind = if query::landscape(world, tile) == TerrainClass::Mountain {
                house.infantry_squad()
            } else {
                let factory = self.factories[rng.range_index(0, self.factories.len() - 1)];
                let products = factory_products(factory, house, tier);
                if products.len() == 1 {
                    products[0]
                } else {
                    products[rng.range_index(0, products.len() - 1)]
                }
            };

            world::apply(
                world,
                Command::SpawnUnit {
                    house,
                    kind,
                    tile,
                    order: UnitOrder::AreaGuard,
                },
                out_events,
            );
            if matches!(out_events.last(), Some(Event::UnitSpawned { .. })) {
                deployed += 1;
            }
        }
        deployed
    }
}

fn pick_garrison_tile(world: &World, rng: &mut SkirmishRng, house: HouseId) -> Option<TileIndex> {
    let area = query::playable_area(world);
    for _ in 0..MAX_GARRISON_DRAWS {
        let x = area.min_x() + rng.range(0, area.width() - 1);
        let y = area.min_y() + rng.range(0, area.height() - 1);
        let Some(tile) = TileIndex::from_xy(x, y) else {
            continue;
        };
        if query::unit_at(world, tile).is_some() {
            continue;
        }
        if matches!(
            query::landscape(world, tile),
            TerrainClass::Wall | TerrainClass::Structure | TerrainClass::SpiceBloom
        ) {
            continue;
        }
        let near_base = query::nearest_structures(world, house, tile)
            .ally
            .is_some_and(|distance| distance <= MAX_BASE_DISTANCE);
        if near_base {
            return Some(tile);
        }
    }
    None
}

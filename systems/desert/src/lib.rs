#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Post-placement desert features: spice blooms, spice fields and sandworms.

use dune_skirmish_core::{
    Command, Event, HouseId, SkirmishRng, TerrainClass, TileIndex, UnitKind, UnitOrder,
};
use dune_skirmish_world::{self as world, query, World};

/// Radius of the spice field left behind by an erupting bloom.
pub const SPICE_FIELD_RADIUS: u16 = 5;

/// Random tiles drawn per sandworm before the worm is dropped.
pub const MAX_WORM_DRAWS: u32 = 100;

/// Fewest bloom sites drawn per map.
const MIN_BLOOM_PICKS: u16 = 5;

/// Most bloom sites drawn per map.
const MAX_BLOOM_PICKS: u16 = 10;

/// Summary of a bloom scattering pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BloomReport {
    /// Sites drawn, including rejected ones.
    pub picks: u16,
    /// Spice blooms planted.
    pub blooms: u16,
    /// Spice fields spread.
    pub fields: u16,
}

/// Scatters blooms and releases sandworms once every house is deployed.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesertScatter;

impl DesertScatter {
    /// Creates a new scatter system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Draws five to ten sites on open sand; a quarter become spice fields, the rest blooms.
    ///
    /// Sites that are not empty sand or dunes are skipped without a retry.
    pub fn scatter_blooms(
        &self,
        world: &mut World,
        rng: &mut SkirmishRng,
        out_events: &mut Vec<Event>,
    ) -> BloomReport {
        let mut report = BloomReport {
            picks: rng.range(MIN_BLOOM_PICKS, MAX_BLOOM_PICKS),
            ..BloomReport::default()
        };

        for _ in 0..report.picks {
            let Some(tile) = random_tile(world, rng) else {
                continue;
            };
            if query::unit_at(world, tile).is_some() || !query::landscape(world, tile).is_sand_like()
            {
                continue;
            }

            if rng.byte() & 0x3 == 0 {
                fill_spice_circle(world, rng, tile, SPICE_FIELD_RADIUS, out_events);
                report.fields += 1;
            } else {
                world::apply(world, Command::PlantSpiceBloom { tile }, out_events);
                report.blooms += 1;
            }
        }

        tracing::debug!(
            target: "dune_skirmish::desert",
            picks = report.picks,
            blooms = report.blooms,
            fields = report.fields,
            "desert.blooms_scattered"
        );
        report
    }

    /// Places neutral sandworms on open desert, returning how many were released.
    ///
    /// Insatiable worms patrol their area instead of lying in ambush.
    pub fn release_sandworms(
        &self,
        world: &mut World,
        rng: &mut SkirmishRng,
        count: u8,
        insatiable: bool,
        out_events: &mut Vec<Event>,
    ) -> u8 {
        let order = if insatiable {
            UnitOrder::AreaGuard
        } else {
            UnitOrder::Ambush
        };

        let mut released = 0;
        for _ in 0..count {
            let Some(tile) = (0..MAX_WORM_DRAWS)
                .filter_map(|_| random_tile(world, rng))
                .find(|tile| {
                    query::unit_at(world, *tile).is_none()
                        && query::landscape(world, *tile).is_worm_habitat()
                })
            else {
                tracing::debug!(
                    target: "dune_skirmish::desert",
                    released,
                    count,
                    "desert.sandworm_dropped"
                );
                continue;
            };

            world::apply(
                world,
                Command::SpawnUnit {
                    house: HouseId::Neutral,
                    kind: UnitKind::Sandworm,
                    tile,
                    order,
                },
                out_events,
            );
            released += 1;
        }
        released
    }
}

/// Spreads spice over a disc around `centre`.
///
/// Every tile strictly inside the radius gains one level of spice unless it
/// already holds plain spice; rim tiles only do so on a coin flip. The centre
/// gains one extra level afterwards.
pub fn fill_spice_circle(
    world: &mut World,
    rng: &mut SkirmishRng,
    centre: TileIndex,
    radius: u16,
    out_events: &mut Vec<Event>,
) {
    if radius == 0 {
        return;
    }
    let reach = i32::from(radius);
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let Some(tile) = centre.offset(dx, dy) else {
                continue;
            };
            let distance = centre.distance(tile);
            if distance > radius {
                continue;
            }
            if distance == radius && rng.byte() & 0x1 == 0 {
                continue;
            }
            if query::tile(world, tile).ground() == TerrainClass::Spice {
                continue;
            }
            world::apply(world, Command::EnrichSpice { tile }, out_events);
        }
    }
    world::apply(world, Command::EnrichSpice { tile: centre }, out_events);
}

fn random_tile(world: &World, rng: &mut SkirmishRng) -> Option<TileIndex> {
    let area = query::playable_area(world);
    let x = area.min_x() + rng.range(0, area.width() - 1);
    let y = area.min_y() + rng.range(0, area.height() - 1);
    TileIndex::from_xy(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dune_skirmish_core::{TerrainGrid, MAP_TILE_COUNT};

    fn desert(ground: TerrainClass) -> World {
        let terrain = TerrainGrid::from_parts(vec![ground; MAP_TILE_COUNT], vec![0; MAP_TILE_COUNT])
            .expect("full grid");
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(&mut world, Command::LoadTerrain { terrain }, &mut events);
        world
    }

    #[test]
    fn spice_circle_thickens_the_centre() {
        let mut world = desert(TerrainClass::Sand);
        let mut rng = SkirmishRng::new(17);
        let mut events = Vec::new();
        let centre = TileIndex::from_xy(30, 30).expect("tile on map");

        fill_spice_circle(&mut world, &mut rng, centre, SPICE_FIELD_RADIUS, &mut events);

        assert_eq!(query::tile(&world, centre).ground(), TerrainClass::ThickSpice);
        let inner = TileIndex::from_xy(33, 30).expect("tile on map");
        assert_eq!(query::tile(&world, inner).ground(), TerrainClass::Spice);
        let outside = TileIndex::from_xy(36, 30).expect("tile on map");
        assert_eq!(query::tile(&world, outside).ground(), TerrainClass::Sand);
    }

    #[test]
    fn spice_circle_leaves_rock_alone() {
        let mut world = desert(TerrainClass::Rock);
        let mut rng = SkirmishRng::new(17);
        let mut events = Vec::new();
        let centre = TileIndex::from_xy(2, 2).expect("tile on map");

        fill_spice_circle(&mut world, &mut rng, centre, SPICE_FIELD_RADIUS, &mut events);
        assert!(events.is_empty(), "rock never turns into spice");
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deploys the starting forces of every house.
//!
//! Human houses get a fair start tile away from enemy bases and a fixed unit
//! kit around it. CPU houses get a garrison produced by the factories of the
//! base their build planner left behind.

mod garrison;

use dune_skirmish_core::{
    Command, Event, HouseId, SkirmishRng, StartingArmy, TileIndex, UnitKind, UnitOrder,
};
use dune_skirmish_system_regions::IslandPool;
use dune_skirmish_world::{self as world, query, World};

pub use garrison::{factory_products, GarrisonDeployer, GARRISON_SIZE, MAX_GARRISON_DRAWS};

/// Attempts spent looking for a start location.
pub const MAX_ATTEMPTS: u32 = 100;

/// Columns a start tile keeps from the left and right edges of the playable area.
pub const MARGIN_X: u16 = 4;

/// Rows a start tile keeps from the top and bottom edges of the playable area.
pub const MARGIN_Y: u16 = 3;

/// Searches the island pool for a start tile far enough from every enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StartLocationFinder {
    threshold: u16,
}

impl StartLocationFinder {
    /// Creates a finder with an explicit enemy distance threshold.
    #[must_use]
    pub const fn new(threshold: u16) -> Self {
        Self { threshold }
    }

    /// Creates a finder whose threshold shrinks as more teams share the map.
    #[must_use]
    pub const fn for_team_count(team_count: usize) -> Self {
        let threshold = match team_count {
            5 => 28,
            6 => 24,
            _ => 32,
        };
        Self::new(threshold)
    }

    /// Minimum distance between the start tile and any enemy structure or unit.
    #[must_use]
    pub const fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Picks a start tile for `house`, or `None` once the attempts run out.
    pub fn find(
        &self,
        world: &World,
        pool: &IslandPool,
        rng: &mut SkirmishRng,
        house: HouseId,
    ) -> Option<TileIndex> {
        let area = query::playable_area(world);
        for attempt in 0..MAX_ATTEMPTS {
            let island_id = pool.pick_unclaimed(rng)?;
            let island = pool.island(island_id);
            let pick = rng.range_index(island.start(), island.end() - 1);
            let candidate = pool.tiles(island_id)[pick - island.start()].tile();

            if !area.contains_with_margin(candidate, MARGIN_X, MARGIN_Y) {
                continue;
            }
            if self.threatened(world, house, candidate) {
                continue;
            }

            tracing::debug!(
                target: "dune_skirmish::deployment",
                house = ?house,
                attempt,
                x = candidate.x(),
                y = candidate.y(),
                "deployment.start_location"
            );
            return Some(candidate);
        }
        None
    }

    fn threatened(&self, world: &World, house: HouseId, candidate: TileIndex) -> bool {
        let near = |owner: HouseId, tile: TileIndex| {
            !query::are_allied(world, house, owner) && tile.distance(candidate) < self.threshold
        };
        query::structures(world).any(|structure| near(structure.house, structure.origin))
            || query::units(world).any(|unit| near(unit.house, unit.tile))
    }
}

/// Unit kit of a human house with its offset from the start tile.
pub const STARTING_KIT: [(UnitKind, i32, i32); 7] = [
    (UnitKind::Mcv, 0, 0),
    (UnitKind::Troopers, -4, 0),
    (UnitKind::Quad, 4, 0),
    (UnitKind::Quad, -2, -3),
    (UnitKind::Tank, 2, -3),
    (UnitKind::SiegeTank, -2, 3),
    (UnitKind::SiegeTank, 2, 3),
];

const SEARCH_ROWS: [i32; 3] = [0, -1, 1];
const SEARCH_COLUMNS: [i32; 7] = [0, -1, 1, -2, 2, -3, 3];

/// Deploys the starting kit of a human house around its start tile.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArmyDeployer;

impl ArmyDeployer {
    /// Creates a new deployer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Units of the kit deployed for the army size.
    ///
    /// A small army is the MCV and its troopers; both quads stay behind.
    #[must_use]
    pub fn kit(army: StartingArmy) -> &'static [(UnitKind, i32, i32)] {
        match army {
            StartingArmy::Small => &STARTING_KIT[..2],
            StartingArmy::Large => &STARTING_KIT,
        }
    }

    /// Spawns the kit, moving each unit to the first clear tile near its nominal spot.
    ///
    /// A unit without a clear tile falls back to `start`; when the world refuses
    /// that spawn too, the unit is left out and the refusal stays in `out_events`.
    pub fn deploy(
        &self,
        world: &mut World,
        house: HouseId,
        start: TileIndex,
        army: StartingArmy,
        out_events: &mut Vec<Event>,
    ) {
        for &(kind, dx, dy) in Self::kit(army) {
            let clear = Self::clear_tile_near(world, house, kind, start, dx, dy);
            let tile = clear.unwrap_or(start);
            world::apply(
                world,
                Command::SpawnUnit {
                    house,
                    kind,
                    tile,
                    order: UnitOrder::Guard,
                },
                out_events,
            );
            if let Some(Event::UnitRejected { reason, .. }) = out_events.last() {
                tracing::debug!(
                    target: "dune_skirmish::deployment",
                    house = ?house,
                    kind = ?kind,
                    fallback = clear.is_none(),
                    reason = ?reason,
                    "deployment.kit_unit_refused"
                );
            }
        }
    }

    fn clear_tile_near(
        world: &World,
        house: HouseId,
        kind: UnitKind,
        start: TileIndex,
        dx: i32,
        dy: i32,
    ) -> Option<TileIndex> {
        SEARCH_ROWS
            .iter()
            .flat_map(|row| SEARCH_COLUMNS.iter().map(move |column| (*column, *row)))
            .filter_map(|(column, row)| start.offset(dx + column, dy + row))
            .find(|tile| {
                !query::landscape(world, *tile).blocks_deployment()
                    && query::unit_placement(world, house, kind, *tile).is_ok()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_shrink_with_crowded_maps() {
        assert_eq!(StartLocationFinder::for_team_count(2).threshold(), 32);
        assert_eq!(StartLocationFinder::for_team_count(5).threshold(), 28);
        assert_eq!(StartLocationFinder::for_team_count(6).threshold(), 24);
    }

    #[test]
    fn small_armies_keep_the_mcv_and_troopers() {
        let kinds: Vec<UnitKind> = ArmyDeployer::kit(StartingArmy::Small)
            .iter()
            .map(|(kind, _, _)| *kind)
            .collect();
        assert_eq!(kinds, vec![UnitKind::Mcv, UnitKind::Troopers]);
        assert_eq!(ArmyDeployer::kit(StartingArmy::Large).len(), 7);
    }
}

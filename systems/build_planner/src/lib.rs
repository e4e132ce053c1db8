#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Places the starting base of a CPU house.
//!
//! The planner walks a tier-gated build order, claims an island for each
//! attempt, drops structures ever further from a random anchor tile, links
//! them back to the anchor with concrete slabs and finally hands the leftover
//! ground back to the island pool as smaller islands.

use dune_skirmish_core::{
    CampaignTier, Command, Event, GenerationError, HouseId, MatchKind, SkirmishRng,
    StructureKind, TerrainClass,
};
use dune_skirmish_system_regions::{IslandId, IslandPool};
use dune_skirmish_world::{self as world, query, World};

/// Attempts a house gets to complete its base.
pub const MAX_ATTEMPTS: u32 = 100;

/// Number of island tiles searched for the first structure of an attempt.
pub const INITIAL_RADIUS: usize = 8;

/// Search radius gained after each successful placement.
const RADIUS_STEP: usize = 4;

/// Structure budget shared by all CPU houses of a skirmish.
const SKIRMISH_STRUCTURE_BUDGET: usize = 60;

/// Structure cap of a single multiplayer house.
const MULTIPLAYER_STRUCTURE_CAP: usize = 10;

/// One line of the build order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOrderEntry {
    /// Structure to build.
    pub kind: StructureKind,
    /// Technology block the entry belongs to, starting at 1.
    pub tier: u8,
    /// Lower priorities are built first and survive the structure cap.
    pub priority: u8,
    /// Whether houses allied with the human player build this entry.
    pub available_to_ally: bool,
    /// Houses allowed to build the entry, one bit per house.
    pub house_mask: u8,
}

impl BuildOrderEntry {
    const fn new(kind: StructureKind, tier: u8, priority: u8, available_to_ally: bool) -> Self {
        Self {
            kind,
            tier,
            priority,
            available_to_ally,
            house_mask: 0xFF,
        }
    }

    /// Reports whether the entry is unlocked by the campaign tier.
    #[must_use]
    pub const fn unlocked_by(&self, tier: CampaignTier) -> bool {
        self.tier <= tier.get().saturating_add(1)
    }
}

/// Build order shared by every CPU house.
pub const BUILD_ORDER: [BuildOrderEntry; 30] = {
    use StructureKind::*;
    [
        BuildOrderEntry::new(ConstructionYard, 1, 1, true),
        BuildOrderEntry::new(Windtrap, 1, 2, true),
        BuildOrderEntry::new(Refinery, 1, 3, true),
        BuildOrderEntry::new(Refinery, 2, 13, false),
        BuildOrderEntry::new(LightFactory, 2, 4, true),
        BuildOrderEntry::new(Windtrap, 2, 16, false),
        BuildOrderEntry::new(Silo, 3, 98, false),
        BuildOrderEntry::new(Outpost, 3, 5, true),
        BuildOrderEntry::new(Windtrap, 4, 9, true),
        BuildOrderEntry::new(HeavyFactory, 4, 6, true),
        BuildOrderEntry::new(Turret, 4, 10, true),
        BuildOrderEntry::new(Turret, 4, 21, false),
        BuildOrderEntry::new(Windtrap, 5, 22, false),
        BuildOrderEntry::new(HighTech, 5, 7, true),
        BuildOrderEntry::new(RocketTurret, 5, 11, true),
        BuildOrderEntry::new(RocketTurret, 5, 12, false),
        BuildOrderEntry::new(HeavyFactory, 6, 14, false),
        BuildOrderEntry::new(Turret, 6, 23, false),
        BuildOrderEntry::new(RocketTurret, 6, 15, false),
        BuildOrderEntry::new(Windtrap, 7, 18, true),
        BuildOrderEntry::new(HouseOfIx, 7, 8, true),
        BuildOrderEntry::new(Turret, 7, 24, false),
        BuildOrderEntry::new(RocketTurret, 7, 17, true),
        BuildOrderEntry::new(Windtrap, 8, 25, false),
        BuildOrderEntry::new(Palace, 8, 19, true),
        BuildOrderEntry::new(RocketTurret, 8, 26, false),
        BuildOrderEntry::new(RocketTurret, 8, 27, false),
        BuildOrderEntry::new(ConstructionYard, 9, 20, false),
        BuildOrderEntry::new(RocketTurret, 9, 28, false),
        BuildOrderEntry::new(RocketTurret, 9, 29, false),
    ]
};

/// Distance rules between a new base and the bases already on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistanceLimits {
    /// Farthest an allied structure may be from the anchor tile.
    pub max_ally: u16,
    /// Closest an enemy structure may be to the anchor tile.
    pub min_enemy: u16,
}

impl DistanceLimits {
    /// Limits for a match with the given number of teams.
    #[must_use]
    pub const fn for_team_count(team_count: usize) -> Self {
        match team_count {
            5 => Self {
                max_ally: 20,
                min_enemy: 20,
            },
            6 => Self {
                max_ally: 25,
                min_enemy: 15,
            },
            _ => Self {
                max_ally: 16,
                min_enemy: 24,
            },
        }
    }
}

/// Everything the planner needs to know about the house it builds for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannerInput {
    /// House receiving the base.
    pub house: HouseId,
    /// Technology cap of the match.
    pub tier: CampaignTier,
    /// Number of distinct teams in the match.
    pub team_count: usize,
    /// Number of CPU houses sharing the structure budget.
    pub cpu_count: usize,
    /// Skirmish or multiplayer.
    pub match_kind: MatchKind,
    /// Whether the house fights alongside the human player.
    pub allied_with_human: bool,
}

/// Selects the build order entries a house will place, in placement order.
///
/// When more entries qualify than the cap allows, only entries strictly
/// cheaper than the priority found at the cap position survive.
#[must_use]
pub fn build_list(order: &[BuildOrderEntry], input: &PlannerInput) -> Vec<BuildOrderEntry> {
    let mut list: Vec<BuildOrderEntry> = order
        .iter()
        .filter(|entry| entry.unlocked_by(input.tier))
        .filter(|entry| entry.house_mask & input.house.mask_bit() != 0)
        .filter(|entry| entry.available_to_ally || !input.allied_with_human)
        .copied()
        .collect();
    list.sort_by_key(|entry| entry.priority);

    let cap = match input.match_kind {
        MatchKind::Skirmish => SKIRMISH_STRUCTURE_BUDGET / input.cpu_count.max(1),
        MatchKind::Multiplayer => MULTIPLAYER_STRUCTURE_CAP,
    };
    if list.len() > cap {
        let cutoff = list[cap].priority;
        list.retain(|entry| entry.priority < cutoff);
    }
    list
}

/// Base placement system reused across houses and generation attempts.
#[derive(Debug, Default)]
pub struct BuildPlanner {
    pending: Vec<BuildOrderEntry>,
}

impl BuildPlanner {
    /// Creates a new planner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the base of one CPU house, returning the number of structures placed.
    ///
    /// # Errors
    ///
    /// Fails when the island pool runs dry or the attempt ceiling is reached
    /// with structures still unplaced.
    pub fn plan(
        &mut self,
        world: &mut World,
        pool: &mut IslandPool,
        rng: &mut SkirmishRng,
        input: &PlannerInput,
        out_events: &mut Vec<Event>,
    ) -> Result<usize, GenerationError> {
        let house = input.house;
        self.pending = build_list(&BUILD_ORDER, input);
        let limits = DistanceLimits::for_team_count(input.team_count);
        let mut next = 0;

        for attempt in 0..MAX_ATTEMPTS {
            let island_id = pool
                .pick_unclaimed(rng)
                .ok_or(GenerationError::IslandPoolExhausted { house })?;
            let island = pool.island(island_id);
            let pick = rng.range_index(island.start(), island.end() - 1);
            let anchor = pool.tiles(island_id)[pick - island.start()].tile();

            let distances = query::nearest_structures(world, house, anchor);
            let too_far = distances
                .ally
                .is_some_and(|distance| distance > limits.max_ally);
            let too_close = distances
                .enemy
                .is_some_and(|distance| distance < limits.min_enemy);
            if too_far || too_close {
                tracing::debug!(
                    target: "dune_skirmish::build_planner",
                    house = ?house,
                    attempt,
                    ally = ?distances.ally,
                    enemy = ?distances.enemy,
                    "build_planner.anchor_rejected"
                );
                continue;
            }

            let size = pool.refill_from(world, rng, island_id, anchor);
            let mut radius = INITIAL_RADIUS;
            while let Some(entry) = self.pending.get(next).copied() {
                let pick = rng.range_index(0, radius - 1);
                let origin = pool.tiles(island_id)[pick].tile();
                if query::structure_placement(world, house, entry.kind, origin).is_ok() {
                    world::apply(
                        world,
                        Command::PlaceStructure {
                            house,
                            kind: entry.kind,
                            origin,
                        },
                        out_events,
                    );
                    radius = (radius + RADIUS_STEP).min(size);
                    next += 1;
                    continue;
                }
                radius += 1;
                if radius > size {
                    tracing::debug!(
                        target: "dune_skirmish::build_planner",
                        house = ?house,
                        attempt,
                        island = island_id.get(),
                        remaining = self.pending.len() - next,
                        "build_planner.island_abandoned"
                    );
                    break;
                }
            }

            lay_slabs(world, pool, island_id, radius.min(size), house, out_events);
            pool.divide(world, rng, island_id, Some(house), out_events);

            if next == self.pending.len() {
                tracing::info!(
                    target: "dune_skirmish::build_planner",
                    house = ?house,
                    attempts = attempt + 1,
                    structures = next,
                    "build_planner.base_complete"
                );
                return Ok(next);
            }
        }

        Err(GenerationError::BasePlacementExhausted {
            house,
            remaining: self.pending.len() - next,
            attempts: MAX_ATTEMPTS,
        })
    }
}

/// Lays slabs from every structure or slab within `reach` back along the discovery tree.
fn lay_slabs(
    world: &mut World,
    pool: &IslandPool,
    island: IslandId,
    reach: usize,
    house: HouseId,
    out_events: &mut Vec<Event>,
) {
    let tiles = pool.tiles(island);
    for index in (1..reach).rev() {
        let record = tiles[index];
        if !matches!(
            query::landscape(world, record.tile()),
            TerrainClass::Structure | TerrainClass::ConcreteSlab
        ) {
            continue;
        }
        let parent = tiles[record.parent()].tile();
        if query::slab_placement(world, house, parent).is_err() {
            continue;
        }
        world::apply(world, Command::LaySlab { house, tile: parent }, out_events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tier: u8, cpu_count: usize) -> PlannerInput {
        PlannerInput {
            house: HouseId::Harkonnen,
            tier: CampaignTier::new(tier),
            team_count: 2,
            cpu_count,
            match_kind: MatchKind::Skirmish,
            allied_with_human: false,
        }
    }

    #[test]
    fn lowest_tier_builds_the_core_base() {
        let kinds: Vec<StructureKind> = build_list(&BUILD_ORDER, &input(0, 1))
            .iter()
            .map(|entry| entry.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                StructureKind::ConstructionYard,
                StructureKind::Windtrap,
                StructureKind::Refinery,
            ]
        );
    }

    #[test]
    fn tier_one_adds_the_second_block_in_priority_order() {
        let priorities: Vec<u8> = build_list(&BUILD_ORDER, &input(1, 1))
            .iter()
            .map(|entry| entry.priority)
            .collect();
        assert_eq!(priorities, vec![1, 2, 3, 4, 13, 16]);
    }

    #[test]
    fn allies_of_the_human_skip_restricted_entries() {
        let allied = PlannerInput {
            allied_with_human: true,
            ..input(8, 1)
        };
        let list = build_list(&BUILD_ORDER, &allied);
        assert!(list.iter().all(|entry| entry.available_to_ally));
        assert_eq!(list.len(), 14);
    }

    #[test]
    fn crowded_skirmishes_cut_expensive_entries() {
        let list = build_list(&BUILD_ORDER, &input(8, 5));
        assert_eq!(list.len(), 12, "twelve entries fit under the cutoff");
        assert!(list.iter().all(|entry| entry.priority < 13));

        let multiplayer = PlannerInput {
            match_kind: MatchKind::Multiplayer,
            ..input(8, 1)
        };
        assert_eq!(build_list(&BUILD_ORDER, &multiplayer).len(), 10);
    }

    #[test]
    fn distance_limits_relax_with_many_teams() {
        assert_eq!(
            DistanceLimits::for_team_count(2),
            DistanceLimits {
                max_ally: 16,
                min_enemy: 24
            }
        );
        assert_eq!(DistanceLimits::for_team_count(5).min_enemy, 20);
        assert_eq!(DistanceLimits::for_team_count(6).max_ally, 25);
    }
}

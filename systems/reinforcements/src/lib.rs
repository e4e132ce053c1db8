#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scripted reinforcement waves and CHOAM starport stock of a skirmish.

mod starport;

use dune_skirmish_core::{Brain, CampaignTier, HouseId, SkirmishConfig, SkirmishRng, UnitKind};

pub use starport::StarportStock;

/// Reinforcement slots available to a scenario.
pub const MAX_REINFORCEMENTS: usize = 16;

/// Delay before the trooper waves of the Sardaukar arrive.
pub const SARDAUKAR_DELAY: u16 = 60;

/// Delay before the first reinforcement of a human house.
pub const HUMAN_FIRST_DELAY: u16 = 36;

/// Delay before the second reinforcement of a human house.
pub const HUMAN_SECOND_DELAY: u16 = 72;

/// Delay before the reinforcements of a computer house.
pub const CPU_DELAY: u16 = 90;

const PRIMARY_WAVE: [UnitKind; 9] = [
    UnitKind::Troopers,
    UnitKind::Quad,
    UnitKind::Quad,
    UnitKind::Tank,
    UnitKind::Launcher,
    UnitKind::SiegeTank,
    UnitKind::Devastator,
    UnitKind::Devastator,
    UnitKind::Devastator,
];

const SECONDARY_WAVE: [UnitKind; 9] = [
    UnitKind::Troopers,
    UnitKind::Troopers,
    UnitKind::Quad,
    UnitKind::Tank,
    UnitKind::Tank,
    UnitKind::SiegeTank,
    UnitKind::SiegeTank,
    UnitKind::SiegeTank,
    UnitKind::SiegeTank,
];

/// Where a reinforcement enters the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReinforcementSite {
    /// Northern map edge.
    North,
    /// Eastern map edge.
    East,
    /// Southern map edge.
    South,
    /// Western map edge.
    West,
    /// Dropped by air.
    Air,
    /// Anywhere currently visible.
    Visible,
    /// Inside the enemy base.
    EnemyBase,
    /// Inside the home base.
    HomeBase,
}

impl ReinforcementSite {
    /// Site encoded by the low three bits of `code`.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code & 0x7 {
            0 => Self::North,
            1 => Self::East,
            2 => Self::South,
            3 => Self::West,
            4 => Self::Air,
            5 => Self::Visible,
            6 => Self::EnemyBase,
            _ => Self::HomeBase,
        }
    }

    /// Site used by computer houses: air drops and visible spawns move to the bases.
    #[must_use]
    pub const fn for_cpu(code: u8) -> Self {
        match Self::from_code(code) {
            Self::Air => Self::EnemyBase,
            Self::Visible => Self::HomeBase,
            site => site,
        }
    }
}

/// A single scheduled reinforcement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Reinforcement {
    /// House receiving the unit.
    pub house: HouseId,
    /// Unit delivered.
    pub kind: UnitKind,
    /// Where the unit arrives.
    pub site: ReinforcementSite,
    /// Delay before the delivery, in scenario timer units.
    pub delay: u16,
    /// Whether the delivery repeats after arriving.
    pub repeat: bool,
}

/// Replaces generic wave units with the variant fielded by `house`.
#[must_use]
pub const fn house_variant(kind: UnitKind, house: HouseId) -> UnitKind {
    match kind {
        UnitKind::Troopers => house.infantry_squad(),
        UnitKind::Quad => house.light_vehicle(),
        UnitKind::Devastator => house.ix_vehicle(),
        UnitKind::Launcher if matches!(house, HouseId::Ordos) => UnitKind::Deviator,
        other => other,
    }
}

/// Draws the reinforcement waves of every seated house.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReinforcementScheduler;

impl ReinforcementScheduler {
    /// Creates a new scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Schedules the waves of each seated house in house order.
    ///
    /// A house is only considered while fewer than [`MAX_REINFORCEMENTS`]
    /// entries exist; entries beyond the last slot are dropped.
    #[must_use]
    pub fn schedule(&self, config: &SkirmishConfig, rng: &mut SkirmishRng) -> Vec<Reinforcement> {
        let tier = config.campaign_tier;
        let mut entries = Vec::with_capacity(MAX_REINFORCEMENTS);

        for house in HouseId::PLAYABLE {
            if entries.len() >= MAX_REINFORCEMENTS {
                break;
            }
            let brain = config.player(house).brain;
            if brain == Brain::None {
                continue;
            }

            let primary = house_variant(draw(&PRIMARY_WAVE, rng, tier), house);
            let secondary = house_variant(draw(&SECONDARY_WAVE, rng, tier), house);
            let repeat = brain != Brain::Human;
            let mut push = |kind, site, delay| {
                if entries.len() < MAX_REINFORCEMENTS {
                    entries.push(Reinforcement {
                        house,
                        kind,
                        site,
                        delay,
                        repeat,
                    });
                }
            };

            if house == HouseId::Sardaukar {
                for _ in 0..4 {
                    push(
                        UnitKind::Troopers,
                        ReinforcementSite::EnemyBase,
                        SARDAUKAR_DELAY,
                    );
                }
            } else if brain == Brain::Human {
                let home = ReinforcementSite::HomeBase;
                push(UnitKind::Tank, home, HUMAN_FIRST_DELAY);
                push(primary, home, HUMAN_FIRST_DELAY);
                push(UnitKind::Tank, home, HUMAN_SECOND_DELAY);
                push(secondary, home, HUMAN_SECOND_DELAY);
            } else {
                let site = ReinforcementSite::for_cpu(rng.byte());
                push(primary, site, CPU_DELAY);
                push(secondary, site, CPU_DELAY);
            }
        }

        tracing::debug!(
            target: "dune_skirmish::reinforcements",
            scheduled = entries.len(),
            tier = tier.get(),
            "reinforcements.scheduled"
        );
        entries
    }
}

fn draw(table: &[UnitKind; 9], rng: &mut SkirmishRng, tier: CampaignTier) -> UnitKind {
    let top = usize::from(tier.get()).min(table.len() - 1);
    table[rng.range_index(0, top)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_sites_avoid_air_and_visible_drops() {
        for code in 0..=u8::MAX {
            let site = ReinforcementSite::for_cpu(code);
            assert_ne!(site, ReinforcementSite::Air);
            assert_ne!(site, ReinforcementSite::Visible);
        }
        assert_eq!(ReinforcementSite::for_cpu(4), ReinforcementSite::EnemyBase);
        assert_eq!(ReinforcementSite::for_cpu(13), ReinforcementSite::HomeBase);
        assert_eq!(ReinforcementSite::for_cpu(3), ReinforcementSite::West);
    }

    #[test]
    fn wave_units_follow_house_traditions() {
        assert_eq!(
            house_variant(UnitKind::Launcher, HouseId::Ordos),
            UnitKind::Deviator
        );
        assert_eq!(
            house_variant(UnitKind::Launcher, HouseId::Harkonnen),
            UnitKind::Launcher
        );
        assert_eq!(
            house_variant(UnitKind::Devastator, HouseId::Atreides),
            UnitKind::SonicTank
        );
        assert_eq!(
            house_variant(UnitKind::Quad, HouseId::Ordos),
            UnitKind::RaiderTrike
        );
        assert_eq!(
            house_variant(UnitKind::Troopers, HouseId::Atreides),
            UnitKind::Infantry
        );
        assert_eq!(house_variant(UnitKind::Tank, HouseId::Fremen), UnitKind::Tank);
    }
}

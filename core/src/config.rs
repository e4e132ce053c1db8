//! Lobby configuration consumed by a generation run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Brain, HouseId, TeamId};

/// Seed of a generated map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSeed(u32);

impl MapSeed {
    /// Mask applied to randomly drawn seeds.
    pub const RANDOM_MASK: u32 = 0x7FFF;

    /// Creates a new map seed.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Creates a seed from a random draw, keeping only its low fifteen bits.
    #[must_use]
    pub const fn from_random(draw: u32) -> Self {
        Self(draw & Self::RANDOM_MASK)
    }

    /// Retrieves the numeric seed.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Seat of a single house in the lobby.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// House occupying the seat.
    pub house: HouseId,
    /// Controller of the house.
    pub brain: Brain,
    /// Team the house plays for.
    pub team: TeamId,
}

impl PlayerConfig {
    /// Seat of a house that does not take part, on its own team.
    #[must_use]
    pub const fn absent(house: HouseId) -> Self {
        Self {
            house,
            brain: Brain::None,
            team: TeamId::new(house.index() as u8 + 1),
        }
    }
}

/// Bounds on the number of spice fields scattered by the terrain synthesizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeParams {
    /// Fewest spice fields placed.
    pub min_spice_fields: u16,
    /// Most spice fields placed.
    pub max_spice_fields: u16,
}

impl Default for LandscapeParams {
    fn default() -> Self {
        Self {
            min_spice_fields: 24,
            max_spice_fields: 48,
        }
    }
}

/// Size of the kit handed to the human player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingArmy {
    /// Construction vehicle and a single infantry squad.
    Small,
    /// The complete starting kit.
    #[default]
    Large,
}

/// What a house must lose to be defeated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoseCondition {
    /// Defeat once every structure is destroyed.
    #[default]
    Structures,
    /// Defeat once every unit is destroyed.
    Units,
}

/// Flavour of match being generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// One human against computer opponents.
    #[default]
    Skirmish,
    /// Several humans sharing one map.
    Multiplayer,
}

/// Technology level gating the build order, reinforcements and starport stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CampaignTier(u8);

impl CampaignTier {
    /// Highest supported tier.
    pub const MAX: u8 = 8;

    /// Creates a campaign tier without validating it.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Retrieves the numeric tier.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl Default for CampaignTier {
    fn default() -> Self {
        Self(7)
    }
}

/// Seed selection policy of a generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Generation is stopped.
    Stop,
    /// Try the configured seed and stop on failure.
    TryFixedElseStop,
    /// Try the configured seed and fall back to random seeds on failure.
    #[default]
    TryFixedElseRandom,
    /// Try one random seed and stop on failure.
    TryRandomElseStop,
    /// Keep trying random seeds until one succeeds.
    TryRandomElseRandom,
    /// Try the configured seed one last time.
    Final,
}

impl GenerationMode {
    /// Mode to continue with after an attempt finished.
    #[must_use]
    pub const fn transition(self, success: bool) -> Self {
        if success {
            return Self::Stop;
        }
        match self {
            Self::TryFixedElseRandom | Self::TryRandomElseRandom => Self::TryRandomElseRandom,
            _ => Self::Stop,
        }
    }

    /// Reports whether the mode draws a fresh seed before its attempt.
    #[must_use]
    pub const fn uses_random_seed(self) -> bool {
        matches!(self, Self::TryRandomElseStop | Self::TryRandomElseRandom)
    }
}

/// Complete lobby configuration for one generated map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirmishConfig {
    /// Seed tried first.
    pub seed: MapSeed,
    /// Seed selection policy.
    pub mode: GenerationMode,
    /// Skirmish or multiplayer rules.
    pub match_kind: MatchKind,
    /// Seats that differ from the default absent seat.
    pub players: Vec<PlayerConfig>,
    /// Starting credits of human houses.
    pub credits: u16,
    /// Terrain synthesis parameters.
    pub landscape: LandscapeParams,
    /// Size of the human starting kit.
    pub starting_army: StartingArmy,
    /// Number of sandworms released.
    pub worm_count: u8,
    /// Defeat condition.
    pub lose_condition: LoseCondition,
    /// Technology level.
    pub campaign_tier: CampaignTier,
    /// Whether sandworms hunt instead of lying in wait.
    pub insatiable_worms: bool,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            seed: MapSeed::default(),
            mode: GenerationMode::default(),
            match_kind: MatchKind::default(),
            players: Vec::new(),
            credits: 1500,
            landscape: LandscapeParams::default(),
            starting_army: StartingArmy::default(),
            worm_count: 2,
            lose_condition: LoseCondition::default(),
            campaign_tier: CampaignTier::default(),
            insatiable_worms: false,
        }
    }
}

impl SkirmishConfig {
    /// Largest supported sandworm count.
    pub const MAX_WORMS: u8 = 3;

    /// Seat of the house, falling back to the absent seat.
    #[must_use]
    pub fn player(&self, house: HouseId) -> PlayerConfig {
        self.players
            .iter()
            .copied()
            .find(|seat| seat.house == house)
            .unwrap_or_else(|| PlayerConfig::absent(house))
    }

    /// Returns the configuration with the seat of `house` replaced.
    #[must_use]
    pub fn with_player(mut self, house: HouseId, brain: Brain, team: TeamId) -> Self {
        self.players.retain(|seat| seat.house != house);
        self.players.push(PlayerConfig { house, brain, team });
        self.players.sort_by_key(|seat| seat.house);
        self
    }

    /// Houses taking part in the match, in house order.
    #[must_use]
    pub fn active_houses(&self) -> Vec<HouseId> {
        HouseId::PLAYABLE
            .into_iter()
            .filter(|house| self.player(*house).brain != Brain::None)
            .collect()
    }

    /// The house driven by the local human, if any.
    #[must_use]
    pub fn human_house(&self) -> Option<HouseId> {
        HouseId::PLAYABLE
            .into_iter()
            .find(|house| self.player(*house).brain == Brain::Human)
    }

    /// Reports whether a human faces at least one computer opponent.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        let Some(human) = self.human_house() else {
            return false;
        };
        let human_team = self.player(human).team;
        HouseId::PLAYABLE.into_iter().any(|house| {
            let seat = self.player(house);
            seat.brain == Brain::Cpu && seat.team != human_team
        })
    }

    /// Number of distinct teams with at least one active house.
    #[must_use]
    pub fn team_count(&self) -> usize {
        let mut teams: Vec<TeamId> = self
            .active_houses()
            .into_iter()
            .map(|house| self.player(house).team)
            .collect();
        teams.sort();
        teams.dedup();
        teams.len()
    }

    /// Number of computer-controlled houses.
    #[must_use]
    pub fn cpu_count(&self) -> usize {
        HouseId::PLAYABLE
            .into_iter()
            .filter(|house| self.player(*house).brain == Brain::Cpu)
            .count()
    }

    /// Reports whether two active houses play on the same team.
    #[must_use]
    pub fn are_allied(&self, left: HouseId, right: HouseId) -> bool {
        left == right || self.player(left).team == self.player(right).team
    }

    /// Checks that the configuration describes a match the generator supports.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = self.landscape;
        if params.min_spice_fields > params.max_spice_fields {
            return Err(ConfigError::SpiceRangeReversed {
                min: params.min_spice_fields,
                max: params.max_spice_fields,
            });
        }
        if self.campaign_tier.get() > CampaignTier::MAX {
            return Err(ConfigError::TierOutOfRange {
                tier: self.campaign_tier.get(),
            });
        }
        if self.worm_count > Self::MAX_WORMS {
            return Err(ConfigError::WormCountOutOfRange {
                count: self.worm_count,
            });
        }

        for (position, seat) in self.players.iter().enumerate() {
            if seat.house == HouseId::Neutral {
                return Err(ConfigError::NeutralSeat);
            }
            if self.players[..position]
                .iter()
                .any(|earlier| earlier.house == seat.house)
            {
                return Err(ConfigError::DuplicateSeat { house: seat.house });
            }
            if seat.team.get() == 0 || seat.team.get() > TeamId::MAX {
                return Err(ConfigError::TeamOutOfRange {
                    house: seat.house,
                    team: seat.team.get(),
                });
            }
        }

        let humans = self
            .players
            .iter()
            .filter(|seat| seat.brain == Brain::Human)
            .count();
        if humans > 1 {
            return Err(ConfigError::MultipleHumans { count: humans });
        }
        Ok(())
    }
}

/// Reasons a configuration cannot be generated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The minimum spice field count exceeds the maximum.
    #[error("spice field range {min}..={max} is reversed")]
    SpiceRangeReversed {
        /// Configured minimum.
        min: u16,
        /// Configured maximum.
        max: u16,
    },
    /// The campaign tier lies beyond the build order.
    #[error("campaign tier {tier} exceeds the highest tier {}", CampaignTier::MAX)]
    TierOutOfRange {
        /// Configured tier.
        tier: u8,
    },
    /// More than one seat is driven by a human.
    #[error("{count} houses are driven by a human, at most one is supported")]
    MultipleHumans {
        /// Number of human seats.
        count: usize,
    },
    /// A seat names a team outside the lobby range.
    #[error("{house:?} is on team {team}, teams range from 1 to {}", TeamId::MAX)]
    TeamOutOfRange {
        /// House of the seat.
        house: HouseId,
        /// Configured team.
        team: u8,
    },
    /// Too many sandworms were requested.
    #[error("{count} sandworms requested, at most {} are supported", SkirmishConfig::MAX_WORMS)]
    WormCountOutOfRange {
        /// Configured count.
        count: u8,
    },
    /// Two seats name the same house.
    #[error("{house:?} occupies more than one seat")]
    DuplicateSeat {
        /// Repeated house.
        house: HouseId,
    },
    /// The neutral house cannot be seated.
    #[error("the neutral house cannot take a seat")]
    NeutralSeat,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atreides_against_harkonnen() -> SkirmishConfig {
        SkirmishConfig::default()
            .with_player(HouseId::Atreides, Brain::Human, TeamId::new(1))
            .with_player(HouseId::Harkonnen, Brain::Cpu, TeamId::new(2))
    }

    #[test]
    fn defaults_match_the_lobby() {
        let config = SkirmishConfig::default();
        assert_eq!(config.credits, 1500);
        assert_eq!(config.worm_count, 2);
        assert_eq!(config.campaign_tier.get(), 7);
        assert_eq!(config.landscape.min_spice_fields, 24);
        assert_eq!(config.landscape.max_spice_fields, 48);
        assert_eq!(config.player(HouseId::Ordos).team, TeamId::new(3));
        assert_eq!(config.player(HouseId::Ordos).brain, Brain::None);
        assert!(!config.is_playable(), "an empty lobby is only a preview");
    }

    #[test]
    fn playable_requires_an_opposing_cpu() {
        let config = atreides_against_harkonnen();
        assert!(config.is_playable());
        assert_eq!(config.team_count(), 2);
        assert_eq!(config.cpu_count(), 1);

        let allied_only = config.with_player(HouseId::Harkonnen, Brain::Cpu, TeamId::new(1));
        assert!(!allied_only.is_playable(), "an allied cpu is no opponent");
        assert!(allied_only.are_allied(HouseId::Atreides, HouseId::Harkonnen));
    }

    #[test]
    fn validate_rejects_two_humans() {
        let config = atreides_against_harkonnen().with_player(
            HouseId::Ordos,
            Brain::Human,
            TeamId::new(3),
        );
        assert_eq!(
            config.validate(),
            Err(ConfigError::MultipleHumans { count: 2 })
        );
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = atreides_against_harkonnen();
        config.campaign_tier = CampaignTier::new(9);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TierOutOfRange { tier: 9 })
        ));

        let mut config = atreides_against_harkonnen();
        config.landscape.min_spice_fields = 50;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpiceRangeReversed { .. })
        ));

        let config = atreides_against_harkonnen().with_player(
            HouseId::Fremen,
            Brain::Cpu,
            TeamId::new(7),
        );
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TeamOutOfRange { team: 7, .. })
        ));
    }

    #[test]
    fn generation_modes_fall_back_to_random_seeds() {
        use GenerationMode::*;
        assert_eq!(TryFixedElseRandom.transition(false), TryRandomElseRandom);
        assert_eq!(TryRandomElseRandom.transition(false), TryRandomElseRandom);
        assert_eq!(TryFixedElseStop.transition(false), Stop);
        assert_eq!(Final.transition(false), Stop);
        assert_eq!(TryRandomElseRandom.transition(true), Stop);
        assert!(TryRandomElseStop.uses_random_seed());
        assert!(!Final.uses_random_seed());
    }

    #[test]
    fn random_seeds_keep_fifteen_bits() {
        assert_eq!(MapSeed::from_random(0xFFFF_FFFF).get(), 0x7FFF);
    }
}

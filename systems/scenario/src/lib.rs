#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Assembles complete skirmish scenarios from a lobby configuration.
//!
//! A [`ScenarioAssembler`] runs one generation attempt for a single seed:
//! terrain, island partitioning, CPU bases, starting forces, desert life,
//! reinforcements and starport stock. A [`RetryPolicy`] decides which seeds
//! to attempt and when to give up.

mod minimap;
mod retry;

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use dune_skirmish_core::{
    Brain, Command, Event, GenerationError, HouseId, LoseCondition, MapSeed, MatchKind,
    PlayableArea, SkirmishConfig, SkirmishRng, TileIndex,
};
use dune_skirmish_system_build_planner::{BuildPlanner, PlannerInput};
use dune_skirmish_system_deployment::{
    ArmyDeployer, GarrisonDeployer, StartLocationFinder, MAX_ATTEMPTS as START_ATTEMPTS,
};
use dune_skirmish_system_desert::DesertScatter;
use dune_skirmish_system_regions::{IslandPool, MIN_ISLAND_TILES};
use dune_skirmish_system_reinforcements::{Reinforcement, ReinforcementScheduler, StarportStock};
use dune_skirmish_system_terrain::TerrainSynthesizer;
use dune_skirmish_world::{self as world, query, World};

pub use minimap::{MinimapCell, MinimapSnapshot};
pub use retry::{RetryPolicy, DEFAULT_MAX_REROLLS};

/// Victory flags of a skirmish: destroy every enemy structure.
pub const WIN_FLAGS: u16 = 3;

/// Defeat flags of a skirmish: lose every own structure.
pub const LOSE_FLAGS: u16 = 1;

/// Starting credits of computer houses.
pub const CPU_CREDITS: u16 = 1000;

/// Product of a successful generation attempt.
#[derive(Debug)]
pub struct Scenario {
    seed: MapSeed,
    world: World,
    lose_condition: LoseCondition,
    reinforcements: Vec<Reinforcement>,
    stock: StarportStock,
    minimap: MinimapSnapshot,
    landscape_only: bool,
}

impl Scenario {
    /// Seed the scenario was generated from.
    #[must_use]
    pub const fn seed(&self) -> MapSeed {
        self.seed
    }

    /// Populated world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Consumes the scenario, keeping only the world.
    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }

    /// Victory flags handed to the game.
    #[must_use]
    pub const fn win_flags(&self) -> u16 {
        WIN_FLAGS
    }

    /// Defeat flags handed to the game.
    #[must_use]
    pub const fn lose_flags(&self) -> u16 {
        LOSE_FLAGS
    }

    /// Defeat condition chosen in the lobby.
    #[must_use]
    pub const fn lose_condition(&self) -> LoseCondition {
        self.lose_condition
    }

    /// Scheduled reinforcements, at most sixteen.
    #[must_use]
    pub fn reinforcements(&self) -> &[Reinforcement] {
        &self.reinforcements
    }

    /// Starport stock at the start of the match.
    #[must_use]
    pub const fn stock(&self) -> &StarportStock {
        &self.stock
    }

    /// Minimap captured after generation.
    #[must_use]
    pub const fn minimap(&self) -> &MinimapSnapshot {
        &self.minimap
    }

    /// Reports whether only the landscape was generated.
    #[must_use]
    pub const fn landscape_only(&self) -> bool {
        self.landscape_only
    }

    /// Hash over terrain, placements, reinforcements and stock.
    ///
    /// Two scenarios generated from the same seed and configuration share a fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        self.landscape_only.hash(&mut hasher);
        for tile in TileIndex::all() {
            query::landscape(&self.world, tile).hash(&mut hasher);
        }
        for structure in query::structures(&self.world) {
            (structure.house, structure.kind, structure.origin).hash(&mut hasher);
        }
        for unit in query::units(&self.world) {
            (unit.house, unit.kind, unit.tile, unit.order).hash(&mut hasher);
        }
        self.reinforcements.hash(&mut hasher);
        self.stock.hash(&mut hasher);
        hasher.finish()
    }
}

/// Runs single generation attempts, reusing its buffers across attempts.
#[derive(Debug)]
pub struct ScenarioAssembler {
    world: World,
    synthesizer: TerrainSynthesizer,
    pool: IslandPool,
    planner: BuildPlanner,
    garrison: GarrisonDeployer,
    events: Vec<Event>,
}

impl Default for ScenarioAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioAssembler {
    /// Creates an assembler with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            world: World::new(),
            synthesizer: TerrainSynthesizer::new(),
            pool: IslandPool::new(),
            planner: BuildPlanner::new(),
            garrison: GarrisonDeployer::new(),
            events: Vec::new(),
        }
    }

    /// Generates one scenario for `seed`.
    ///
    /// Configurations without a human facing a computer opponent only get a
    /// landscape preview.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidConfig`] for a lobby that fails
    /// validation, otherwise the first structured failure of any generation step.
    pub fn assemble(
        &mut self,
        config: &SkirmishConfig,
        seed: MapSeed,
    ) -> Result<Scenario, GenerationError> {
        config.validate()?;
        self.events.clear();
        world::apply(&mut self.world, Command::ResetWorld, &mut self.events);

        let mut rng = SkirmishRng::new(seed.get());
        let terrain = self.synthesizer.synthesize(&mut rng, config.landscape);
        world::apply(&mut self.world, Command::LoadTerrain { terrain }, &mut self.events);

        if !config.is_playable() {
            tracing::info!(
                target: "dune_skirmish::scenario",
                seed = seed.get(),
                "scenario.landscape_only"
            );
            return Ok(self.finish(config, seed, Vec::new(), StarportStock::default(), true));
        }

        let root = self.pool.seed_playable_area(PlayableArea::SKIRMISH);
        self.pool
            .divide(&mut self.world, &mut rng, root, None, &mut self.events);
        if self.pool.unclaimed_count() == 0 {
            return Err(GenerationError::NoIslands {
                minimum: MIN_ISLAND_TILES,
            });
        }

        self.register_houses(config);
        self.place_bases(config, &mut rng)?;
        self.deploy_forces(config, &mut rng)?;

        let desert = DesertScatter::new();
        let _ = desert.scatter_blooms(&mut self.world, &mut rng, &mut self.events);
        let _ = desert.release_sandworms(
            &mut self.world,
            &mut rng,
            config.worm_count,
            config.insatiable_worms,
            &mut self.events,
        );

        let reinforcements = match config.match_kind {
            MatchKind::Skirmish => ReinforcementScheduler::new().schedule(config, &mut rng),
            MatchKind::Multiplayer => Vec::new(),
        };
        let stock = StarportStock::draw(&mut rng, config.campaign_tier);

        let scenario = self.finish(config, seed, reinforcements, stock, false);
        tracing::info!(
            target: "dune_skirmish::scenario",
            seed = seed.get(),
            structures = query::structure_count(scenario.world()),
            units = query::units(scenario.world()).count(),
            reinforcements = scenario.reinforcements().len(),
            "scenario.assembled"
        );
        Ok(scenario)
    }

    fn register_houses(&mut self, config: &SkirmishConfig) {
        for house in config.active_houses() {
            let seat = config.player(house);
            let credits = match seat.brain {
                Brain::Human => config.credits,
                _ => CPU_CREDITS,
            };
            world::apply(
                &mut self.world,
                Command::RegisterHouse {
                    house,
                    brain: seat.brain,
                    team: seat.team,
                    credits,
                },
                &mut self.events,
            );
        }
    }

    fn place_bases(
        &mut self,
        config: &SkirmishConfig,
        rng: &mut SkirmishRng,
    ) -> Result<(), GenerationError> {
        let human = config.human_house();
        for house in cpu_houses(config) {
            let input = PlannerInput {
                house,
                tier: config.campaign_tier,
                team_count: config.team_count(),
                cpu_count: config.cpu_count(),
                match_kind: config.match_kind,
                allied_with_human: human.is_some_and(|human| config.are_allied(house, human)),
            };
            let _ = self.planner.plan(
                &mut self.world,
                &mut self.pool,
                rng,
                &input,
                &mut self.events,
            )?;
        }
        Ok(())
    }

    fn deploy_forces(
        &mut self,
        config: &SkirmishConfig,
        rng: &mut SkirmishRng,
    ) -> Result<(), GenerationError> {
        let finder = StartLocationFinder::for_team_count(config.team_count());
        for house in config.active_houses() {
            match config.player(house).brain {
                Brain::Human => {
                    let start = finder
                        .find(&self.world, &self.pool, rng, house)
                        .ok_or(GenerationError::StartLocationNotFound {
                            house,
                            attempts: START_ATTEMPTS,
                        })?;
                    ArmyDeployer::new().deploy(
                        &mut self.world,
                        house,
                        start,
                        config.starting_army,
                        &mut self.events,
                    );
                }
                Brain::Cpu => {
                    let _ = self.garrison.deploy(
                        &mut self.world,
                        rng,
                        house,
                        config.campaign_tier,
                        &mut self.events,
                    );
                }
                Brain::None => {}
            }
        }
        Ok(())
    }

    fn finish(
        &mut self,
        config: &SkirmishConfig,
        seed: MapSeed,
        reinforcements: Vec<Reinforcement>,
        stock: StarportStock,
        landscape_only: bool,
    ) -> Scenario {
        let world = std::mem::take(&mut self.world);
        Scenario {
            seed,
            minimap: MinimapSnapshot::capture(&world),
            world,
            lose_condition: config.lose_condition,
            reinforcements,
            stock,
            landscape_only,
        }
    }
}

fn cpu_houses(config: &SkirmishConfig) -> impl Iterator<Item = HouseId> + '_ {
    config
        .active_houses()
        .into_iter()
        .filter(move |house| config.player(*house).brain == Brain::Cpu)
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that previews and exports generated skirmish maps.

mod preset_transfer;

use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result as AnyResult};
use clap::{Args, Parser, Subcommand};
use dune_skirmish_core::{
    Brain, CampaignTier, GenerationMode, HouseId, MapSeed, SkirmishConfig, TeamId,
};
use dune_skirmish_minimap::{MinimapBackend, Palette, PpmBackend, TextBackend};
use dune_skirmish_system_scenario::{RetryPolicy, Scenario, ScenarioAssembler};
use dune_skirmish_world::query;
use preset_transfer::SkirmishPreset;
use tracing_subscriber::EnvFilter;

/// Procedural skirmish map generator.
#[derive(Debug, Parser)]
#[command(name = "dune-skirmish", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a map from a lobby configuration.
    Generate(GenerateArgs),
    /// Regenerate the map described by a preset string.
    Preset(PresetArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// TOML lobby configuration; flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Seed tried first.
    #[arg(long)]
    seed: Option<u32>,
    /// Draw a random fifteen-bit seed instead of a fixed one.
    #[arg(long, conflicts_with = "seed")]
    random_seed: bool,
    /// Campaign tier gating structures and units.
    #[arg(long)]
    tier: Option<u8>,
    /// House driven by the human player.
    #[arg(long, value_parser = parse_house)]
    human: Option<HouseId>,
    /// Computer house, optionally followed by `:<team>`.
    #[arg(long = "cpu", value_parser = parse_cpu_seat)]
    cpus: Vec<(HouseId, Option<TeamId>)>,
    /// Number of sandworms.
    #[arg(long)]
    worms: Option<u8>,
    #[command(flatten)]
    output: OutputArgs,
    /// Print a preset string that regenerates the map.
    #[arg(long)]
    export: bool,
}

#[derive(Debug, Args)]
struct PresetArgs {
    /// Preset string produced by `generate --export`.
    preset: String,
    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Write the minimap as a binary PPM image.
    #[arg(long)]
    ppm: Option<PathBuf>,
    /// Pixels per tile edge in the PPM image.
    #[arg(long, default_value_t = 4)]
    scale: u16,
    /// Skip the text minimap.
    #[arg(long)]
    quiet: bool,
}

/// Entry point for the skirmish command-line interface.
fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate(args),
        Commands::Preset(args) => replay_preset(&args),
    }
}

fn generate(args: GenerateArgs) -> AnyResult<()> {
    let config = lobby_config(&args)?;
    let scenario = run(&config)?;
    present(&scenario, &args.output)?;

    if args.export {
        let mut exported = config;
        exported.seed = scenario.seed();
        let preset = SkirmishPreset {
            seed: scenario.seed(),
            config: exported,
        };
        println!("{}", preset.encode().context("failed to encode preset")?);
    }
    Ok(())
}

fn replay_preset(args: &PresetArgs) -> AnyResult<()> {
    let preset = SkirmishPreset::decode(&args.preset).context("failed to decode preset")?;
    let mut config = preset.config;
    config.mode = GenerationMode::TryFixedElseStop;
    let scenario = run(&config)?;
    present(&scenario, &args.output)
}

fn lobby_config(args: &GenerateArgs) -> AnyResult<SkirmishConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SkirmishConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = MapSeed::new(seed);
    }
    if args.random_seed {
        config.seed = MapSeed::from_random(rand::random::<u32>());
    }
    if let Some(tier) = args.tier {
        config.campaign_tier = CampaignTier::new(tier);
    }
    if let Some(worms) = args.worms {
        config.worm_count = worms;
    }
    if let Some(human) = args.human {
        let team = config.player(human).team;
        config = config.with_player(human, Brain::Human, team);
    }
    for (house, team) in &args.cpus {
        let team = team.unwrap_or_else(|| config.player(*house).team);
        config = config.with_player(*house, Brain::Cpu, team);
    }
    Ok(config)
}

fn load_config(path: &Path) -> AnyResult<SkirmishConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse configuration {}", path.display()))
}

fn run(config: &SkirmishConfig) -> AnyResult<Scenario> {
    let mut assembler = ScenarioAssembler::new();
    RetryPolicy::for_config(config)
        .run(&mut assembler, config)
        .with_context(|| format!("map generation failed for seed {}", config.seed.get()))
}

fn present(scenario: &Scenario, output: &OutputArgs) -> AnyResult<()> {
    print_summary(scenario);

    let palette = Palette;
    if !output.quiet {
        let stdout = io::stdout();
        TextBackend::new(stdout.lock()).present(scenario.minimap(), &palette)?;
    }
    if let Some(path) = &output.ppm {
        let file = File::create(path)
            .with_context(|| format!("failed to create pixmap {}", path.display()))?;
        PpmBackend::new(BufWriter::new(file), output.scale).present(scenario.minimap(), &palette)?;
    }
    Ok(())
}

fn print_summary(scenario: &Scenario) {
    let world = scenario.world();
    println!("seed {}", scenario.seed().get());
    if scenario.landscape_only() {
        println!("landscape preview, no opponents seated");
        return;
    }

    for record in query::houses(world) {
        let structures = query::structures(world)
            .filter(|structure| structure.house == record.house)
            .count();
        let units = query::units(world)
            .filter(|unit| unit.house == record.house)
            .count();
        println!(
            "{:?} ({:?}, team {}): {structures} structures, {units} units, {} credits",
            record.house,
            record.brain,
            record.team.get(),
            record.credits
        );
    }
    for entry in scenario.reinforcements() {
        println!(
            "reinforcement {:?} {:?} at {:?} after {}{}",
            entry.house,
            entry.kind,
            entry.site,
            entry.delay,
            if entry.repeat { ", repeating" } else { "" }
        );
    }
    let stock: Vec<String> = scenario
        .stock()
        .offers()
        .map(|(kind, count)| format!("{kind:?} x{count}"))
        .collect();
    println!("starport: {}", stock.join(", "));
    println!("fingerprint {:016x}", scenario.fingerprint());
}

fn parse_house(value: &str) -> Result<HouseId, String> {
    let house = match value.trim().to_ascii_lowercase().as_str() {
        "harkonnen" => HouseId::Harkonnen,
        "atreides" => HouseId::Atreides,
        "ordos" => HouseId::Ordos,
        "fremen" => HouseId::Fremen,
        "sardaukar" => HouseId::Sardaukar,
        "mercenary" => HouseId::Mercenary,
        other => return Err(format!("unknown house '{other}'")),
    };
    Ok(house)
}

fn parse_cpu_seat(value: &str) -> Result<(HouseId, Option<TeamId>), String> {
    match value.split_once(':') {
        Some((house, team)) => {
            let team = team
                .trim()
                .parse::<u8>()
                .map_err(|_| format!("invalid team '{team}'"))?;
            Ok((parse_house(house)?, Some(TeamId::new(team))))
        }
        None => Ok((parse_house(value)?, None)),
    }
}

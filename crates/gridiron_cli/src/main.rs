//! Gridiron CLI
//!
//! Seeded single games, batches, and configuration dumps.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use gridiron_core::engine::batch::{batch_seeds, simulate_batch, summarize};
use gridiron_core::engine::game::GameReport;
use gridiron_core::{EngineConfig, GameSimulator, Roster, RosterBuilder, TeamSide};

#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "Simulate American football games from rated rosters", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct EngineArgs {
    /// YAML or JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named preset (realistic, arcade, penalty_free)
    #[arg(long, conflicts_with = "config")]
    preset: Option<String>,

    /// Overall rating for every home player
    #[arg(long, default_value_t = 70)]
    home_overall: u8,

    /// Overall rating for every away player
    #[arg(long, default_value_t = 70)]
    away_overall: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one game
    Game {
        #[command(flatten)]
        engine: EngineArgs,

        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Print the full report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Simulate many games in parallel
    Batch {
        #[command(flatten)]
        engine: EngineArgs,

        /// Base seed; each game gets a derived seed
        #[arg(long, default_value_t = 1)]
        seed: u64,

        #[arg(long, default_value_t = 100)]
        games: usize,
    },

    /// Print a configuration preset
    Config {
        #[arg(long, default_value = "realistic")]
        preset: String,

        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },

    /// Print the configuration JSON schema
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Game { engine, seed, json } => {
            let config = load_config(&engine)?;
            let (home, away) = rosters(&engine);
            let report = GameSimulator::new(&config, &home, &away, seed).run()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_game(&report);
            }
        }

        Commands::Batch { engine, seed, games } => {
            let config = load_config(&engine)?;
            let (home, away) = rosters(&engine);
            println!("Simulating {} games from base seed {}...", games, seed);
            let reports = simulate_batch(&config, &home, &away, &batch_seeds(seed, games))?;
            let summary = summarize(&reports);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Config { preset, format } => {
            let Some(config) = EngineConfig::preset(&preset) else {
                bail!("unknown preset '{}'", preset);
            };
            match format {
                Format::Yaml => print!("{}", config.to_yaml()?),
                Format::Json => println!("{}", config.to_json_pretty()?),
            }
        }

        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&EngineConfig::json_schema())?);
        }
    }

    Ok(())
}

fn load_config(args: &EngineArgs) -> Result<EngineConfig> {
    let config = match (&args.config, &args.preset) {
        (Some(path), _) => EngineConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        (None, Some(name)) => match EngineConfig::preset(name) {
            Some(config) => config,
            None => bail!("unknown preset '{}'", name),
        },
        (None, None) => EngineConfig::from_env_or_default(),
    };
    config.validate()?;
    Ok(config)
}

fn rosters(args: &EngineArgs) -> (Roster, Roster) {
    (
        RosterBuilder::new(TeamSide::Home).overall(args.home_overall).build(),
        RosterBuilder::new(TeamSide::Away).overall(args.away_overall).build(),
    )
}

fn print_game(report: &GameReport) {
    println!("Seed {}  ({})", report.seed, &report.fingerprint[..12]);
    println!(
        "{} {} - {} {}{}",
        report.home_team,
        report.score.home,
        report.score.away,
        report.away_team,
        if report.overtime { " (OT)" } else { "" }
    );
    println!("Plays: {}  Drives: {}", report.plays, report.drives.len());
    for side in [TeamSide::Home, TeamSide::Away] {
        let totals = report.box_score.team_totals(side);
        println!(
            "  {:?}: {} pass yds, {} rush yds, {} TO, {} penalties",
            side,
            totals.passing_yards,
            totals.rushing_yards,
            totals.interceptions_thrown + totals.fumbles_lost,
            totals.penalties
        );
    }
    if report.truncated {
        println!("  warning: play cap reached, game truncated");
    }
    if !report.warnings.is_empty() {
        println!("  {} degenerate matchup warnings", report.warnings.len());
    }
}

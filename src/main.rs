//! TerraForge command line
//!
//! Generates worlds to disk and answers reconstruction and search queries
//! against a generated `world.json`.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use terraforge::core::types::PolityId;
use terraforge::indexes::DEFAULT_SEARCH_LIMIT;
use terraforge::{generate_world, Result, WorldBundle, WorldConfig, WorldIndexes};

#[derive(Parser, Debug)]
#[command(name = "terraforge")]
#[command(about = "Generate seeded worlds with a queryable geopolitical history")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a world and write it to a directory
    Generate {
        /// TOML config file; defaults are used for anything it omits
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(long)]
        out: PathBuf,
    },

    /// Print reconstructed state at a year
    Query {
        /// Path to a generated world.json
        #[arg(long)]
        world: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        year: i32,

        /// Restrict output to one polity (`polity-3` or `3`)
        #[arg(long)]
        polity: Option<String>,
    },

    /// Full-text search over events, polities, wars and changes
    Search {
        #[arg(long)]
        world: PathBuf,

        #[arg(long)]
        query: String,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("terraforge=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate { config, seed, out } => run_generate(config.as_deref(), seed, &out),
        Command::Query { world, year, polity } => run_query(&world, year, polity.as_deref()),
        Command::Search { world, query, limit } => run_search(&world, &query, limit),
    };

    if let Err(err) = result {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

fn run_generate(config_path: Option<&Path>, seed: Option<u64>, out: &Path) -> Result<()> {
    let mut config = match config_path {
        Some(path) => WorldConfig::load(path)?,
        None => WorldConfig::with_seed(0),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }

    let bundle = generate_world(&config)?;

    let index_dir = out.join("index");
    fs::create_dir_all(&index_dir)?;
    fs::write(out.join("world.json"), bundle.canonical_json()?)?;
    fs::write(
        index_dir.join("snapshots.json"),
        serde_json::to_string(&bundle.timeline_index.snapshots)?,
    )?;
    fs::write(
        index_dir.join("deltas.json"),
        serde_json::to_string(&bundle.timeline_index.deltas)?,
    )?;

    tracing::info!("{}", bundle.summary());
    tracing::info!(hash = %bundle.hash()?, out = %out.display(), "world written");
    Ok(())
}

fn run_query(world_path: &Path, year: i32, polity: Option<&str>) -> Result<()> {
    let bundle = WorldBundle::load(world_path)?;
    let indexes = WorldIndexes::build(&bundle);
    let state = indexes.state_at(year)?;

    match polity {
        Some(raw) => {
            let id: PolityId = raw.parse()?;
            // Validates the id against the roster
            indexes.polity(id)?;
            let polity = state.polities.iter().find(|p| p.id == id);
            print_json(&polity)
        }
        None => print_json(&state),
    }
}

fn run_search(world_path: &Path, query: &str, limit: usize) -> Result<()> {
    let bundle = WorldBundle::load(world_path)?;
    let indexes = WorldIndexes::build(&bundle);
    print_json(&indexes.search(query, limit))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

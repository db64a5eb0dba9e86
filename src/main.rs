//! Oracle Village - headless runner
//!
//! Founds a settlement, lets the oracle plan each day and prints the
//! settlement status (or one JSON result per day) to stdout.

use std::path::PathBuf;

use clap::Parser;
use oracle_village::core::config::ConfigFile;
use oracle_village::core::error::Result;
use oracle_village::llm::LlmAdvisor;
use oracle_village::Settlement;

/// Headless settlement runner
#[derive(Parser, Debug)]
#[command(name = "oracle-village")]
#[command(about = "Run an autonomous settlement planned by the oracle")]
struct Args {
    /// Map width in tiles
    #[arg(long, default_value_t = 20)]
    width: i32,

    /// Map height in tiles
    #[arg(long, default_value_t = 20)]
    height: i32,

    /// World seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Days to simulate
    #[arg(long, default_value_t = 10)]
    days: u32,

    /// TOML file with [simulation] and [generation] tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ask an LLM advisor first (needs LLM_API_KEY)
    #[arg(long)]
    advisory: bool,

    /// Advisory deadline in milliseconds (overrides the config file)
    #[arg(long)]
    advisory_timeout_ms: Option<u64>,

    /// Output format: text or json
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("oracle_village=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    if let Some(seed) = args.seed {
        file.generation.seed = seed;
    }
    if let Some(ms) = args.advisory_timeout_ms {
        file.simulation.advisory_timeout_ms = ms;
    }

    let mut settlement = Settlement::initialize(args.width, args.height, &file.generation, file.simulation)?;

    if args.advisory {
        match LlmAdvisor::from_env() {
            Ok(advisor) => settlement.set_advisory_function(Some(Box::new(advisor)))?,
            Err(e) => tracing::warn!("Advisory disabled: {}", e),
        }
    }

    let json = args.format == "json";
    if !json {
        println!("{}", settlement.summary());
    }

    for _ in 0..args.days {
        let result = settlement.tick();
        if json {
            println!("{}", serde_json::to_string(&result)?);
        } else {
            for skipped in &result.skipped {
                println!("  skipped {}: {}", skipped.villager, skipped.reason);
            }
            println!("{}", settlement.summary());
        }
    }

    tracing::info!("Finished after {} days", args.days);
    Ok(())
}

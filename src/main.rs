//! Popology - Entry Point
//!
//! Command-line front end for the tower upgrade resolver. Loads tower
//! definitions from a data directory, then lists, inspects, validates or
//! resolves them.

use clap::{Parser, Subcommand, ValueEnum};
use popology::core::config::{self, ResolverConfig};
use popology::core::error::Result;
use popology::tower::{Tower, TowerError, TowerRegistry, UpgradeLevels};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Resolve tower upgrade paths into final projectile stats
#[derive(Parser, Debug)]
#[command(name = "popology")]
#[command(about = "Resolve tower upgrade rules into final entity stats")]
struct Args {
    /// Directory containing tower definitions (.json / .toml)
    #[arg(long, default_value = "data/towers")]
    data_dir: PathBuf,

    /// Resolver config file (path count, tier limits)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded towers
    List,

    /// Show a tower's base entities and every upgrade path
    Show {
        tower: String,
    },

    /// Show what a single upgrade path or tier does, without resolving
    Upgrade {
        tower: String,

        /// Path index (0-based)
        #[arg(long)]
        path: usize,

        /// Tier index (0-based); omit to show the whole path
        #[arg(long)]
        tier: Option<usize>,
    },

    /// Resolve a tower at the given upgrade levels, e.g. 2-0-1
    Resolve {
        tower: String,

        levels: UpgradeLevels,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Resolve every level combination and report the ones that fail
    Validate {
        /// Only check this tower
        tower: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("popology=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let resolver_config = match &args.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    if config::set_config(resolver_config.clone()).is_err() {
        tracing::warn!("resolver config was already initialized");
    }

    let mut registry = TowerRegistry::with_config(resolver_config);
    registry.load_directory(&args.data_dir)?;

    match args.command {
        Command::List => {
            for tower in registry.iter() {
                println!(
                    "{:<20} {:<24} max {}",
                    tower.name(),
                    tower.display_name(),
                    UpgradeLevels::new(tower.max_levels())
                );
            }
        }
        Command::Show { tower } => {
            print_tower(registry.require(&tower)?);
        }
        Command::Upgrade { tower, path, tier } => {
            let tower = registry.require(&tower)?;
            match tier {
                Some(tier) => {
                    let rules = tower.tier(path, tier).map_err(TowerError::from)?;
                    println!("path {} tier {}: {}", path, tier, rules);
                }
                None => {
                    let upgrade_path = tower.path(path).map_err(TowerError::from)?;
                    for (tier, rules) in upgrade_path.tiers().iter().enumerate() {
                        println!("path {} tier {}: {}", path, tier, rules);
                    }
                }
            }
        }
        Command::Resolve {
            tower,
            levels,
            format,
        } => {
            let resolved = registry.require(&tower)?.get_constructed_tower(&levels)?;
            match format {
                OutputFormat::Text => print!("{}", resolved),
                OutputFormat::Json => println!("{}", resolved.to_json()?),
            }
        }
        Command::Validate { tower } => {
            let towers: Vec<&Tower> = match &tower {
                Some(name) => vec![registry.require(name)?],
                None => registry.iter().collect(),
            };

            let mut failures = 0;
            for tower in towers {
                let results = tower.resolve_all();
                let total = results.len();
                let mut failed = 0;
                for (levels, result) in results {
                    if let Err(e) = result {
                        failed += 1;
                        println!("{} [{}]: {}", tower.name(), levels, e);
                    }
                }
                tracing::info!(tower = %tower.name(), total, failed, "validated tower");
                failures += failed;
            }

            if failures > 0 {
                eprintln!("{} level combinations failed to resolve", failures);
                std::process::exit(1);
            }
            println!("all level combinations resolve");
        }
    }

    Ok(())
}

fn print_tower(tower: &Tower) {
    println!("=== {} ({}) ===", tower.display_name(), tower.name());
    println!("Base:");
    for base in tower.base_entities() {
        let attrs: Vec<String> = base
            .spec
            .iter()
            .map(|(attr, value)| format!("{}={}", attr, value))
            .collect();
        println!("  {}: {}", base.name, attrs.join(", "));
    }
    for (path, upgrade_path) in tower.paths().iter().enumerate() {
        println!("Path {}:", path);
        for (tier, rules) in upgrade_path.tiers().iter().enumerate() {
            println!("  {}: {}", tier + 1, rules);
        }
    }
}

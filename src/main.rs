//! Cadence CLI
//!
//! Development harness around the analytics library:
//! - Analyze a JSON snapshot and print the full report
//! - Print only the cycle forecast
//! - Generate a default config file

use anyhow::Context;
use cadence::config::{generate_default_config, Config};
use cadence::{AnalyticsEngine, Snapshot};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Symptom and cycle analytics for personal health logs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the usual locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every analyzer over a snapshot
    Analyze {
        /// Snapshot JSON file: {"cycles": [...], "observations": [...]}
        #[arg(short, long)]
        snapshot: PathBuf,
        /// Reference time in RFC 3339 (default: now)
        #[arg(short, long)]
        now: Option<String>,
    },

    /// Print only the cycle forecast
    Forecast {
        /// Snapshot JSON file
        #[arg(short, long)]
        snapshot: PathBuf,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_default(),
    };
    init_logging(&config);

    match cli.command {
        Commands::Analyze { snapshot, now } => {
            let now = parse_now(now.as_deref())?;
            let snapshot = read_snapshot(&snapshot)?;

            tracing::info!(
                cycles = snapshot.cycles().len(),
                observations = snapshot.observations().len(),
                now = %now,
                "Analyzing snapshot"
            );

            let report = AnalyticsEngine::new(config).analyze(&snapshot, now);
            print_json(&report, cli.pretty)?;
        }

        Commands::Forecast { snapshot } => {
            let snapshot = read_snapshot(&snapshot)?;
            let forecast = AnalyticsEngine::new(config).forecast(&snapshot);
            print_json(&forecast, cli.pretty)?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    eprintln!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only JSON
fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("cadence={}", config.logging.level).into());
    let json = config.logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn parse_now(now: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match now {
        None | Some("now") => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Invalid --now timestamp: {}", s)),
    }
}

fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid snapshot {}", path.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

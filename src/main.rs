//! hotspot-prerank — Binary Entrypoint
//! Thin CLI over the batch pipeline: `fetch` harvests and persists the
//! candidate set, `prerank` scores and selects the shortlist, `run` does both.

use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hotspot_prerank::config::PipelineConfig;
use hotspot_prerank::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "hotspot-prerank",
    version,
    about = "Candidate ingestion, dedup, and pre-rank selection pipeline"
)]
struct Cli {
    /// Pipeline config (TOML); falls back to $PRERANK_CONFIG_PATH, then
    /// config/pipeline.toml, then built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root directory for per-date run artifacts.
    #[arg(long, default_value = "runs")]
    out_dir: PathBuf,

    /// Target date (YYYY-MM-DD); defaults to today in the configured offset.
    #[arg(long)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Harvest enabled sources, merge + dedup + filter, persist candidates
    Fetch,
    /// Score the persisted candidate set and select the shortlist
    Prerank,
    /// Full pipeline: fetch then prerank
    Run,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hotspot_prerank=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let cfg = PipelineConfig::load(cli.config.as_deref())?;

    let now = Utc::now();
    let date = cli.date.unwrap_or_else(|| {
        (now + Duration::hours(i64::from(cfg.settings.utc_offset_hours))).date_naive()
    });

    match cli.command {
        Command::Fetch => {
            pipeline::run_fetch(&cfg, date, &cli.out_dir, now).await?;
        }
        Command::Prerank => {
            pipeline::run_prerank(&cfg, date, &cli.out_dir, now)?;
        }
        Command::Run => {
            pipeline::run_all(&cfg, date, &cli.out_dir, now).await?;
        }
    }

    Ok(())
}

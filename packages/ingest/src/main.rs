#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the ward ingestion process.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ward_map_ingest::{DEFAULT_INTERVAL, WatchOptions, publish, watch};
use ward_map_source::SourcePaths;

#[derive(Parser)]
#[command(
    name = "ward_map_ingest",
    about = "Keeps the live ward file in sync with the source CSV"
)]
struct Cli {
    /// Source CSV (defaults to `WARD_FALLBACK_PATH`, then `data/ward_priority.csv`)
    #[arg(long)]
    source: Option<PathBuf>,
    /// Live JSON-lines output (defaults to `WARD_LIVE_PATH`, then `data/live_wards.jsonl`)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Seconds between checks for source changes (default 2)
    #[arg(long)]
    interval_secs: Option<u64>,
    /// Publish once and exit instead of watching
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let paths = SourcePaths::from_env();
    let source = cli.source.unwrap_or(paths.fallback);
    let output = cli.output.unwrap_or(paths.live);

    if cli.once {
        let count = publish(&source, &output)?;
        log::info!("Published {count} records to {}", output.display());
        return Ok(());
    }

    watch(&WatchOptions {
        source,
        output,
        interval: cli
            .interval_secs
            .map_or(DEFAULT_INTERVAL, |secs| Duration::from_secs(secs.max(1))),
    })
    .await?;

    Ok(())
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the logistics fragility pipeline.
//!
//! Reads the four input feature collections named by the config file
//! (or the built-in defaults), scores every census tract, and writes
//! one scored `GeoJSON` feature collection. The whole run is a
//! single-threaded synchronous batch; an `indicatif` bar tracks the
//! per-tract loop.

mod progress;

use std::path::PathBuf;

use clap::Parser;
use fragility_map_pipeline::Config;

use crate::progress::IndicatifProgress;

/// Compute per-tract logistics fragility scores.
#[derive(Parser)]
#[command(name = "fragility-map")]
struct Args {
    /// Path to a TOML config file. Defaults apply when absent.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the output path from the config.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(output) = args.output {
        config.output = output;
    }
    config.validate()?;

    let bar = IndicatifProgress::tracts_bar("Scoring census tracts");
    let summary = fragility_map_pipeline::run(&config, bar.as_ref())?;

    println!("Scored {} tracts", summary.tracts_scored);
    println!("Market hubs: {}", summary.hubs_built);
    if summary.skips.any() {
        println!(
            "Skipped contributions (geometry faults): {} flood, {} route",
            summary.skips.flood, summary.skips.routes
        );
    }
    if let Some(d) = summary.distribution {
        println!("Fragility distribution:");
        println!("  Min: {:.4}", d.min);
        println!("  Max: {:.4}", d.max);
        println!("  Mean: {:.4}", d.mean);
        println!("  Median: {:.4}", d.median);
    }
    println!("Output written to {}", config.output.display());

    Ok(())
}

//! Geohash index build pipeline.
//!
//! Reads country polygons, classifies geohash cells against them and writes
//! the index consumed by the query server.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geocountry::config::Config;
use geocountry::geohash::DEFAULT_PRECISION;
use geocountry::store::builder::{build_geohash_index_with, BuildOptions};
use geocountry::store::loader::{load_metadata, load_polygons, write_json};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Build the geohash index from country polygons")]
struct Args {
    /// TOML config file; its [data] paths are used when flags are omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Polygon file (JSON, optionally .gz)
    #[arg(short, long)]
    polygons: Option<PathBuf>,

    /// Metadata file, used to report countries without metadata
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Output index file (gzip when it ends in .gz)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Geohash length of the finest cells
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    precision: usize,

    /// Store every cell at full precision instead of merging interior cells
    #[arg(long)]
    no_compact: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Geocountry Index Builder");

    let data = args
        .config
        .as_ref()
        .map(Config::load_from_file)
        .transpose()?
        .map(|c| c.data);

    let polygons_path = args
        .polygons
        .clone()
        .or_else(|| data.as_ref().map(|d| d.polygons.clone()))
        .context("No polygon file given (use --polygons or --config)")?;
    let output = args
        .output
        .clone()
        .or_else(|| data.as_ref().map(|d| d.index.clone()))
        .unwrap_or_else(|| PathBuf::from("data/geohash_index.json.gz"));
    let metadata_path = args
        .metadata
        .clone()
        .or_else(|| data.as_ref().map(|d| d.metadata.clone()));

    info!("Polygons: {}", polygons_path.display());
    let polygons = load_polygons(&polygons_path)
        .with_context(|| format!("Failed to load {}", polygons_path.display()))?;

    if let Some(path) = &metadata_path {
        let metadata = load_metadata(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        let mut missing: Vec<_> = polygons
            .keys()
            .filter(|id| !metadata.contains_key(*id))
            .copied()
            .collect();
        missing.sort_unstable();
        if !missing.is_empty() {
            warn!(
                "{} countries have polygons but no metadata: {:?}",
                missing.len(),
                missing
            );
        }
    }

    let options = BuildOptions {
        precision: args.precision,
        compact: !args.no_compact,
    };

    // One tick per top-level geohash cell
    let pb = ProgressBar::new(32);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})",
            )?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let index = build_geohash_index_with(&polygons, &options, |root| {
        pb.set_message(root.to_string());
        pb.inc(1);
    })?;
    pb.finish_with_message("Index complete");

    info!(
        "Built {} cells in {:.1}s",
        index.len(),
        start.elapsed().as_secs_f64()
    );

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    write_json(&output, &index)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!("Wrote index to {}", output.display());

    Ok(())
}

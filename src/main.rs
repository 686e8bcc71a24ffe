use anyhow::{Context, Result};
use autolabel_engine::config::EngineConfig;
use autolabel_engine::detection::ImageResult;
use autolabel_engine::engine::{ImageProposals, LabelEngine};
use autolabel_engine::stats::{self, RunStats};
use autolabel_engine::taxonomy::{OverrideRules, TaxonomyIndex};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "autolabel-engine")]
#[command(about = "Taxonomy-backed auto-labeling for AWS architecture diagrams")]
struct Args {
    /// Region-proposal JSON produced by the vision collaborators
    input: PathBuf,

    /// Taxonomy CSV (canonical names plus pipe-delimited aliases)
    #[arg(short, long)]
    taxonomy: PathBuf,

    /// Override rules JSON (group map, blacklist, extra aliases)
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Engine config JSON (scoring weights, thresholds)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output report path
    #[arg(short, long, default_value = "detections.json")]
    output: PathBuf,
}

#[derive(Serialize)]
struct Report {
    generated_at: DateTime<Utc>,
    stats: RunStats,
    images: Vec<ImageResult>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let rules = match &args.rules {
        Some(path) => Some(OverrideRules::load_or_default(path)?),
        None => None,
    };
    let taxonomy = TaxonomyIndex::from_csv_path(&args.taxonomy, rules)
        .with_context(|| format!("Failed to load taxonomy from {}", args.taxonomy.display()))?;
    info!("Taxonomy ready: {} services", taxonomy.len());

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let engine = LabelEngine::new(Arc::new(taxonomy), config)?;

    let input_text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read proposals from {}", args.input.display()))?;
    let proposals: Vec<ImageProposals> =
        serde_json::from_str(&input_text).context("Failed to parse proposal JSON")?;

    let images: Vec<ImageResult> = proposals.iter().map(|p| engine.label_image(p)).collect();
    let stats = stats::summarize(&images);
    info!(
        "Labeled {} images, {} detections ({} high confidence)",
        stats.total_images, stats.total_detections, stats.confidence.high
    );

    let report = Report {
        generated_at: Utc::now(),
        stats,
        images,
    };
    std::fs::write(&args.output, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;
    println!("Report written to {}", args.output.display());

    Ok(())
}

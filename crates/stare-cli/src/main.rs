mod analyze;
mod cli;
mod display;
mod embed;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use stare_ai::{Embedder, HashEmbedder};
use stare_core::AnalysisConfig;
use stare_store::Corpus;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ModelArgs, StatsArgs};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    info!("stare v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze(args) => analyze::run(args).await,
        Commands::Embed(args) => embed::run(args),
        Commands::Stats(args) => run_stats(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

pub(crate) fn load_corpus(path: &Path, config: &AnalysisConfig) -> anyhow::Result<Corpus> {
    Corpus::load(path, &config.lexical)
        .with_context(|| format!("loading corpus {}", path.display()))
}

/// The ONNX model when a model directory is given, otherwise the hashing embedder.
pub(crate) fn load_embedder(args: &ModelArgs) -> anyhow::Result<Arc<dyn Embedder>> {
    match &args.model_dir {
        Some(dir) => load_onnx(dir),
        None => {
            info!(dim = args.hash_dim, "using feature-hash embedder");
            Ok(Arc::new(HashEmbedder::new(args.hash_dim)))
        }
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(dir: &Path) -> anyhow::Result<Arc<dyn Embedder>> {
    let embedder = stare_ai::OnnxEmbedder::load(dir)
        .with_context(|| format!("loading ONNX model from {}", dir.display()))?;
    Ok(Arc::new(embedder))
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(dir: &Path) -> anyhow::Result<Arc<dyn Embedder>> {
    anyhow::bail!(
        "--model-dir {} requires stare built with the `onnx` feature",
        dir.display()
    )
}

fn run_stats(args: StatsArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let corpus = load_corpus(&args.corpus, &config)?;
    let stats = corpus.stats();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        display::print_stats(&args.corpus, &stats);
    }
    Ok(())
}

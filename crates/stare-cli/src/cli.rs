use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "stare",
    version,
    about = "Advisory precedent retrieval with explanations and ethical review"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve similar precedents for a case narrative.
    Analyze(AnalyzeArgs),
    /// Embed a JSON corpus and write it as Parquet.
    Embed(EmbedArgs),
    /// Summarise a corpus file.
    Stats(StatsArgs),
}

/// Embedding model selection shared by commands that embed text.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Directory holding model.onnx and tokenizer.json (requires the `onnx` feature).
    #[arg(long, env = "STARE_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Dimension of the feature-hashing embedder used when no model directory is given.
    #[arg(long, default_value_t = stare_ai::DEFAULT_HASH_DIM)]
    pub hash_dim: usize,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Corpus file (.parquet or .json).
    #[arg(long, env = "STARE_CORPUS")]
    pub corpus: PathBuf,

    /// Case narrative text.
    #[arg(long, conflicts_with_all = ["file", "batch"])]
    pub text: Option<String>,

    /// Read the case narrative from a file.
    #[arg(long, conflicts_with = "batch")]
    pub file: Option<PathBuf>,

    /// JSON Lines file of queries ({"case_text": ..., "top_k": ...}), analysed concurrently.
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Number of precedents to return.
    #[arg(long)]
    pub top_k: Option<i64>,

    /// Analysis configuration (JSON).
    #[arg(long, env = "STARE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Print the response as JSON instead of case cards.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EmbedArgs {
    /// JSON array of precedent records.
    #[arg(long)]
    pub input: PathBuf,

    /// Parquet file to write.
    #[arg(long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Re-embed records that already carry an embedding.
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Corpus file (.parquet or .json).
    #[arg(long, env = "STARE_CORPUS")]
    pub corpus: PathBuf,

    /// Analysis configuration (JSON); only the lexical settings are used.
    #[arg(long, env = "STARE_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

//! `stare analyze`: single queries and concurrent JSON Lines batches.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use stare_engine::{AnalysisError, AnalysisResponse, Analyzer, Query};
use tracing::{info, warn};

use crate::cli::AnalyzeArgs;
use crate::display;

pub async fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = crate::load_config(args.config.as_deref())?;
    let corpus = crate::load_corpus(&args.corpus, &config)?;
    let embedder = crate::load_embedder(&args.model)?;
    let analyzer = Arc::new(Analyzer::new(config, corpus, embedder)?);

    if let Some(batch) = &args.batch {
        return run_batch(analyzer, batch, args.top_k, args.json).await;
    }

    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading case narrative {}", path.display()))?,
        (None, None) => anyhow::bail!("one of --text, --file or --batch is required"),
    };
    let mut query = Query::new(text);
    if let Some(top_k) = args.top_k {
        query = query.with_top_k(top_k);
    }

    match analyzer.analyze(&query) {
        Ok(response) => {
            if args.json {
                println!("{}", response.to_json_pretty()?);
            } else {
                display::print_response(&response);
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&err.to_body())?);
            }
            Err(err.into())
        }
    }
}

fn read_batch(path: &Path, default_top_k: Option<i64>) -> anyhow::Result<Vec<Query>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading batch file {}", path.display()))?;
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let mut query: Query = serde_json::from_str(line)
                .with_context(|| format!("parsing {} line {}", path.display(), i + 1))?;
            if query.top_k.is_none() {
                query.top_k = default_top_k;
            }
            Ok(query)
        })
        .collect()
}

/// Analyse every query in the file on blocking worker threads sharing one analyzer.
///
/// Output keeps input order. A failed query is reported in place and does
/// not stop the others.
async fn run_batch(
    analyzer: Arc<Analyzer>,
    path: &Path,
    default_top_k: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let queries = read_batch(path, default_top_k)?;
    info!(queries = queries.len(), "running batch");

    let handles: Vec<_> = queries
        .into_iter()
        .map(|query| {
            let analyzer = Arc::clone(&analyzer);
            tokio::task::spawn_blocking(move || analyzer.analyze(&query))
        })
        .collect();

    let mut failed = 0usize;
    for (i, handle) in handles.into_iter().enumerate() {
        let result: Result<AnalysisResponse, AnalysisError> =
            handle.await.context("analysis task panicked")?;
        if let Err(err) = &result {
            warn!(query = i + 1, error = %err, "query failed");
            failed += 1;
        }
        match (&result, json) {
            (Ok(response), true) => println!("{}", serde_json::to_string(response)?),
            (Err(err), true) => println!("{}", serde_json::to_string(&err.to_body())?),
            (Ok(response), false) => {
                println!("##### Query {} #####", i + 1);
                display::print_response(response);
            }
            (Err(err), false) => {
                println!("##### Query {} #####", i + 1);
                println!("Error ({}): {}", err.kind(), err.reason());
                println!();
            }
        }
    }

    info!(failed, "batch complete");
    Ok(())
}

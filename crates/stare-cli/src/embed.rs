//! Embedding pipeline: reads JSON precedent records, embeds their text,
//! writes a Parquet corpus.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use stare_ai::Embedder;
use stare_core::{Precedent, PrecedentRecord};
use tracing::info;

use crate::cli::EmbedArgs;

const EMBED_BATCH_SIZE: usize = 64;

pub struct EmbedStats {
    pub total_rows: usize,
    pub embedded: usize,
    pub elapsed_secs: f64,
}

pub fn run(args: EmbedArgs) -> anyhow::Result<()> {
    let embedder = crate::load_embedder(&args.model)?;
    let stats = run_embed_pipeline(embedder.as_ref(), &args.input, &args.output, args.overwrite)?;
    eprintln!(
        "  Embedded {}/{} records with {} in {:.1}s -> {}",
        stats.embedded,
        stats.total_rows,
        embedder.name(),
        stats.elapsed_secs,
        args.output.display()
    );
    Ok(())
}

/// Run the full embedding pipeline: read JSON → embed text → write Parquet.
///
/// Records that already carry an embedding keep it unless `overwrite` is set,
/// in which case every record is re-embedded so the corpus shares one model.
pub fn run_embed_pipeline(
    embedder: &dyn Embedder,
    input: &Path,
    output: &Path,
    overwrite: bool,
) -> anyhow::Result<EmbedStats> {
    let start = Instant::now();

    let mut records = stare_store::json::read_records(input)
        .with_context(|| format!("reading precedent records {}", input.display()))?;
    let total_rows = records.len();
    info!(rows = total_rows, path = %input.display(), "read precedent records");

    let pending: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| overwrite || r.embedding.is_none())
        .map(|(i, _)| i)
        .collect();

    let mut processed = 0usize;
    for chunk in pending.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<&str> = chunk.iter().map(|&i| embed_text(&records[i])).collect();
        let vectors = embedder
            .embed_batch(&texts)
            .context("generating embeddings")?;
        anyhow::ensure!(
            vectors.len() == chunk.len(),
            "embedder returned {} vectors for {} texts",
            vectors.len(),
            chunk.len()
        );
        for (&i, vector) in chunk.iter().zip(vectors) {
            records[i].embedding = Some(vector);
        }

        processed += chunk.len();
        eprint!(
            "\r  Embedded {processed}/{} ({:.1}%)",
            pending.len(),
            processed as f64 / pending.len() as f64 * 100.0
        );
    }
    if !pending.is_empty() {
        eprintln!();
    }

    let precedents = records
        .into_iter()
        .map(Precedent::from_record)
        .collect::<Result<Vec<_>, _>>()
        .context("validating embedded records")?;

    let written = stare_store::parquet::write_precedents(output, &precedents)
        .with_context(|| format!("writing corpus {}", output.display()))?;
    info!(rows = written, path = %output.display(), "wrote corpus");

    Ok(EmbedStats {
        total_rows,
        embedded: pending.len(),
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// Text used for a record's embedding: the full text, or the title when the text is missing.
fn embed_text(record: &PrecedentRecord) -> &str {
    if record.text.trim().is_empty() {
        &record.title
    } else {
        &record.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stare_ai::HashEmbedder;
    use stare_core::config::LexicalConfig;
    use stare_store::Corpus;

    fn record(id: &str, text: &str, embedding: Option<Vec<f32>>) -> PrecedentRecord {
        PrecedentRecord {
            id: id.into(),
            title: format!("State v. {id}"),
            text: text.into(),
            ipc_sections: vec!["302".into()],
            embedding,
            ..Default::default()
        }
    }

    #[test]
    fn embeds_missing_vectors_and_writes_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cases.json");
        let output = dir.path().join("cases.parquet");
        stare_store::json::write_records(
            &input,
            &[
                record("B", "The accused stabbed the victim.", None),
                record("A", "", None),
                record("C", "Kept as is.", Some(vec![1.0; 16])),
            ],
        )
        .unwrap();

        let embedder = HashEmbedder::new(16);
        let stats = run_embed_pipeline(&embedder, &input, &output, false).unwrap();
        assert_eq!(stats.total_rows, 3);
        assert_eq!(stats.embedded, 2);

        let corpus = Corpus::load(&output, &LexicalConfig::default()).unwrap();
        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.dim(), Some(16));
        let b = corpus.by_id("B").unwrap();
        assert_eq!(b.embedding(), embedder.embed("The accused stabbed the victim.").unwrap());
        let a = corpus.by_id("A").unwrap();
        assert_eq!(a.embedding(), embedder.embed("State v. A").unwrap());
        assert_eq!(corpus.by_id("C").unwrap().embedding(), vec![1.0; 16]);
    }

    #[test]
    fn overwrite_reembeds_everything() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cases.json");
        let output = dir.path().join("cases.parquet");
        stare_store::json::write_records(&input, &[record("C", "Kept as is.", Some(vec![1.0; 4]))])
            .unwrap();

        let stats = run_embed_pipeline(&HashEmbedder::new(16), &input, &output, true).unwrap();
        assert_eq!(stats.embedded, 1);
        let corpus = Corpus::load(&output, &LexicalConfig::default()).unwrap();
        assert_eq!(corpus.dim(), Some(16));
    }
}

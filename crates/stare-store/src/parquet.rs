//! Parquet corpus files.
//!
//! An embedded corpus is a single Parquet file following
//! [`stare_core::precedents::precedent_schema`]. Reading tolerates extra
//! columns and either string encoding (Utf8 / LargeUtf8); only `id` and
//! `embedding` are required.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, FixedSizeListArray, FixedSizeListBuilder, Float32Array, Float32Builder, Int32Array,
    Int32Builder, LargeStringArray, ListArray, ListBuilder, StringArray, StringBuilder,
};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use stare_core::precedents as cols;
use stare_core::{Precedent, PrecedentRecord};
use tracing::info;

use crate::StoreError;

/// Read a Parquet file into Arrow RecordBatches.
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>, StoreError> {
    if !path.exists() {
        return Err(StoreError::FileNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let batches: Result<Vec<RecordBatch>, _> = reader.collect();
    Ok(batches?)
}

/// Read precedent records from a Parquet corpus file.
pub fn read_records(path: &Path) -> Result<Vec<PrecedentRecord>, StoreError> {
    let batches = read_parquet(path)?;
    let records = records_from_batches(&batches)?;
    info!(path = %path.display(), records = records.len(), "read parquet corpus");
    Ok(records)
}

/// Convert RecordBatches into precedent records.
pub fn records_from_batches(batches: &[RecordBatch]) -> Result<Vec<PrecedentRecord>, StoreError> {
    let mut records = Vec::new();

    for batch in batches {
        let id_col = batch
            .column_by_name(cols::ID)
            .ok_or(StoreError::MissingColumn(cols::ID))?;
        let emb_col = batch
            .column_by_name(cols::EMBEDDING)
            .ok_or(StoreError::MissingColumn(cols::EMBEDDING))?;
        let fsl = emb_col
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or_else(|| StoreError::Other("embedding column is not FixedSizeList".into()))?;

        let text_col = |name: &str| batch.column_by_name(name).cloned();
        let title = text_col(cols::TITLE);
        let court = text_col(cols::COURT);
        let text = text_col(cols::TEXT);
        let outcome = text_col(cols::OUTCOME);
        let source = text_col(cols::SOURCE);
        let year = batch.column_by_name(cols::YEAR);
        let ipc = batch.column_by_name(cols::IPC_SECTIONS);
        let crpc = batch.column_by_name(cols::CRPC_SECTIONS);
        let articles = batch.column_by_name(cols::CONSTITUTIONAL_ARTICLES);
        let acts = batch.column_by_name(cols::ACTS);

        let opt_string = |col: &Option<Arc<dyn Array>>, row: usize| {
            col.as_ref()
                .and_then(|c| get_string(c.as_ref(), row))
                .unwrap_or_default()
        };
        let opt_list = |col: Option<&Arc<dyn Array>>, row: usize| {
            col.map(|c| get_string_list(c.as_ref(), row))
                .unwrap_or_default()
        };

        for row in 0..batch.num_rows() {
            let id = get_string(id_col.as_ref(), row).unwrap_or_default();
            let embedding = get_embedding(fsl, row)?;

            records.push(PrecedentRecord {
                id,
                title: opt_string(&title, row),
                court: opt_string(&court, row),
                year: year.map(|c| get_i32(c.as_ref(), row)).unwrap_or(0),
                text: opt_string(&text, row),
                ipc_sections: opt_list(ipc, row),
                crpc_sections: opt_list(crpc, row),
                constitutional_articles: opt_list(articles, row),
                acts: opt_list(acts, row),
                outcome: opt_string(&outcome, row),
                source: opt_string(&source, row),
                embedding,
            });
        }
    }

    Ok(records)
}

/// Build one RecordBatch from validated precedents. All embeddings must share `dim`.
pub fn precedents_to_batch(
    precedents: &[Precedent],
    dim: usize,
) -> Result<RecordBatch, StoreError> {
    let mut id = StringBuilder::new();
    let mut title = StringBuilder::new();
    let mut court = StringBuilder::new();
    let mut year = Int32Builder::new();
    let mut text = StringBuilder::new();
    let mut ipc = ListBuilder::new(StringBuilder::new());
    let mut crpc = ListBuilder::new(StringBuilder::new());
    let mut articles = ListBuilder::new(StringBuilder::new());
    let mut acts = ListBuilder::new(StringBuilder::new());
    let mut outcome = StringBuilder::new();
    let mut source = StringBuilder::new();
    let mut embedding = FixedSizeListBuilder::new(Float32Builder::new(), dim as i32);

    for p in precedents {
        if p.dim() != dim {
            return Err(StoreError::DimensionMismatch {
                id: p.id().to_string(),
                expected: dim,
                found: p.dim(),
            });
        }
        id.append_value(p.id());
        title.append_value(p.title());
        court.append_value(p.court());
        year.append_value(p.year());
        text.append_value(p.text());
        for (builder, values) in [
            (&mut ipc, p.ipc_sections()),
            (&mut crpc, p.crpc_sections()),
            (&mut articles, p.constitutional_articles()),
            (&mut acts, p.acts()),
        ] {
            for v in values {
                builder.values().append_value(v);
            }
            builder.append(true);
        }
        outcome.append_value(p.outcome());
        source.append_value(p.source());
        embedding.values().append_slice(p.embedding());
        embedding.append(true);
    }

    let batch = RecordBatch::try_new(
        Arc::new(cols::precedent_schema(dim)),
        vec![
            Arc::new(id.finish()),
            Arc::new(title.finish()),
            Arc::new(court.finish()),
            Arc::new(year.finish()),
            Arc::new(text.finish()),
            Arc::new(ipc.finish()),
            Arc::new(crpc.finish()),
            Arc::new(articles.finish()),
            Arc::new(acts.finish()),
            Arc::new(outcome.finish()),
            Arc::new(source.finish()),
            Arc::new(embedding.finish()),
        ],
    )?;
    Ok(batch)
}

/// Write precedents to a Parquet corpus file, replacing any existing file.
pub fn write_precedents(path: &Path, precedents: &[Precedent]) -> Result<usize, StoreError> {
    let dim = precedents
        .first()
        .map(Precedent::dim)
        .ok_or_else(|| StoreError::Other("no precedents to write".into()))?;
    let batch = precedents_to_batch(precedents, dim)?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;

    info!(path = %path.display(), rows = batch.num_rows(), dim, "wrote parquet corpus");
    Ok(batch.num_rows())
}

// ── Column helpers ──

fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}

fn get_i32(col: &dyn Array, row: usize) -> i32 {
    if col.is_null(row) {
        return 0;
    }
    col.as_any()
        .downcast_ref::<Int32Array>()
        .map(|arr| arr.value(row))
        .unwrap_or(0)
}

fn get_string_list(col: &dyn Array, row: usize) -> Vec<String> {
    if col.is_null(row) {
        return Vec::new();
    }
    let Some(list) = col.as_any().downcast_ref::<ListArray>() else {
        return Vec::new();
    };
    let values = list.value(row);
    (0..values.len())
        .filter_map(|i| get_string(values.as_ref(), i))
        .collect()
}

fn get_embedding(fsl: &FixedSizeListArray, row: usize) -> Result<Option<Vec<f32>>, StoreError> {
    if fsl.is_null(row) {
        return Ok(None);
    }
    let values = fsl.value(row);
    let floats = values
        .as_any()
        .downcast_ref::<Float32Array>()
        .ok_or_else(|| StoreError::Other("embedding values are not Float32".into()))?;
    Ok(Some(floats.values().to_vec()))
}

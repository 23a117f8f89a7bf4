//! JSON corpus files: an array of precedent records.
//!
//! Used for unembedded source datasets (input to `stare embed`) and for
//! small embedded corpora where a Parquet file is overkill.

use std::io::BufReader;
use std::path::Path;

use stare_core::PrecedentRecord;
use tracing::info;

use crate::StoreError;

/// Read precedent records from a JSON array file.
pub fn read_records(path: &Path) -> Result<Vec<PrecedentRecord>, StoreError> {
    if !path.exists() {
        return Err(StoreError::FileNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    let records: Vec<PrecedentRecord> = serde_json::from_reader(BufReader::new(file))?;
    info!(path = %path.display(), records = records.len(), "read json corpus");
    Ok(records)
}

/// Write precedent records as a pretty-printed JSON array.
pub fn write_records(path: &Path, records: &[PrecedentRecord]) -> Result<(), StoreError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, records)?;
    Ok(())
}

//! Immutable corpus snapshots.
//!
//! A [`Corpus`] is built once from precedent records, validated, sorted by
//! id, and paired with the lexical index built over its texts. It is never
//! mutated afterwards; a reload builds a new corpus and swaps it into the
//! [`CorpusHandle`], while in-flight readers keep the snapshot they took.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use stare_core::config::LexicalConfig;
use stare_core::{Precedent, PrecedentRecord};
use tracing::info;

use crate::StoreError;
use crate::lexical::LexicalIndex;

/// Validated, id-ordered precedents plus their lexical index.
#[derive(Debug, Default)]
pub struct Corpus {
    precedents: Vec<Precedent>,
    positions: HashMap<String, usize>,
    dim: Option<usize>,
    lexical: LexicalIndex,
}

/// Summary counts for a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusStats {
    pub total_cases: usize,
    pub embedding_dim: Option<usize>,
    pub vocabulary_size: usize,
    pub courts: BTreeMap<String, usize>,
    pub outcomes: BTreeMap<String, usize>,
    pub sources: BTreeMap<String, usize>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

impl Corpus {
    /// An empty corpus. Retrieval over it returns no results.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate records and build a snapshot.
    ///
    /// Fails on the first record with an empty id, a missing or non-finite
    /// embedding, an embedding whose dimension differs from the first
    /// record's, or a duplicate id.
    pub fn from_records(
        records: Vec<PrecedentRecord>,
        config: &LexicalConfig,
    ) -> Result<Self, StoreError> {
        let precedents = records
            .into_iter()
            .map(Precedent::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_precedents(precedents, config)
    }

    pub fn from_precedents(
        mut precedents: Vec<Precedent>,
        config: &LexicalConfig,
    ) -> Result<Self, StoreError> {
        let dim = precedents.first().map(Precedent::dim);
        if let Some(expected) = dim {
            if let Some(bad) = precedents.iter().find(|p| p.dim() != expected) {
                return Err(StoreError::DimensionMismatch {
                    id: bad.id().to_string(),
                    expected,
                    found: bad.dim(),
                });
            }
        }

        precedents.sort_by(|a, b| a.id().cmp(b.id()));
        if let Some(pair) = precedents.windows(2).find(|w| w[0].id() == w[1].id()) {
            return Err(StoreError::DuplicateId(pair[0].id().to_string()));
        }

        let positions = precedents
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id().to_string(), i))
            .collect();
        let lexical = LexicalIndex::build(precedents.iter().map(Precedent::text), config);

        info!(
            cases = precedents.len(),
            dim = dim.unwrap_or(0),
            vocabulary = lexical.vocabulary_size(),
            "built corpus snapshot"
        );

        Ok(Self {
            precedents,
            positions,
            dim,
            lexical,
        })
    }

    /// Load a corpus file, choosing the reader by extension (`.parquet` or `.json`).
    pub fn load(path: &Path, config: &LexicalConfig) -> Result<Self, StoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let records = match ext.as_deref() {
            Some("parquet") => crate::parquet::read_records(path)?,
            Some("json") => crate::json::read_records(path)?,
            _ => return Err(StoreError::UnsupportedFormat(path.to_path_buf())),
        };
        Self::from_records(records, config)
    }

    /// All precedents in stable id order.
    pub fn all(&self) -> &[Precedent] {
        &self.precedents
    }

    pub fn by_id(&self, id: &str) -> Result<&Precedent, StoreError> {
        self.positions
            .get(id)
            .map(|&i| &self.precedents[i])
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.precedents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precedents.is_empty()
    }

    /// Embedding dimension, or `None` for an empty corpus.
    pub fn dim(&self) -> Option<usize> {
        self.dim
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn stats(&self) -> CorpusStats {
        let mut stats = CorpusStats {
            total_cases: self.precedents.len(),
            embedding_dim: self.dim,
            vocabulary_size: self.lexical.vocabulary_size(),
            ..Default::default()
        };
        for p in &self.precedents {
            let bump = |map: &mut BTreeMap<String, usize>, key: &str| {
                let key = if key.is_empty() { "unknown" } else { key };
                *map.entry(key.to_string()).or_insert(0) += 1;
            };
            bump(&mut stats.courts, p.court());
            bump(&mut stats.outcomes, p.outcome());
            bump(&mut stats.sources, p.source());
            if p.year() > 0 {
                stats.year_min = Some(stats.year_min.map_or(p.year(), |y| y.min(p.year())));
                stats.year_max = Some(stats.year_max.map_or(p.year(), |y| y.max(p.year())));
            }
        }
        stats
    }
}

/// Shared, swappable reference to the current corpus snapshot.
#[derive(Debug)]
pub struct CorpusHandle {
    current: RwLock<Arc<Corpus>>,
}

impl CorpusHandle {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            current: RwLock::new(Arc::new(corpus)),
        }
    }

    /// The current snapshot. Holds no lock after returning.
    pub fn snapshot(&self) -> Arc<Corpus> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Replace the snapshot, returning the previous one.
    pub fn swap(&self, corpus: Corpus) -> Arc<Corpus> {
        let next = Arc::new(corpus);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let previous = std::mem::replace(&mut *guard, next);
        info!(
            previous_cases = previous.len(),
            cases = guard.len(),
            "swapped corpus snapshot"
        );
        previous
    }
}

//! TF-IDF lexical index over a corpus snapshot.
//!
//! Built once per snapshot from the cleaned, truncated precedent texts and
//! never mutated afterwards. Vectors are sparse, L2-normalised, and indexed
//! by a sorted vocabulary, so scores are identical across runs.
//!
//! Weighting: sublinear tf (`1 + ln tf`) times smoothed idf
//! (`ln((1 + n) / (1 + df)) + 1`). The vocabulary keeps the
//! `max_features` terms with the highest corpus-wide frequency.

use std::collections::{BTreeMap, HashMap};

use stare_core::config::LexicalConfig;
use stare_core::text::{clean_text, terms, truncate_chars};
use tracing::debug;

/// Sparse L2-normalised term vector, entries sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_weights(weights: BTreeMap<usize, f64>) -> Self {
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Self::default();
        }
        Self {
            entries: weights.into_iter().map(|(i, w)| (i, w / norm)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// (term index, weight) pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Per-term products of two vectors over their shared terms.
    pub fn shared(&self, other: &SparseVector) -> Vec<(usize, f64)> {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push((a_idx, a_w * b_w));
                    i += 1;
                    j += 1;
                }
            }
        }
        out
    }

    /// Cosine similarity; both sides are already unit length.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let dot: f64 = self.shared(other).iter().map(|(_, w)| w).sum();
        dot.clamp(0.0, 1.0)
    }
}

/// Immutable TF-IDF index. Document positions follow corpus order.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    vocab: BTreeMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f64>,
    docs: Vec<SparseVector>,
}

impl LexicalIndex {
    /// Build the index from raw document texts.
    pub fn build<'a, I>(texts: I, config: &LexicalConfig) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cleaned: Vec<String> = texts
            .into_iter()
            .map(|t| truncate_chars(&clean_text(t), config.max_doc_chars).to_string())
            .collect();
        let counts: Vec<HashMap<&str, usize>> = cleaned
            .iter()
            .map(|doc| {
                let mut tf = HashMap::new();
                for term in terms(doc) {
                    *tf.entry(term).or_insert(0) += 1;
                }
                tf
            })
            .collect();

        // Corpus-wide frequency and document frequency per term.
        let mut totals: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for tf in &counts {
            for (term, n) in tf {
                let entry = totals.entry(*term).or_insert((0, 0));
                entry.0 += n;
                entry.1 += 1;
            }
        }

        let mut ranked: Vec<(&str, usize, usize)> =
            totals.into_iter().map(|(t, (total, df))| (t, total, df)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(config.max_features);
        ranked.sort_by(|a, b| a.0.cmp(b.0));

        let n = counts.len() as f64;
        let mut vocab = BTreeMap::new();
        let mut terms_out = Vec::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (idx, (term, _, df)) in ranked.into_iter().enumerate() {
            vocab.insert(term.to_string(), idx);
            terms_out.push(term.to_string());
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        let mut index = Self {
            vocab,
            terms: terms_out,
            idf,
            docs: Vec::new(),
        };
        index.docs = counts.iter().map(|tf| index.weigh(tf)).collect();

        debug!(
            docs = index.docs.len(),
            vocabulary = index.terms.len(),
            "built lexical index"
        );
        index
    }

    fn weigh(&self, tf: &HashMap<&str, usize>) -> SparseVector {
        let mut weights = BTreeMap::new();
        for (term, &count) in tf {
            if let Some(&idx) = self.vocab.get(*term) {
                let sublinear = 1.0 + (count as f64).ln();
                weights.insert(idx, sublinear * self.idf[idx]);
            }
        }
        SparseVector::from_weights(weights)
    }

    /// Project free text (e.g. a query) into the index's term space.
    ///
    /// The text is cleaned but not truncated; out-of-vocabulary terms are ignored.
    pub fn vectorize(&self, text: &str) -> SparseVector {
        let cleaned = clean_text(text);
        let mut tf = HashMap::new();
        for term in terms(&cleaned) {
            *tf.entry(term).or_insert(0) += 1;
        }
        self.weigh(&tf)
    }

    /// Vector of the document at `position` in corpus order.
    pub fn doc_vector(&self, position: usize) -> Option<&SparseVector> {
        self.docs.get(position)
    }

    /// Lexical similarity of a query vector to a document, in [0, 1].
    pub fn score(&self, query: &SparseVector, position: usize) -> f64 {
        self.docs
            .get(position)
            .map(|doc| query.cosine(doc))
            .unwrap_or(0.0)
    }

    pub fn term(&self, idx: usize) -> Option<&str> {
        self.terms.get(idx).map(String::as_str)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCS: [&str; 3] = [
        "The accused committed murder with a knife near the railway station.",
        "A property dispute over ancestral land between two brothers.",
        "Dowry harassment and cruelty by the husband and in-laws.",
    ];

    fn index() -> LexicalIndex {
        LexicalIndex::build(DOCS, &LexicalConfig::default())
    }

    #[test]
    fn vocabulary_excludes_stop_words() {
        let idx = index();
        assert!(idx.vocab.contains_key("murder"));
        assert!(!idx.vocab.contains_key("the"));
        assert!(!idx.vocab.contains_key("a"));
        assert_eq!(idx.doc_count(), 3);
    }

    #[test]
    fn matching_document_scores_highest() {
        let idx = index();
        let q = idx.vectorize("Murder of a man with a knife at the station");
        let scores: Vec<f64> = (0..3).map(|i| idx.score(&q, i)).collect();
        assert!(scores[0] > scores[1]);
        assert!(scores[0] > scores[2]);
        assert!(scores.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn identical_text_scores_one() {
        let idx = index();
        let q = idx.vectorize(DOCS[1]);
        assert!((idx.score(&q, 1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unrelated_query_scores_zero() {
        let idx = index();
        let q = idx.vectorize("quantum chromodynamics lattice");
        assert!(q.is_empty());
        assert_eq!(idx.score(&q, 0), 0.0);
        assert_eq!(idx.score(&q, 99), 0.0);
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let docs = ["murder murder murder knife", "murder theft", "theft knife bail"];
        let config = LexicalConfig {
            max_features: 2,
            ..LexicalConfig::default()
        };
        let idx = LexicalIndex::build(docs, &config);
        // murder=4, knife=2, theft=2 (tie broken by term), bail=1
        assert_eq!(idx.terms, vec!["knife".to_string(), "murder".to_string()]);
    }

    #[test]
    fn documents_truncated_before_indexing() {
        let long = format!("{} zebra", "murder ".repeat(10));
        let config = LexicalConfig {
            max_doc_chars: 20,
            ..LexicalConfig::default()
        };
        let idx = LexicalIndex::build([long.as_str()], &config);
        assert!(idx.vocab.contains_key("murder"));
        assert!(!idx.vocab.contains_key("zebra"));
    }

    #[test]
    fn build_is_deterministic() {
        let a = index();
        let b = index();
        assert_eq!(a.terms, b.terms);
        for i in 0..3 {
            assert_eq!(a.doc_vector(i), b.doc_vector(i));
        }
    }

    #[test]
    fn shared_terms_multiply_weights() {
        let idx = index();
        let q = idx.vectorize("murder knife");
        let doc = idx.doc_vector(0).unwrap();
        let shared = q.shared(doc);
        assert_eq!(shared.len(), 2);
        let names: Vec<&str> = shared.iter().map(|(i, _)| idx.term(*i).unwrap()).collect();
        assert_eq!(names, vec!["knife", "murder"]);
        assert!(shared.iter().all(|(_, w)| *w > 0.0));
    }

    #[test]
    fn empty_corpus_builds() {
        let idx = LexicalIndex::build(std::iter::empty(), &LexicalConfig::default());
        assert_eq!(idx.vocabulary_size(), 0);
        assert!(idx.vectorize("murder").is_empty());
    }
}

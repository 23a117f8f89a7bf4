//! Hybrid retrieval: semantic, lexical, and entity-overlap scores fused
//! into one ranking.
//!
//! Ordering is total and deterministic: hybrid descending, then semantic
//! descending, then corpus position (which is id order).

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use stare_core::config::LabelThresholds;
use stare_core::{EntitySet, Precedent};
use stare_store::{Corpus, SparseVector};
use tracing::debug;

use stare_ai::cosine_similarity;

pub const SEMANTIC_WEIGHT: f64 = 0.5;
pub const LEXICAL_WEIGHT: f64 = 0.3;
pub const ENTITY_WEIGHT: f64 = 0.2;

/// Per-precedent similarity components, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreVector {
    pub semantic: f64,
    pub lexical: f64,
    pub entity_overlap: f64,
}

impl ScoreVector {
    pub fn new(semantic: f64, lexical: f64, entity_overlap: f64) -> Self {
        Self {
            semantic: semantic.clamp(0.0, 1.0),
            lexical: lexical.clamp(0.0, 1.0),
            entity_overlap: entity_overlap.clamp(0.0, 1.0),
        }
    }

    /// Weighted fusion, derived on every read.
    pub fn hybrid(&self) -> f64 {
        SEMANTIC_WEIGHT * self.semantic
            + LEXICAL_WEIGHT * self.lexical
            + ENTITY_WEIGHT * self.entity_overlap
    }

    /// Name of the largest weighted contribution.
    pub fn dominant(&self) -> ScoreComponent {
        let parts = [
            (ScoreComponent::Semantic, SEMANTIC_WEIGHT * self.semantic),
            (ScoreComponent::Lexical, LEXICAL_WEIGHT * self.lexical),
            (ScoreComponent::EntityOverlap, ENTITY_WEIGHT * self.entity_overlap),
        ];
        let mut best = parts[0];
        for part in &parts[1..] {
            if part.1 > best.1 {
                best = *part;
            }
        }
        best.0
    }
}

impl Serialize for ScoreVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ScoreVector", 4)?;
        s.serialize_field("semantic", &self.semantic)?;
        s.serialize_field("lexical", &self.lexical)?;
        s.serialize_field("entity_overlap", &self.entity_overlap)?;
        s.serialize_field("hybrid", &self.hybrid())?;
        s.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreComponent {
    Semantic,
    Lexical,
    EntityOverlap,
}

impl ScoreComponent {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Semantic => "semantic similarity of the facts",
            Self::Lexical => "shared legal vocabulary",
            Self::EntityOverlap => "overlapping statutory provisions",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SimilarityLabel {
    LowSimilarity,
    ModeratelySimilar,
    HighlySimilar,
}

impl SimilarityLabel {
    pub fn from_score(hybrid: f64, thresholds: &LabelThresholds) -> Self {
        if hybrid >= thresholds.highly_similar {
            Self::HighlySimilar
        } else if hybrid >= thresholds.moderately_similar {
            Self::ModeratelySimilar
        } else {
            Self::LowSimilarity
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighlySimilar => "Highly Similar",
            Self::ModeratelySimilar => "Moderately Similar",
            Self::LowSimilarity => "Low Similarity",
        }
    }
}

impl std::fmt::Display for SimilarityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SimilarityLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A precedent that survived truncation, with its scores and 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult<'a> {
    pub precedent: &'a Precedent,
    /// Position in the corpus snapshot (id order).
    pub position: usize,
    pub scores: ScoreVector,
    pub label: SimilarityLabel,
    pub rank: usize,
}

/// Query-side inputs to retrieval.
#[derive(Debug, Clone)]
pub struct QueryFeatures {
    pub embedding: Vec<f32>,
    pub lexical: SparseVector,
    pub entities: EntitySet,
}

/// Sort `(position, scores)` candidates into retrieval order and keep `top_k`.
pub fn rank_candidates(
    mut candidates: Vec<(usize, ScoreVector)>,
    top_k: usize,
) -> Vec<(usize, ScoreVector)> {
    candidates.sort_by(|(pa, a), (pb, b)| {
        b.hybrid()
            .total_cmp(&a.hybrid())
            .then_with(|| b.semantic.total_cmp(&a.semantic))
            .then_with(|| pa.cmp(pb))
    });
    candidates.truncate(top_k);
    candidates
}

#[derive(Debug, Clone, Default)]
pub struct HybridRetriever {
    thresholds: LabelThresholds,
}

impl HybridRetriever {
    pub fn new(thresholds: LabelThresholds) -> Self {
        Self { thresholds }
    }

    /// Score every precedent in the snapshot and return the top `top_k`.
    ///
    /// Exhaustive over the corpus. An empty corpus yields no results.
    pub fn retrieve<'a>(
        &self,
        corpus: &'a Corpus,
        query: &QueryFeatures,
        top_k: usize,
    ) -> Vec<RankedResult<'a>> {
        let lexical = corpus.lexical();
        let candidates: Vec<(usize, ScoreVector)> = corpus
            .all()
            .iter()
            .enumerate()
            .map(|(position, p)| {
                let scores = ScoreVector::new(
                    cosine_similarity(&query.embedding, p.embedding()),
                    lexical.score(&query.lexical, position),
                    query.entities.jaccard(p.entities()),
                );
                debug!(
                    case_id = p.id(),
                    semantic = scores.semantic,
                    lexical = scores.lexical,
                    entity_overlap = scores.entity_overlap,
                    "scored candidate"
                );
                (position, scores)
            })
            .collect();

        let precedents = corpus.all();
        rank_candidates(candidates, top_k)
            .into_iter()
            .enumerate()
            .map(|(i, (position, scores))| RankedResult {
                precedent: &precedents[position],
                position,
                scores,
                label: SimilarityLabel::from_score(scores.hybrid(), &self.thresholds),
                rank: i + 1,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stare_core::PrecedentRecord;
    use stare_core::config::LexicalConfig;

    fn sv(semantic: f64, lexical: f64, entity: f64) -> ScoreVector {
        ScoreVector::new(semantic, lexical, entity)
    }

    #[test]
    fn hybrid_is_weighted_sum() {
        let s = sv(0.8, 0.5, 0.25);
        assert!((s.hybrid() - (0.4 + 0.15 + 0.05)).abs() < 1e-12);
    }

    #[test]
    fn serialized_scores_include_hybrid() {
        let json = serde_json::to_value(sv(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(json["semantic"], 1.0);
        assert_eq!(json["hybrid"], 0.5);
    }

    #[test]
    fn labels_follow_thresholds() {
        let t = LabelThresholds::default();
        assert_eq!(SimilarityLabel::from_score(0.75, &t), SimilarityLabel::HighlySimilar);
        assert_eq!(SimilarityLabel::from_score(0.74, &t), SimilarityLabel::ModeratelySimilar);
        assert_eq!(SimilarityLabel::from_score(0.5, &t), SimilarityLabel::ModeratelySimilar);
        assert_eq!(SimilarityLabel::from_score(0.49, &t), SimilarityLabel::LowSimilarity);
        assert_eq!(
            serde_json::to_value(SimilarityLabel::HighlySimilar).unwrap(),
            "Highly Similar"
        );
    }

    #[test]
    fn dominant_component() {
        assert_eq!(sv(0.9, 0.1, 0.0).dominant(), ScoreComponent::Semantic);
        assert_eq!(sv(0.1, 0.9, 0.0).dominant(), ScoreComponent::Lexical);
        assert_eq!(sv(0.0, 0.0, 1.0).dominant(), ScoreComponent::EntityOverlap);
    }

    #[test]
    fn ties_break_on_semantic_then_position() {
        // Same hybrid (0.3) three ways; semantic differs for one pair.
        let candidates = vec![
            (2, sv(0.6, 0.0, 0.0)),
            (0, sv(0.0, 1.0, 0.0)),
            (1, sv(0.6, 0.0, 0.0)),
        ];
        let ranked = rank_candidates(candidates, 10);
        let order: Vec<usize> = ranked.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn truncates_to_top_k() {
        let candidates = (0..10).map(|i| (i, sv(i as f64 / 10.0, 0.0, 0.0))).collect();
        let ranked = rank_candidates(candidates, 3);
        let order: Vec<usize> = ranked.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, vec![9, 8, 7]);
    }

    #[test]
    fn retrieve_ranks_and_labels() {
        let records = vec![
            PrecedentRecord {
                id: "A".into(),
                text: "murder with a knife".into(),
                ipc_sections: vec!["302".into()],
                embedding: Some(vec![1.0, 0.0, 0.0, 0.0]),
                ..Default::default()
            },
            PrecedentRecord {
                id: "B".into(),
                text: "land partition suit".into(),
                embedding: Some(vec![0.0, 1.0, 0.0, 0.0]),
                ..Default::default()
            },
        ];
        let corpus = Corpus::from_records(records, &LexicalConfig::default()).unwrap();
        let query = QueryFeatures {
            embedding: vec![1.0, 0.0, 0.0, 0.0],
            lexical: corpus.lexical().vectorize("murder with a knife"),
            entities: EntitySet::from_fields(&["302".to_string()], &[], &[], &[]),
        };

        let results = HybridRetriever::default().retrieve(&corpus, &query, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].precedent.id(), "A");
        assert_eq!(results[0].rank, 1);
        assert!((results[0].scores.hybrid() - 1.0).abs() < 1e-9);
        assert_eq!(results[0].label, SimilarityLabel::HighlySimilar);
        assert_eq!(results[1].scores.entity_overlap, 0.0);
        assert_eq!(results[1].label, SimilarityLabel::LowSimilarity);
        assert_eq!(results[1].rank, 2);
    }

    #[test]
    fn empty_corpus_returns_nothing() {
        let corpus = Corpus::empty();
        let query = QueryFeatures {
            embedding: vec![1.0; 4],
            lexical: SparseVector::default(),
            entities: EntitySet::new(),
        };
        assert!(HybridRetriever::default().retrieve(&corpus, &query, 5).is_empty());
    }
}

//! Per-precedent explanations.
//!
//! Explains a ranking from three sources of evidence: the statutory
//! provisions shared with the query, the terms carrying the most weight in
//! both texts within the corpus TF-IDF space, and the score breakdown.
//! Influential term weights are normalised so the strongest term is 1.0.

use serde::Serialize;
use stare_core::EntityCategory;
use stare_core::config::ExplainConfig;
use stare_store::LexicalIndex;
use tracing::warn;

use crate::retriever::{QueryFeatures, RankedResult, SimilarityLabel};

pub const EXPLANATION_DISCLAIMER: &str =
    "This explanation is advisory. Judicial discretion must be exercised independently.";

pub const DEFAULT_RATIONALE: &str =
    "This case was retrieved based on overall semantic similarity in legal context and facts.";

pub const TEXT_UNAVAILABLE_NOTE: &str =
    "Full text unavailable; this explanation is limited to statutory overlap and scores.";

/// Words frequent in every judgment that say nothing about the facts.
const LEGAL_NOISE_WORDS: &[&str] = &[
    "accused", "argued", "case", "court", "defence", "defense", "evidence", "examined", "held",
    "judgment", "observed", "order", "presented", "prosecution", "stated", "submitted",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityOverlap {
    pub common_ipc: Vec<String>,
    pub common_crpc: Vec<String>,
    pub common_articles: Vec<String>,
    pub common_acts: Vec<String>,
    pub query_only_ipc: Vec<String>,
    pub case_only_ipc: Vec<String>,
}

impl EntityOverlap {
    fn has_common(&self) -> bool {
        !(self.common_ipc.is_empty()
            && self.common_crpc.is_empty()
            && self.common_articles.is_empty()
            && self.common_acts.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfluentialTerm {
    pub term: String,
    /// Contribution relative to the strongest term, in [0, 1].
    pub weight: f64,
    pub query_relevance: f64,
    pub case_relevance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub case_id: String,
    pub similarity_label: SimilarityLabel,
    pub explanation_text: String,
    pub entity_overlap: EntityOverlap,
    pub influential_terms: Vec<InfluentialTerm>,
    pub text_available: bool,
    pub disclaimer: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct ExplainabilityEngine {
    config: ExplainConfig,
}

impl ExplainabilityEngine {
    pub fn new(config: ExplainConfig) -> Self {
        Self { config }
    }

    /// Explain one ranked result. Never fails; a precedent without text gets
    /// an entity-only explanation.
    pub fn explain(
        &self,
        query: &QueryFeatures,
        result: &RankedResult<'_>,
        lexical: &LexicalIndex,
    ) -> Explanation {
        let precedent = result.precedent;
        let case_entities = precedent.entities();
        let entity_overlap = EntityOverlap {
            common_ipc: query.entities.intersection(case_entities, EntityCategory::Ipc),
            common_crpc: query.entities.intersection(case_entities, EntityCategory::Crpc),
            common_articles: query.entities.intersection(case_entities, EntityCategory::Article),
            common_acts: query.entities.intersection(case_entities, EntityCategory::Act),
            query_only_ipc: query.entities.difference(case_entities, EntityCategory::Ipc),
            case_only_ipc: case_entities.difference(&query.entities, EntityCategory::Ipc),
        };

        let text_available = precedent.has_text();
        let influential_terms = if text_available {
            self.influential_terms(query, result.position, lexical)
        } else {
            warn!(
                case_id = precedent.id(),
                "precedent text unavailable, explaining from entity overlap only"
            );
            Vec::new()
        };

        let explanation_text =
            self.rationale(result, &entity_overlap, &influential_terms, text_available);

        Explanation {
            case_id: precedent.id().to_string(),
            similarity_label: result.label,
            explanation_text,
            entity_overlap,
            influential_terms,
            text_available,
            disclaimer: EXPLANATION_DISCLAIMER,
        }
    }

    fn influential_terms(
        &self,
        query: &QueryFeatures,
        position: usize,
        lexical: &LexicalIndex,
    ) -> Vec<InfluentialTerm> {
        let Some(doc) = lexical.doc_vector(position) else {
            return Vec::new();
        };
        let query_weights: Vec<(usize, f64)> = query.lexical.iter().collect();
        let doc_weights: Vec<(usize, f64)> = doc.iter().collect();
        let weight_of = |weights: &[(usize, f64)], idx: usize| {
            weights
                .binary_search_by_key(&idx, |(i, _)| *i)
                .map(|pos| weights[pos].1)
                .unwrap_or(0.0)
        };

        let mut shared: Vec<(&str, usize, f64)> = query
            .lexical
            .shared(doc)
            .into_iter()
            .filter_map(|(idx, product)| {
                let term = lexical.term(idx)?;
                let keep = !LEGAL_NOISE_WORDS.contains(&term) && product > 0.0;
                keep.then_some((term, idx, product))
            })
            .collect();
        shared.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(b.0)));
        shared.truncate(self.config.max_influential_terms);

        let top = shared.first().map(|s| s.2).unwrap_or(0.0);
        if top <= 0.0 {
            return Vec::new();
        }
        shared
            .into_iter()
            .map(|(term, idx, product)| InfluentialTerm {
                term: term.to_string(),
                weight: product / top,
                query_relevance: weight_of(&query_weights, idx),
                case_relevance: weight_of(&doc_weights, idx),
            })
            .collect()
    }

    fn rationale(
        &self,
        result: &RankedResult<'_>,
        overlap: &EntityOverlap,
        terms: &[InfluentialTerm],
        text_available: bool,
    ) -> String {
        let scores = &result.scores;
        let mut parts = vec![format!(
            "{}: retrieved mainly on {}.",
            result.label,
            scores.dominant().describe()
        )];

        if !overlap.common_ipc.is_empty() {
            parts.push(format!(
                "Both cases involve the same IPC provisions: {}. This indicates similar \
                 criminal law subject matter.",
                overlap.common_ipc.join(", ")
            ));
        }
        if !overlap.common_crpc.is_empty() {
            parts.push(format!(
                "Shared procedural references under CrPC: {}. This suggests similar \
                 procedural contexts.",
                overlap.common_crpc.join(", ")
            ));
        }
        if !overlap.common_articles.is_empty() {
            parts.push(format!(
                "Common constitutional provisions invoked: {}. Both cases address similar \
                 fundamental rights questions.",
                overlap.common_articles.join(", ")
            ));
        }
        if !overlap.common_acts.is_empty() {
            parts.push(format!("Both cases arise under {}.", overlap.common_acts.join(", ")));
        }
        if !terms.is_empty() {
            let top: Vec<&str> = terms
                .iter()
                .take(self.config.rationale_terms)
                .map(|t| t.term.as_str())
                .collect();
            parts.push(format!(
                "Key overlapping legal concepts: {}. These terms appear with high relevance \
                 in both the query and this precedent.",
                top.join(", ")
            ));
        }
        if !overlap.has_common() && terms.is_empty() && text_available {
            parts.push(DEFAULT_RATIONALE.to_string());
        }

        parts.push(format!(
            "Similarity breakdown: Semantic {:.2}%, Lexical {:.2}%, Entity overlap {:.2}%.",
            scores.semantic * 100.0,
            scores.lexical * 100.0,
            scores.entity_overlap * 100.0
        ));
        if !text_available {
            parts.push(TEXT_UNAVAILABLE_NOTE.to_string());
        }
        parts.join(" ")
    }
}

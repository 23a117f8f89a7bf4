//! The composed analysis response.

use serde::Serialize;
use stare_core::EntitySet;

use crate::ethics::EthicalReview;
use crate::explain::Explanation;
use crate::query::ValidatedQuery;
use crate::retriever::{RankedResult, ScoreVector, SimilarityLabel};

pub const RESPONSE_DISCLAIMER: &str = "This is an AI-assisted advisory system. All outputs are for \
     judicial reference only. This system does not predict outcomes, assign probabilities, or \
     automate any judicial decision. Judicial discretion remains paramount.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryInfo {
    pub original_length: usize,
    pub cleaned_length: usize,
    pub token_count: usize,
    pub top_k_requested: usize,
}

impl From<&ValidatedQuery> for QueryInfo {
    fn from(q: &ValidatedQuery) -> Self {
        Self {
            original_length: q.original_length,
            cleaned_length: q.cleaned.chars().count(),
            token_count: q.token_count,
            top_k_requested: q.top_k,
        }
    }
}

/// One retrieved precedent as it appears in the response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarCase {
    pub case_id: String,
    pub case_title: String,
    pub court: String,
    pub year: i32,
    pub judgment_outcome: String,
    pub case_text: String,
    pub ipc_sections: String,
    pub crpc_sections: String,
    pub constitutional_articles: String,
    pub similarity_label: SimilarityLabel,
    pub scores: ScoreVector,
}

impl From<&RankedResult<'_>> for SimilarCase {
    fn from(r: &RankedResult<'_>) -> Self {
        let p = r.precedent;
        Self {
            case_id: p.id().to_string(),
            case_title: p.title().to_string(),
            court: p.court().to_string(),
            year: p.year(),
            judgment_outcome: p.outcome().to_string(),
            case_text: p.text().to_string(),
            ipc_sections: p.ipc_sections().join(", "),
            crpc_sections: p.crpc_sections().join(", "),
            constitutional_articles: p.constitutional_articles().join(", "),
            similarity_label: r.label,
            scores: r.scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResponse {
    pub status: &'static str,
    pub query_info: QueryInfo,
    pub extracted_entities: EntitySet,
    pub similar_cases: Vec<SimilarCase>,
    pub explanations: Vec<Explanation>,
    pub ethical_flags: EthicalReview,
    pub disclaimer: &'static str,
}

impl AnalysisResponse {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

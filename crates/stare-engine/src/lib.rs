//! Precedent analysis pipeline: hybrid retrieval, per-case explanations and
//! ethical review of the retrieved set.

pub mod analyzer;
pub mod constitution;
pub mod error;
pub mod ethics;
pub mod explain;
pub mod query;
pub mod response;
pub mod retriever;
pub mod rules;

pub use analyzer::Analyzer;
pub use error::{AnalysisError, ErrorBody};
pub use ethics::{DiversityReport, EthicalReview, EthicalReviewEngine};
pub use explain::{ExplainabilityEngine, Explanation};
pub use query::{Query, ValidatedQuery};
pub use response::{AnalysisResponse, SimilarCase};
pub use retriever::{HybridRetriever, RankedResult, ScoreVector, SimilarityLabel};
pub use rules::{BiasRule, BiasWarning, Severity};

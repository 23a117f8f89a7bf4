use serde::Serialize;
use stare_ai::SemanticError;
use stare_store::StoreError;
use thiserror::Error;

/// Errors surfaced to callers of the analysis pipeline.
///
/// Each kind carries only a reason string; internal error chains are
/// logged, not returned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("corpus unavailable: {0}")]
    CorpusUnavailable(String),

    #[error("embedding failure: {0}")]
    EmbeddingFailure(String),
}

impl AnalysisError {
    /// Machine-readable error code.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "invalid_query",
            Self::CorpusUnavailable(_) => "corpus_unavailable",
            Self::EmbeddingFailure(_) => "embedding_failure",
        }
    }

    /// HTTP-equivalent status for transports that need one.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidQuery(_) => 400,
            Self::CorpusUnavailable(_) => 503,
            Self::EmbeddingFailure(_) => 502,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidQuery(r) | Self::CorpusUnavailable(r) | Self::EmbeddingFailure(r) => r,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            status: "error",
            error: self.kind(),
            reason: self.reason().to_string(),
            http_status: self.http_status(),
        }
    }
}

impl From<StoreError> for AnalysisError {
    fn from(err: StoreError) -> Self {
        AnalysisError::CorpusUnavailable(err.to_string())
    }
}

impl From<SemanticError> for AnalysisError {
    fn from(err: SemanticError) -> Self {
        AnalysisError::EmbeddingFailure(err.to_string())
    }
}

/// Serialised error response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: &'static str,
    pub reason: String,
    pub http_status: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_statuses() {
        let cases = [
            (AnalysisError::InvalidQuery("too short".into()), "invalid_query", 400),
            (AnalysisError::CorpusUnavailable("missing".into()), "corpus_unavailable", 503),
            (AnalysisError::EmbeddingFailure("crashed".into()), "embedding_failure", 502),
        ];
        for (err, kind, status) in cases {
            assert_eq!(err.kind(), kind);
            assert_eq!(err.http_status(), status);
        }
    }

    #[test]
    fn body_carries_reason_only() {
        let err = AnalysisError::InvalidQuery("case_text must be at least 20 characters".into());
        let body = err.to_body();
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "invalid_query");
        assert_eq!(json["http_status"], 400);
        assert_eq!(json["reason"], "case_text must be at least 20 characters");
    }

    #[test]
    fn conversions() {
        let err: AnalysisError = SemanticError::NonFinite.into();
        assert_eq!(err.kind(), "embedding_failure");
        let err: AnalysisError = StoreError::DuplicateId("X".into()).into();
        assert_eq!(err.kind(), "corpus_unavailable");
    }
}

//! Query validation.

use serde::{Deserialize, Serialize};
use stare_core::config::QueryLimits;
use stare_core::text::{clean_text, tokenize};

use crate::error::AnalysisError;

/// An analysis request as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(alias = "case_facts", alias = "text")]
    pub case_text: String,
    /// Requested result count; the configured default when absent.
    #[serde(default)]
    pub top_k: Option<i64>,
}

impl Query {
    pub fn new(case_text: impl Into<String>) -> Self {
        Self {
            case_text: case_text.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: i64) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Check length and result count before any scoring runs.
    pub fn validate(&self, limits: &QueryLimits) -> Result<ValidatedQuery, AnalysisError> {
        let trimmed = self.case_text.trim();
        let chars = trimmed.chars().count();
        if chars < limits.min_query_chars {
            return Err(AnalysisError::InvalidQuery(format!(
                "case_text must be at least {} characters, got {chars}",
                limits.min_query_chars
            )));
        }

        let requested = self.top_k.unwrap_or(limits.default_top_k as i64);
        if requested <= 0 || requested as u64 > limits.max_top_k as u64 {
            return Err(AnalysisError::InvalidQuery(format!(
                "top_k must be between 1 and {}, got {requested}",
                limits.max_top_k
            )));
        }

        let cleaned = clean_text(trimmed);
        let token_count = tokenize(&cleaned).len();
        Ok(ValidatedQuery {
            text: trimmed.to_string(),
            original_length: self.case_text.chars().count(),
            cleaned,
            token_count,
            top_k: requested as usize,
        })
    }
}

/// A query that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub text: String,
    pub cleaned: String,
    pub original_length: usize,
    pub token_count: usize,
    pub top_k: usize,
}

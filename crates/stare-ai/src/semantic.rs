//! Semantic similarity scoring over dense embeddings.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::embedder::Embedder;

#[derive(Debug, Error, PartialEq)]
pub enum SemanticError {
    #[error("embedding model failed: {0}")]
    Model(String),

    #[error("query embedding has dimension {found}, corpus expects {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("query embedding contains non-finite values")]
    NonFinite,
}

/// Cosine similarity of two vectors, clamped to [0, 1].
///
/// Negative similarity and zero-length vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na.sqrt() * nb.sqrt())).clamp(0.0, 1.0)
}

/// Embeds queries with the frozen model the corpus was embedded with.
#[derive(Clone)]
pub struct SemanticScorer {
    embedder: Arc<dyn Embedder>,
}

impl SemanticScorer {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn dim(&self) -> usize {
        self.embedder.dim()
    }

    pub fn model_name(&self) -> &str {
        self.embedder.name()
    }

    /// Embed query text, checking the result against the corpus dimension.
    pub fn embed_query(&self, text: &str, expected_dim: usize) -> Result<Vec<f32>, SemanticError> {
        let vector = self
            .embedder
            .embed(text)
            .map_err(|e| SemanticError::Model(format!("{e:#}")))?;
        if vector.len() != expected_dim {
            return Err(SemanticError::DimensionMismatch {
                expected: expected_dim,
                found: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(SemanticError::NonFinite);
        }
        debug!(model = self.model_name(), dim = vector.len(), "embedded query");
        Ok(vector)
    }
}

impl std::fmt::Debug for SemanticScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticScorer")
            .field("model", &self.embedder.name())
            .field("dim", &self.embedder.dim())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashEmbedder;

    struct FixedEmbedder(Vec<f32>);

    impl Embedder for FixedEmbedder {
        fn dim(&self) -> usize {
            self.0.len()
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }
    }

    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn dim(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "failing"
        }

        fn embed_batch(&self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            anyhow::bail!("session crashed")
        }
    }

    #[test]
    fn cosine_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn cosine_unnormalized_inputs() {
        let s = cosine_similarity(&[2.0, 0.0, 0.0, 0.0], &[1.0, 1.0, 0.0, 0.0]);
        assert!((s - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn embed_query_checks_dimension() {
        let scorer = SemanticScorer::new(Arc::new(HashEmbedder::new(16)));
        assert_eq!(scorer.embed_query("murder case", 16).unwrap().len(), 16);
        assert_eq!(
            scorer.embed_query("murder case", 32),
            Err(SemanticError::DimensionMismatch {
                expected: 32,
                found: 16
            })
        );
    }

    #[test]
    fn embed_query_rejects_non_finite() {
        let scorer = SemanticScorer::new(Arc::new(FixedEmbedder(vec![1.0, f32::NAN])));
        assert_eq!(scorer.embed_query("text", 2), Err(SemanticError::NonFinite));
    }

    #[test]
    fn embed_query_wraps_model_errors() {
        let scorer = SemanticScorer::new(Arc::new(FailingEmbedder));
        match scorer.embed_query("text", 4) {
            Err(SemanticError::Model(msg)) => assert!(msg.contains("session crashed")),
            other => panic!("expected model error, got {other:?}"),
        }
    }
}

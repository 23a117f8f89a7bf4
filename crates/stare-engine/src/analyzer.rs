//! Analysis orchestration.
//!
//! An [`Analyzer`] owns the shared, read-only pipeline components and the
//! swappable corpus handle. Each call to [`Analyzer::analyze`] takes one
//! snapshot and runs validation, extraction, scoring, ranking, explanation
//! and review against it without holding any lock.

use std::sync::Arc;

use stare_ai::{Embedder, SemanticScorer};
use stare_core::{AnalysisConfig, EntityExtractor, RegexEntityExtractor};
use stare_store::{Corpus, CorpusHandle, CorpusStats};
use tracing::info;

use crate::error::AnalysisError;
use crate::ethics::EthicalReviewEngine;
use crate::explain::ExplainabilityEngine;
use crate::query::Query;
use crate::response::{AnalysisResponse, QueryInfo, RESPONSE_DISCLAIMER, SimilarCase};
use crate::retriever::{HybridRetriever, QueryFeatures};
use crate::rules::BiasRule;

pub struct Analyzer {
    config: AnalysisConfig,
    corpus: CorpusHandle,
    extractor: Arc<dyn EntityExtractor>,
    scorer: SemanticScorer,
    retriever: HybridRetriever,
    explainer: ExplainabilityEngine,
    ethics: EthicalReviewEngine,
}

fn check_dim(corpus: &Corpus, scorer: &SemanticScorer) -> Result<(), AnalysisError> {
    match corpus.dim() {
        Some(dim) if dim != scorer.dim() => Err(AnalysisError::CorpusUnavailable(format!(
            "corpus embeddings have dimension {dim} but model {} produces {}",
            scorer.model_name(),
            scorer.dim()
        ))),
        _ => Ok(()),
    }
}

impl Analyzer {
    /// Build an analyzer over `corpus` with the regex entity extractor and
    /// the default bias rules.
    ///
    /// Fails with `CorpusUnavailable` if the configuration is invalid or the
    /// corpus was embedded with a model of a different dimension.
    pub fn new(
        config: AnalysisConfig,
        corpus: Corpus,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, AnalysisError> {
        config
            .validate()
            .map_err(|e| AnalysisError::CorpusUnavailable(format!("invalid configuration: {e}")))?;
        let scorer = SemanticScorer::new(embedder);
        check_dim(&corpus, &scorer)?;

        info!(
            cases = corpus.len(),
            model = scorer.model_name(),
            dim = scorer.dim(),
            "analyzer ready"
        );

        Ok(Self {
            retriever: HybridRetriever::new(config.labels.clone()),
            explainer: ExplainabilityEngine::new(config.explain.clone()),
            ethics: EthicalReviewEngine::new(config.diversity.clone(), config.bias.clone()),
            corpus: CorpusHandle::new(corpus),
            extractor: Arc::new(RegexEntityExtractor::new()),
            scorer,
            config,
        })
    }

    /// Replace the entity extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn EntityExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the bias rule list.
    pub fn with_rules(mut self, rules: Vec<Box<dyn BiasRule>>) -> Self {
        self.ethics = EthicalReviewEngine::with_rules(
            self.config.diversity.clone(),
            self.config.bias.clone(),
            rules,
        );
        self
    }

    /// The current corpus snapshot.
    pub fn snapshot(&self) -> Arc<Corpus> {
        self.corpus.snapshot()
    }

    pub fn stats(&self) -> CorpusStats {
        self.corpus.snapshot().stats()
    }

    /// Swap in a rebuilt corpus. Requests already running finish against
    /// the snapshot they started with.
    pub fn swap_corpus(&self, corpus: Corpus) -> Result<Arc<Corpus>, AnalysisError> {
        check_dim(&corpus, &self.scorer)?;
        Ok(self.corpus.swap(corpus))
    }

    /// Run the full pipeline for one query.
    pub fn analyze(&self, query: &Query) -> Result<AnalysisResponse, AnalysisError> {
        let validated = query.validate(&self.config.query)?;
        let corpus = self.corpus.snapshot();

        let entities = self.extractor.extract(&validated.text);
        let expected_dim = corpus.dim().unwrap_or_else(|| self.scorer.dim());
        let embedding = self.scorer.embed_query(&validated.text, expected_dim)?;
        let features = QueryFeatures {
            embedding,
            lexical: corpus.lexical().vectorize(&validated.text),
            entities,
        };

        let results = self.retriever.retrieve(&corpus, &features, validated.top_k);
        let explanations = results
            .iter()
            .map(|r| self.explainer.explain(&features, r, corpus.lexical()))
            .collect();
        let ethical_flags = self.ethics.review(&results, &features.entities);

        info!(
            query_chars = validated.original_length,
            entities = features.entities.len(),
            top_k = validated.top_k,
            results = results.len(),
            warnings = ethical_flags.bias_warnings.len(),
            concerns = ethical_flags.has_ethical_concerns,
            "analysis complete"
        );

        Ok(AnalysisResponse {
            status: "success",
            query_info: QueryInfo::from(&validated),
            similar_cases: results.iter().map(SimilarCase::from).collect(),
            explanations,
            ethical_flags,
            extracted_entities: features.entities,
            disclaimer: RESPONSE_DISCLAIMER,
        })
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("config", &self.config)
            .field("corpus", &self.corpus)
            .field("scorer", &self.scorer)
            .field("ethics", &self.ethics)
            .finish_non_exhaustive()
    }
}

//! Analysis configuration.
//!
//! Every numeric threshold the pipeline uses lives here with its default.
//! Configuration files are JSON; any omitted field takes its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Query validation limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    /// Minimum trimmed length of a case narrative, in characters.
    pub min_query_chars: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            min_query_chars: 20,
            default_top_k: 5,
            max_top_k: 15,
        }
    }
}

/// Hybrid score thresholds for the similarity label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    pub highly_similar: f64,
    pub moderately_similar: f64,
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            highly_similar: 0.75,
            moderately_similar: 0.50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    /// Vocabulary cap, by corpus-wide term frequency.
    pub max_features: usize,
    /// Documents are truncated to this many characters before indexing.
    pub max_doc_chars: usize,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            max_features: 3000,
            max_doc_chars: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub max_influential_terms: usize,
    /// Terms included in the rationale sentence.
    pub rationale_terms: usize,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            max_influential_terms: 8,
            rationale_terms: 5,
        }
    }
}

/// Weights of the three diversity components in the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityWeights {
    pub court: f64,
    pub temporal: f64,
    pub outcome: f64,
}

impl Default for DiversityWeights {
    fn default() -> Self {
        Self {
            court: 1.0 / 3.0,
            temporal: 1.0 / 3.0,
            outcome: 1.0 / 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityConfig {
    /// Year spread at which temporal diversity saturates at 1.0.
    pub temporal_range_years: u32,
    pub weights: DiversityWeights,
    /// Overall diversity below this marks the set as a concern.
    pub diversity_threshold: f64,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        Self {
            temporal_range_years: 10,
            weights: DiversityWeights::default(),
            diversity_threshold: 0.3,
        }
    }
}

/// Bias rule thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasRuleConfig {
    /// Rules are skipped for result sets smaller than this.
    pub min_cases_for_rules: usize,
    pub outcome_diversity_threshold: f64,
    pub court_dominance_share: f64,
    pub recent_share: f64,
    pub recent_window_years: i32,
    /// Year the recent window ends at. Defaults to the current year.
    pub reference_year: Option<i32>,
}

impl Default for BiasRuleConfig {
    fn default() -> Self {
        Self {
            min_cases_for_rules: 3,
            outcome_diversity_threshold: 0.3,
            court_dominance_share: 0.7,
            recent_share: 0.8,
            recent_window_years: 5,
            reference_year: None,
        }
    }
}

/// Top-level analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub query: QueryLimits,
    pub labels: LabelThresholds,
    pub lexical: LexicalConfig,
    pub explain: ExplainConfig,
    pub diversity: DiversityConfig,
    pub bias: BiasRuleConfig,
}

fn unit_interval(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {value}")))
    }
}

impl AnalysisConfig {
    /// Load from a JSON file and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let q = &self.query;
        if q.max_top_k == 0 {
            return Err(ConfigError::Invalid("query.max_top_k must be positive".into()));
        }
        if q.default_top_k == 0 || q.default_top_k > q.max_top_k {
            return Err(ConfigError::Invalid(format!(
                "query.default_top_k must be within 1..={}, got {}",
                q.max_top_k, q.default_top_k
            )));
        }

        unit_interval("labels.highly_similar", self.labels.highly_similar)?;
        unit_interval("labels.moderately_similar", self.labels.moderately_similar)?;
        if self.labels.moderately_similar > self.labels.highly_similar {
            return Err(ConfigError::Invalid(
                "labels.moderately_similar must not exceed labels.highly_similar".into(),
            ));
        }

        if self.lexical.max_features == 0 || self.lexical.max_doc_chars == 0 {
            return Err(ConfigError::Invalid(
                "lexical.max_features and lexical.max_doc_chars must be positive".into(),
            ));
        }

        let d = &self.diversity;
        if d.temporal_range_years == 0 {
            return Err(ConfigError::Invalid(
                "diversity.temporal_range_years must be positive".into(),
            ));
        }
        let w = &d.weights;
        if [w.court, w.temporal, w.outcome].iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::Invalid("diversity weights must be non-negative".into()));
        }
        if w.court + w.temporal + w.outcome <= 0.0 {
            return Err(ConfigError::Invalid("diversity weights must not all be zero".into()));
        }
        unit_interval("diversity.diversity_threshold", d.diversity_threshold)?;

        let b = &self.bias;
        unit_interval("bias.outcome_diversity_threshold", b.outcome_diversity_threshold)?;
        unit_interval("bias.court_dominance_share", b.court_dominance_share)?;
        unit_interval("bias.recent_share", b.recent_share)?;
        if b.recent_window_years <= 0 {
            return Err(ConfigError::Invalid("bias.recent_window_years must be positive".into()));
        }
        Ok(())
    }
}

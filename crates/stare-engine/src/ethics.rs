//! Ethical review of a retrieved precedent set.
//!
//! Produces a diversity report (court, time, outcome), runs the bias rule
//! list, and attaches constitutional notes for the articles in play. The
//! review only reads its input and never fails: an empty set gets a zeroed
//! report and no warnings.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::Serialize;
use stare_core::EntitySet;
use stare_core::config::{BiasRuleConfig, DiversityConfig};
use stare_core::entities::bare_number;
use tracing::debug;

use crate::constitution::{self, ConstitutionalNote};
use crate::retriever::RankedResult;
use crate::rules::{BiasRule, BiasWarning, CaseFacts, ReviewContext, Severity, default_rules};

pub const ETHICS_DISCLAIMER: &str = "This ethical review is advisory only. It surfaces potential \
     biases for judicial awareness and does not constitute a recommendation or directive.";

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiversityDetails {
    pub courts_represented: Vec<String>,
    /// "min-max" over known years, or "N/A".
    pub year_range: String,
    pub outcomes_found: Vec<String>,
    pub total_cases: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiversityReport {
    pub overall_score: f64,
    pub court_diversity: f64,
    pub temporal_diversity: f64,
    pub outcome_diversity: f64,
    pub details: DiversityDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EthicalReview {
    pub diversity_score: DiversityReport,
    pub bias_warnings: Vec<BiasWarning>,
    pub constitutional_alignment: Vec<ConstitutionalNote>,
    pub has_ethical_concerns: bool,
    pub review_summary: String,
    pub disclaimer: &'static str,
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() { UNKNOWN } else { value }
}

/// Compute the diversity report for a set of cases.
pub fn diversity(cases: &[CaseFacts], config: &DiversityConfig) -> DiversityReport {
    if cases.is_empty() {
        return DiversityReport {
            details: DiversityDetails {
                year_range: "N/A".into(),
                ..Default::default()
            },
            ..Default::default()
        };
    }
    let n = cases.len() as f64;

    let courts: BTreeSet<&str> = cases.iter().map(|c| or_unknown(&c.court)).collect();
    let court_diversity = (courts.len() as f64 / n).min(1.0);

    let years: Vec<i32> = cases.iter().map(|c| c.year).filter(|y| *y > 0).collect();
    let span = years.iter().min().zip(years.iter().max());
    let temporal_diversity = match span {
        Some((lo, hi)) if years.len() >= 2 => {
            (f64::from(hi - lo) / f64::from(config.temporal_range_years)).clamp(0.0, 1.0)
        }
        _ => 0.0,
    };

    let mut outcome_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for case in cases {
        *outcome_counts.entry(or_unknown(&case.outcome)).or_insert(0) += 1;
    }
    let max_share = outcome_counts.values().copied().max().unwrap_or(0) as f64 / n;
    let outcome_diversity = (1.0 - max_share).clamp(0.0, 1.0);

    let w = &config.weights;
    let weight_sum = w.court + w.temporal + w.outcome;
    let overall_score = if weight_sum > 0.0 {
        let weighted = w.court * court_diversity
            + w.temporal * temporal_diversity
            + w.outcome * outcome_diversity;
        (weighted / weight_sum).clamp(0.0, 1.0)
    } else {
        0.0
    };

    DiversityReport {
        overall_score,
        court_diversity,
        temporal_diversity,
        outcome_diversity,
        details: DiversityDetails {
            courts_represented: courts.into_iter().map(str::to_string).collect(),
            year_range: span
                .map(|(lo, hi)| format!("{lo}-{hi}"))
                .unwrap_or_else(|| "N/A".into()),
            outcomes_found: outcome_counts.into_keys().map(str::to_string).collect(),
            total_cases: cases.len(),
        },
    }
}

pub struct EthicalReviewEngine {
    diversity: DiversityConfig,
    bias: BiasRuleConfig,
    rules: Vec<Box<dyn BiasRule>>,
}

impl EthicalReviewEngine {
    pub fn new(diversity: DiversityConfig, bias: BiasRuleConfig) -> Self {
        Self::with_rules(diversity, bias, default_rules())
    }

    /// Use a custom rule list, evaluated in order.
    pub fn with_rules(
        diversity: DiversityConfig,
        bias: BiasRuleConfig,
        rules: Vec<Box<dyn BiasRule>>,
    ) -> Self {
        Self {
            diversity,
            bias,
            rules,
        }
    }

    fn reference_year(&self) -> i32 {
        self.bias
            .reference_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }

    /// Review the final ranked set against the query's entities.
    ///
    /// Blank courts and outcomes become "Unknown" here, so the report and
    /// every rule see the same values.
    pub fn review(
        &self,
        results: &[RankedResult<'_>],
        query_entities: &EntitySet,
    ) -> EthicalReview {
        let cases: Vec<CaseFacts> = results
            .iter()
            .map(|r| CaseFacts {
                court: or_unknown(r.precedent.court()).to_string(),
                outcome: or_unknown(r.precedent.outcome()).to_string(),
                year: r.precedent.year(),
                ipc_sections: r.precedent.ipc_sections().to_vec(),
            })
            .collect();

        let report = diversity(&cases, &self.diversity);

        let mut bias_warnings = Vec::new();
        if cases.len() >= self.bias.min_cases_for_rules.max(1) {
            let ctx = ReviewContext {
                report: &report,
                cases: &cases,
                config: &self.bias,
                reference_year: self.reference_year(),
            };
            for rule in &self.rules {
                if let Some(warning) = rule.evaluate(&ctx) {
                    debug!(rule = rule.code(), severity = ?warning.severity, "bias rule fired");
                    bias_warnings.push(warning);
                }
            }
        }

        let articles = query_entities
            .articles()
            .iter()
            .map(|a| bare_number(a))
            .chain(
                results
                    .iter()
                    .flat_map(|r| r.precedent.constitutional_articles().iter().map(String::as_str)),
            );
        let constitutional_alignment = constitution::notes(articles);

        let has_ethical_concerns = !cases.is_empty()
            && (report.overall_score < self.diversity.diversity_threshold
                || bias_warnings.iter().any(|w| w.severity == Severity::High));
        let review_summary = if cases.is_empty() {
            "No precedents were retrieved; there is no set to review.".to_string()
        } else if has_ethical_concerns {
            "Ethical concerns detected in the retrieved precedent set. Please review bias \
             warnings and consider expanding the search scope."
                .to_string()
        } else {
            "Retrieved precedents appear reasonably diverse. Standard judicial discretion applies."
                .to_string()
        };

        EthicalReview {
            diversity_score: report,
            bias_warnings,
            constitutional_alignment,
            has_ethical_concerns,
            review_summary,
            disclaimer: ETHICS_DISCLAIMER,
        }
    }
}

impl std::fmt::Debug for EthicalReviewEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let codes: Vec<&str> = self.rules.iter().map(|r| r.code()).collect();
        f.debug_struct("EthicalReviewEngine")
            .field("diversity", &self.diversity)
            .field("bias", &self.bias)
            .field("rules", &codes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::{HybridRetriever, QueryFeatures};
    use stare_core::PrecedentRecord;
    use stare_core::config::LexicalConfig;
    use stare_store::{Corpus, SparseVector};

    fn facts(court: &str, outcome: &str, year: i32) -> CaseFacts {
        CaseFacts {
            court: court.into(),
            outcome: outcome.into(),
            year,
            ipc_sections: vec![],
        }
    }

    #[test]
    fn empty_set_is_zeroed() {
        let report = diversity(&[], &DiversityConfig::default());
        assert_eq!(report.overall_score, 0.0);
        assert_eq!(report.court_diversity, 0.0);
        assert_eq!(report.details.year_range, "N/A");
        assert_eq!(report.details.total_cases, 0);
    }

    #[test]
    fn diverse_set_scores() {
        let cases = vec![
            facts("Supreme Court of India", "Acquitted", 2005),
            facts("Delhi High Court", "Convicted", 2015),
            facts("Bombay High Court", "Convicted", 2010),
            facts("Delhi High Court", "Bail Granted", 2020),
        ];
        let report = diversity(&cases, &DiversityConfig::default());
        assert!((report.court_diversity - 0.75).abs() < 1e-12);
        assert_eq!(report.temporal_diversity, 1.0);
        assert!((report.outcome_diversity - 0.5).abs() < 1e-12);
        let mean = (0.75 + 1.0 + 0.5) / 3.0;
        assert!((report.overall_score - mean).abs() < 1e-9);
        assert_eq!(report.details.year_range, "2005-2020");
        assert_eq!(
            report.details.courts_represented,
            vec!["Bombay High Court", "Delhi High Court", "Supreme Court of India"]
        );
        assert_eq!(report.details.outcomes_found, vec!["Acquitted", "Bail Granted", "Convicted"]);
    }

    #[test]
    fn temporal_needs_two_known_years() {
        let cases = vec![facts("A", "X", 2010), facts("B", "Y", 0)];
        let report = diversity(&cases, &DiversityConfig::default());
        assert_eq!(report.temporal_diversity, 0.0);
        assert_eq!(report.details.year_range, "2010-2010");

        let cases = vec![facts("A", "X", 2010), facts("B", "Y", 2014)];
        let report = diversity(&cases, &DiversityConfig::default());
        assert!((report.temporal_diversity - 0.4).abs() < 1e-12);
    }

    #[test]
    fn custom_weights() {
        let mut config = DiversityConfig::default();
        config.weights.court = 1.0;
        config.weights.temporal = 0.0;
        config.weights.outcome = 0.0;
        let cases = vec![facts("A", "X", 2010), facts("B", "X", 2010)];
        let report = diversity(&cases, &config);
        assert_eq!(report.overall_score, 1.0);
    }

    fn corpus_of(records: Vec<PrecedentRecord>) -> Corpus {
        Corpus::from_records(records, &LexicalConfig::default()).unwrap()
    }

    fn record(
        id: &str,
        court: &str,
        outcome: &str,
        year: i32,
        articles: &[&str],
    ) -> PrecedentRecord {
        PrecedentRecord {
            id: id.into(),
            court: court.into(),
            outcome: outcome.into(),
            year,
            ipc_sections: vec!["302".into()],
            constitutional_articles: articles.iter().map(|a| a.to_string()).collect(),
            text: "text".into(),
            embedding: Some(vec![1.0, 0.0]),
            ..Default::default()
        }
    }

    fn review_all(
        corpus: &Corpus,
        query_entities: EntitySet,
        bias: BiasRuleConfig,
    ) -> EthicalReview {
        let query = QueryFeatures {
            embedding: vec![1.0, 0.0],
            lexical: SparseVector::default(),
            entities: query_entities.clone(),
        };
        let results = HybridRetriever::default().retrieve(corpus, &query, 15);
        EthicalReviewEngine::new(DiversityConfig::default(), bias).review(&results, &query_entities)
    }

    #[test]
    fn homogeneous_set_raises_concerns() {
        let corpus = corpus_of(
            (0..10)
                .map(|i| {
                    let id = format!("NV-{i:03}");
                    record(&id, "Delhi High Court", "Convicted", 2000 + i, &[])
                })
                .collect(),
        );
        let bias = BiasRuleConfig {
            reference_year: Some(2024),
            ..Default::default()
        };
        let review = review_all(&corpus, EntitySet::new(), bias);
        assert!(review.diversity_score.court_diversity <= 0.1);
        let codes: Vec<&str> = review.bias_warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            vec!["low_outcome_diversity", "single_court_dominance", "section_concentration"]
        );
        let court = &review.bias_warnings[1];
        assert_eq!(court.severity, Severity::Medium);
        assert!(review.has_ethical_concerns);
        assert_eq!(review.disclaimer, ETHICS_DISCLAIMER);
    }

    #[test]
    fn rules_skip_small_sets() {
        let corpus = corpus_of(vec![
            record("A", "Delhi High Court", "Convicted", 2020, &[]),
            record("B", "Delhi High Court", "Convicted", 2021, &[]),
        ]);
        let review = review_all(&corpus, EntitySet::new(), BiasRuleConfig::default());
        assert!(review.bias_warnings.is_empty());
        assert_eq!(review.diversity_score.details.total_cases, 2);
    }

    #[test]
    fn constitutional_notes_from_query_and_results() {
        let corpus = corpus_of(vec![
            record("A", "Delhi High Court", "Convicted", 2010, &["21", "999"]),
            record("B", "Bombay High Court", "Acquitted", 2020, &["19(1)(g)"]),
        ]);
        let articles = vec!["14".to_string(), "21".to_string()];
        let query_entities = EntitySet::from_fields(&[], &[], &articles, &[]);
        let review = review_all(&corpus, query_entities, BiasRuleConfig::default());
        let articles: Vec<&str> = review
            .constitutional_alignment
            .iter()
            .map(|n| n.article.as_str())
            .collect();
        assert_eq!(articles, vec!["Article 14", "Article 19", "Article 21"]);
    }

    #[test]
    fn blank_court_reported_as_unknown() {
        let corpus = corpus_of(
            (0..3)
                .map(|i| record(&format!("X-{i}"), "", "", 2000 + i * 5, &[]))
                .collect(),
        );
        let bias = BiasRuleConfig {
            reference_year: Some(2024),
            ..Default::default()
        };
        let review = review_all(&corpus, EntitySet::new(), bias);
        assert_eq!(review.diversity_score.details.courts_represented, vec!["Unknown"]);
        assert_eq!(review.diversity_score.details.outcomes_found, vec!["Unknown"]);

        let court = review
            .bias_warnings
            .iter()
            .find(|w| w.code == "single_court_dominance")
            .unwrap();
        assert!(court.message.starts_with("3 of 3 precedents are from Unknown."));
        let outcome = review
            .bias_warnings
            .iter()
            .find(|w| w.code == "low_outcome_diversity")
            .unwrap();
        assert!(outcome.message.contains("'Unknown'"));
    }

    struct EveryCase;

    impl BiasRule for EveryCase {
        fn code(&self) -> &'static str {
            "every_case"
        }

        fn evaluate(&self, ctx: &ReviewContext<'_>) -> Option<BiasWarning> {
            Some(BiasWarning {
                code: self.code(),
                severity: Severity::Low,
                message: format!("{} cases reviewed", ctx.total()),
                recommendation: "None",
            })
        }
    }

    #[test]
    fn custom_rule_list_runs_in_order() {
        let corpus = corpus_of(
            (0..4)
                .map(|i| {
                    let id = format!("NV-{i}");
                    record(&id, "Delhi High Court", "Convicted", 1990 + i * 10, &[])
                })
                .collect(),
        );
        let query = QueryFeatures {
            embedding: vec![1.0, 0.0],
            lexical: SparseVector::default(),
            entities: EntitySet::new(),
        };
        let results = HybridRetriever::default().retrieve(&corpus, &query, 15);

        let rules: Vec<Box<dyn BiasRule>> =
            vec![Box::new(EveryCase), Box::new(crate::rules::SingleCourtDominance)];
        let engine = EthicalReviewEngine::with_rules(
            DiversityConfig::default(),
            BiasRuleConfig::default(),
            rules,
        );
        let review = engine.review(&results, &EntitySet::new());
        let codes: Vec<&str> = review.bias_warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, vec!["every_case", "single_court_dominance"]);
        assert_eq!(review.bias_warnings[0].message, "4 cases reviewed");
        assert!(!review.has_ethical_concerns);

        let silent = EthicalReviewEngine::with_rules(
            DiversityConfig::default(),
            BiasRuleConfig::default(),
            Vec::new(),
        );
        let review = silent.review(&results, &EntitySet::new());
        assert!(review.bias_warnings.is_empty());
        assert_eq!(review.diversity_score.details.total_cases, 4);
    }

    #[test]
    fn empty_results_no_warnings() {
        let review = review_all(&Corpus::empty(), EntitySet::new(), BiasRuleConfig::default());
        assert!(review.bias_warnings.is_empty());
        assert!(review.constitutional_alignment.is_empty());
        assert!(!review.has_ethical_concerns);
        assert_eq!(review.diversity_score.overall_score, 0.0);
    }
}

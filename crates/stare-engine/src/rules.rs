//! Bias rules evaluated over a retrieved precedent set.
//!
//! Each rule is an independent object that inspects a [`ReviewContext`]
//! and may raise one warning. Rules run in list order and never affect
//! one another.

use std::collections::BTreeMap;

use serde::Serialize;
use stare_core::EntityCategory;
use stare_core::config::BiasRuleConfig;
use stare_core::entities::bare_number;
use stare_core::section_key::normalize_section;

use crate::ethics::DiversityReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasWarning {
    #[serde(rename = "type")]
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    pub recommendation: &'static str,
}

/// The facts of one retrieved case that rules look at.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseFacts {
    pub court: String,
    pub outcome: String,
    /// 0 when unknown.
    pub year: i32,
    pub ipc_sections: Vec<String>,
}

/// Everything a rule may inspect.
#[derive(Debug, Clone)]
pub struct ReviewContext<'a> {
    pub report: &'a DiversityReport,
    pub cases: &'a [CaseFacts],
    pub config: &'a BiasRuleConfig,
    pub reference_year: i32,
}

impl ReviewContext<'_> {
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    /// Most frequent value and its count; ties go to the alphabetically first.
    fn dominant<'c>(&self, values: impl Iterator<Item = &'c str>) -> Option<(&'c str, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values {
            *counts.entry(v).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .fold(None, |best, (value, n)| match best {
                Some((_, m)) if m >= n => best,
                _ => Some((value, n)),
            })
    }
}

pub trait BiasRule: Send + Sync {
    /// Stable warning code.
    fn code(&self) -> &'static str;

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Option<BiasWarning>;
}

/// One outcome dominates the set.
pub struct LowOutcomeDiversity;

impl BiasRule for LowOutcomeDiversity {
    fn code(&self) -> &'static str {
        "low_outcome_diversity"
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Option<BiasWarning> {
        if ctx.report.outcome_diversity >= ctx.config.outcome_diversity_threshold {
            return None;
        }
        let n = ctx.total();
        let (outcome, count) = ctx.dominant(ctx.cases.iter().map(|c| c.outcome.as_str()))?;
        let message = if count == n {
            format!(
                "All {n} retrieved precedents resulted in '{outcome}'. This may indicate \
                 confirmation bias in retrieval. Judicial discretion should account for \
                 contrary precedents."
            )
        } else {
            format!(
                "{count} of {n} retrieved precedents resulted in '{outcome}'. This may \
                 indicate confirmation bias in retrieval. Judicial discretion should account \
                 for contrary precedents."
            )
        };
        Some(BiasWarning {
            code: self.code(),
            severity: Severity::High,
            message,
            recommendation: "Actively seek contrary / distinguishing precedents",
        })
    }
}

/// One court supplies most of the set.
pub struct SingleCourtDominance;

impl BiasRule for SingleCourtDominance {
    fn code(&self) -> &'static str {
        "single_court_dominance"
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Option<BiasWarning> {
        let n = ctx.total();
        let (court, count) = ctx.dominant(ctx.cases.iter().map(|c| c.court.as_str()))?;
        let share = count as f64 / n as f64;
        if share <= ctx.config.court_dominance_share {
            return None;
        }
        Some(BiasWarning {
            code: self.code(),
            severity: Severity::Medium,
            message: format!(
                "{count} of {n} precedents are from {court}. Consider reviewing judgments \
                 from other High Courts or the Supreme Court for a more balanced perspective."
            ),
            recommendation: "Cross-reference with other jurisdictions",
        })
    }
}

/// Almost every dated precedent falls within the recent window.
pub struct TemporalSkew;

impl BiasRule for TemporalSkew {
    fn code(&self) -> &'static str {
        "temporal_skew"
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Option<BiasWarning> {
        let years: Vec<i32> = ctx.cases.iter().map(|c| c.year).filter(|y| *y > 0).collect();
        if years.is_empty() {
            return None;
        }
        let from = ctx.reference_year - ctx.config.recent_window_years;
        let recent = years.iter().filter(|y| **y >= from).count();
        let share = recent as f64 / years.len() as f64;
        if share <= ctx.config.recent_share {
            return None;
        }
        Some(BiasWarning {
            code: self.code(),
            severity: Severity::Low,
            message: format!(
                "{recent} of {} dated precedents were decided in {from}-{}. Older landmark \
                 precedents may provide additional legal grounding.",
                years.len(),
                ctx.reference_year
            ),
            recommendation: "Consider expanding search to include landmark older cases",
        })
    }
}

/// The same IPC section appears in every retrieved case.
pub struct SectionConcentration;

impl BiasRule for SectionConcentration {
    fn code(&self) -> &'static str {
        "section_concentration"
    }

    fn evaluate(&self, ctx: &ReviewContext<'_>) -> Option<BiasWarning> {
        let n = ctx.total();
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for case in ctx.cases {
            let mut seen: Vec<String> = case
                .ipc_sections
                .iter()
                .filter(|s| !s.trim().is_empty())
                .map(|s| bare_number(&EntityCategory::Ipc.identifier(s)).to_string())
                .collect();
            seen.sort_unstable();
            seen.dedup();
            for section in seen {
                *counts.entry(section).or_insert(0) += 1;
            }
        }
        let section = counts
            .into_iter()
            .filter(|(_, c)| *c == n)
            .map(|(s, _)| s)
            .min_by_key(|s| normalize_section(s))?;
        Some(BiasWarning {
            code: self.code(),
            severity: Severity::Low,
            message: format!(
                "IPC Section {section} appears in all retrieved cases. Consider whether \
                 related provisions or alternative charges are relevant."
            ),
            recommendation: "Review if allied provisions apply",
        })
    }
}

/// The standard rule list, in evaluation order.
pub fn default_rules() -> Vec<Box<dyn BiasRule>> {
    vec![
        Box::new(LowOutcomeDiversity),
        Box::new(SingleCourtDominance),
        Box::new(TemporalSkew),
        Box::new(SectionConcentration),
    ]
}

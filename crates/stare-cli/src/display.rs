//! Vertical card display for analysis responses and corpus statistics.

use std::collections::BTreeMap;
use std::path::Path;

use stare_engine::explain::Explanation;
use stare_engine::response::SimilarCase;
use stare_engine::AnalysisResponse;
use stare_store::CorpusStats;

const MAX_LIST_ITEMS: usize = 10;
const EXCERPT_CHARS: usize = 240;

// ── Public API ──

/// Print a full response: entities, one card per case, then the ethical review.
pub fn print_response(response: &AnalysisResponse) {
    let info = &response.query_info;
    println!(
        "=== {} similar precedent(s) ===",
        response.similar_cases.len()
    );
    println!(
        "Query: {} chars, {} tokens, top_k {}",
        info.original_length, info.token_count, info.top_k_requested
    );
    println!();

    let entities = &response.extracted_entities;
    print_section(
        "Extracted Entities",
        &[
            ("IPC", entities.ipc().join(", ")),
            ("CrPC", entities.crpc().join(", ")),
            ("Constitution", entities.articles().join(", ")),
            ("Acts", entities.acts().join(", ")),
        ],
    );

    for (case, explanation) in response.similar_cases.iter().zip(&response.explanations) {
        print_case_card(case, explanation);
    }

    print_ethics(response);
    println!("{}", response.disclaimer);
}

/// Print corpus statistics grouped by field.
pub fn print_stats(path: &Path, stats: &CorpusStats) {
    println!("=== {} ===", path.display());
    println!();
    let years = match (stats.year_min, stats.year_max) {
        (Some(lo), Some(hi)) => format!("{lo}-{hi}"),
        _ => "N/A".to_string(),
    };
    print_section(
        "Corpus",
        &[
            ("total_cases", stats.total_cases.to_string()),
            (
                "embedding_dim",
                stats.embedding_dim.map(|d| d.to_string()).unwrap_or_default(),
            ),
            ("vocabulary_size", stats.vocabulary_size.to_string()),
            ("years", years),
        ],
    );
    print_counts("Courts", &stats.courts);
    print_counts("Outcomes", &stats.outcomes);
    print_counts("Sources", &stats.sources);
}

// ── Section rendering ──

fn print_case_card(case: &SimilarCase, explanation: &Explanation) {
    let title = if case.case_title.is_empty() {
        case.case_id.as_str()
    } else {
        case.case_title.as_str()
    };
    println!("--- {} ---", title);
    println!();

    let s = &case.scores;
    print_section(
        "Identity",
        &[
            ("case_id", case.case_id.clone()),
            ("court", case.court.clone()),
            ("year", year_str(case.year)),
            ("judgment_outcome", case.judgment_outcome.clone()),
        ],
    );
    print_section(
        "Provisions",
        &[
            ("ipc_sections", case.ipc_sections.clone()),
            ("crpc_sections", case.crpc_sections.clone()),
            ("constitutional_articles", case.constitutional_articles.clone()),
        ],
    );
    print_section(
        "Similarity",
        &[
            ("label", case.similarity_label.to_string()),
            ("hybrid", format!("{:.4}", s.hybrid())),
            ("semantic", format!("{:.4}", s.semantic)),
            ("lexical", format!("{:.4}", s.lexical)),
            ("entity_overlap", format!("{:.4}", s.entity_overlap)),
        ],
    );

    let terms: Vec<String> = explanation
        .influential_terms
        .iter()
        .take(MAX_LIST_ITEMS)
        .map(|t| format!("{} ({:.2})", t.term, t.weight))
        .collect();
    let overlap = &explanation.entity_overlap;
    let common: Vec<&str> = overlap
        .common_ipc
        .iter()
        .chain(&overlap.common_crpc)
        .chain(&overlap.common_articles)
        .chain(&overlap.common_acts)
        .map(String::as_str)
        .collect();
    print_section(
        "Explanation",
        &[
            ("common_provisions", common.join(", ")),
            ("influential_terms", terms.join(", ")),
        ],
    );
    println!("  {}", explanation.explanation_text);
    println!();

    let excerpt = excerpt(&case.case_text);
    if !excerpt.is_empty() {
        println!("Excerpt");
        println!("  {excerpt}");
        println!();
    }
}

fn print_ethics(response: &AnalysisResponse) {
    let flags = &response.ethical_flags;
    let d = &flags.diversity_score;
    print_section(
        "Diversity",
        &[
            ("overall_score", format!("{:.2}", d.overall_score)),
            ("court_diversity", format!("{:.2}", d.court_diversity)),
            ("temporal_diversity", format!("{:.2}", d.temporal_diversity)),
            ("outcome_diversity", format!("{:.2}", d.outcome_diversity)),
            ("courts_represented", d.details.courts_represented.join(", ")),
            ("year_range", d.details.year_range.clone()),
            ("total_cases", d.details.total_cases.to_string()),
        ],
    );

    if !flags.bias_warnings.is_empty() {
        println!("Bias Warnings ({}):", flags.bias_warnings.len());
        for w in &flags.bias_warnings {
            println!("  [{}] {}", w.severity, w.code);
            println!("      {}", w.message);
            println!("      -> {}", w.recommendation);
        }
        println!();
    }

    if !flags.constitutional_alignment.is_empty() {
        println!("Constitutional Alignment");
        for note in &flags.constitutional_alignment {
            println!("  {:<26} {}", note.article, note.principle);
        }
        println!();
    }

    println!("{}", flags.review_summary);
    println!();
}

fn print_section(header: &str, rows: &[(&str, String)]) {
    if rows.iter().all(|(_, value)| value.is_empty()) {
        return;
    }
    println!("{header}");
    for (name, value) in rows {
        if !value.is_empty() {
            println!("  {:<26} {}", name, value);
        }
    }
    println!();
}

fn print_counts(header: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    let mut ranked: Vec<(&String, &usize)> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("{header} ({}):", counts.len());
    for (name, count) in ranked.iter().take(MAX_LIST_ITEMS) {
        println!("  {:<26} {}", name, count);
    }
    if ranked.len() > MAX_LIST_ITEMS {
        println!("  ... and {} more", ranked.len() - MAX_LIST_ITEMS);
    }
    println!();
}

// ── Helpers ──

fn year_str(year: i32) -> String {
    if year > 0 { year.to_string() } else { String::new() }
}

/// First `EXCERPT_CHARS` characters of the text on one line.
fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > EXCERPT_CHARS {
        let cut: String = flat.chars().take(EXCERPT_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

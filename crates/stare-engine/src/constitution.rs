//! Reference table of constitutional articles and the principles they protect.

use std::collections::BTreeMap;

use serde::Serialize;
use stare_core::section_key::normalize_section;

const ARTICLE_PRINCIPLES: &[(&str, &str)] = &[
    ("14", "Equality before law / Equal protection of laws"),
    (
        "15",
        "Prohibition of discrimination on grounds of religion, race, caste, sex, place of birth",
    ),
    ("19", "Protection of fundamental freedoms (speech, assembly, movement, profession)"),
    (
        "20",
        "Protection in respect of conviction for offences (double jeopardy, self-incrimination)",
    ),
    ("21", "Right to life and personal liberty"),
    ("21A", "Right to education"),
    ("22", "Protection against arrest and detention"),
    ("25", "Freedom of conscience and free profession, practice, and propagation of religion"),
    ("32", "Right to constitutional remedies"),
    ("39", "Certain principles of policy to be followed by the State"),
    ("43", "Living wage, conditions of work, and decent standard of life"),
    ("48A", "Protection and improvement of environment and safeguarding forests"),
    ("51A", "Fundamental duties of citizens"),
    ("244", "Administration of Scheduled Areas and Tribal Areas"),
    ("300A", "Right to property: no person shall be deprived of property save by authority of law"),
    ("311", "Dismissal, removal, or reduction in rank of civil servants"),
];

/// Principle protected by an article, keyed by its base number ("21", "21A").
pub fn principle(article: &str) -> Option<&'static str> {
    let key = article.trim().to_ascii_uppercase();
    ARTICLE_PRINCIPLES
        .iter()
        .find(|(number, _)| *number == key)
        .map(|(_, principle)| *principle)
}

/// Strip clause qualifiers: "19(1)(g)" → "19", "21a" → "21A".
pub fn base_article(article: &str) -> String {
    let article = article.trim();
    let end = article.find('(').unwrap_or(article.len());
    article[..end].trim().to_ascii_uppercase()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstitutionalNote {
    pub article: String,
    pub principle: &'static str,
    pub note: String,
}

/// Notes for every distinct known article among `articles`, in article order.
/// Unknown articles are skipped.
pub fn notes<'a, I>(articles: I) -> Vec<ConstitutionalNote>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut known: BTreeMap<String, (String, &'static str)> = BTreeMap::new();
    for article in articles {
        let base = base_article(article);
        if let Some(principle) = principle(&base) {
            known
                .entry(normalize_section(&base))
                .or_insert((base, principle));
        }
    }
    known
        .into_values()
        .map(|(base, principle)| ConstitutionalNote {
            article: format!("Article {base}"),
            principle,
            note: format!(
                "Article {base} of the Constitution of India guarantees: {principle}. \
                 This principle is relevant to the current case analysis."
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(principle("21"), Some("Right to life and personal liberty"));
        assert_eq!(principle("21a"), Some("Right to education"));
        assert_eq!(principle("370"), None);
    }

    #[test]
    fn base_strips_clauses() {
        assert_eq!(base_article("19(1)(g)"), "19");
        assert_eq!(base_article(" 48a "), "48A");
    }

    #[test]
    fn notes_are_distinct_sorted_and_skip_unknown() {
        let notes = notes(["21", "14", "19(1)(a)", "19(1)(g)", "999", "21", "300A"]);
        let articles: Vec<&str> = notes.iter().map(|n| n.article.as_str()).collect();
        assert_eq!(articles, vec!["Article 14", "Article 19", "Article 21", "Article 300A"]);
        assert!(notes[2].note.starts_with("Article 21 of the Constitution of India guarantees"));
    }

    #[test]
    fn no_articles_no_notes() {
        assert!(notes(std::iter::empty()).is_empty());
    }
}

//! Text normalisation for legal case narratives.
//!
//! Court records arrive with inconsistent casing, dotted abbreviations
//! ("I.P.C.", "Cr.P.C."), paragraph and page markers, and stray symbols.
//! `clean_text` folds these into one canonical form shared by the lexical
//! index, the query path, and the explainability engine.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+|www\.\S+").expect("valid regex"));
static IPC_ABBREV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"i\.p\.c\.?").expect("valid regex"));
static CRPC_ABBREV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"cr\.p\.c\.?").expect("valid regex"));
static CPC_ABBREV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"c\.p\.c\.?").expect("valid regex"));
static PARA_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpara\s*\.?\s*\d+\s*\.?").expect("valid regex"));
static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpage\s*no\s*\.?\s*\d+").expect("valid regex"));
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,;:\-/()]").expect("valid regex"));
static TERM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// English stop words excluded from lexical features.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "alone", "along",
    "already", "also", "although", "always", "am", "among", "an", "and", "another", "any",
    "anyhow", "anyone", "anything", "anyway", "anywhere", "are", "around", "as", "at", "be",
    "became", "because", "become", "becomes", "been", "before", "being", "below", "beside",
    "besides", "between", "beyond", "both", "but", "by", "can", "cannot", "could", "did", "do",
    "does", "doing", "done", "down", "due", "during", "each", "either", "else", "elsewhere",
    "enough", "etc", "even", "ever", "every", "except", "few", "for", "former", "from",
    "further", "had", "has", "have", "having", "he", "hence", "her", "here", "hereby", "herein",
    "hers", "herself", "him", "himself", "his", "how", "however", "if", "in", "indeed", "into",
    "is", "it", "its", "itself", "just", "last", "latter", "least", "less", "many", "may", "me",
    "meanwhile", "might", "more", "moreover", "most", "mostly", "much", "must", "my", "myself",
    "neither", "never", "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing",
    "now", "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other", "others",
    "otherwise", "our", "ours", "ourselves", "out", "over", "own", "per", "perhaps", "rather",
    "same", "several", "she", "should", "since", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "these", "they", "this", "those", "though", "through", "throughout",
    "thus", "to", "together", "too", "toward", "towards", "under", "until", "up", "upon", "us",
    "very", "via", "was", "we", "were", "what", "whatever", "when", "whence", "whenever",
    "where", "whereas", "whereby", "wherein", "whether", "which", "while", "who", "whoever",
    "whole", "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you",
    "your", "yours", "yourself", "yourselves",
];

/// Returns true if `term` is an English stop word.
pub fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.binary_search(&term).is_ok()
}

/// Clean raw legal text for downstream scoring.
///
/// Lowercases, collapses whitespace, strips URLs, folds dotted code
/// abbreviations (`i.p.c.` → `ipc`, `cr.p.c.` → `crpc`, `c.p.c.` → `cpc`),
/// drops paragraph/page markers and any punctuation outside `.,;:-/()`.
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let text = text.to_lowercase();
    let text = WHITESPACE.replace_all(&text, " ");
    let text = URL.replace_all(&text, "");
    // cr.p.c before i.p.c would not matter, but c.p.c must come last: it
    // is a suffix of cr.p.c.
    let text = IPC_ABBREV.replace_all(&text, "ipc");
    let text = CRPC_ABBREV.replace_all(&text, "crpc");
    let text = CPC_ABBREV.replace_all(&text, "cpc");
    let text = PARA_MARKER.replace_all(&text, "");
    let text = PAGE_MARKER.replace_all(&text, "");
    let text = DISALLOWED.replace_all(&text, "");
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Whitespace tokens of cleaned text, dropping single-character tokens.
pub fn tokenize(cleaned: &str) -> Vec<&str> {
    cleaned.split_whitespace().filter(|t| t.chars().count() > 1).collect()
}

/// Lexical terms: word runs of two or more characters, stop words removed.
///
/// Expects already-cleaned (lowercased) text.
pub fn terms(cleaned: &str) -> Vec<&str> {
    TERM.find_iter(cleaned)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Truncate to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

//! Sort key normalisation for Indian statute section and article numbers.
//!
//! Converts bare identifiers (e.g., "34", "120B", "498A", "19(1)(g)") into
//! lexicographically-sortable strings so that entity lists come out in
//! statute order rather than string order ("34" before "302").
//!
//! # Indian numbering conventions
//!
//! - Plain numeric: s.34, s.201, s.302
//! - Letter suffix (amendment insertion): s.120A, s.120B between s.120 and s.121
//! - Double letter: s.304AA after s.304A
//! - Clause qualifiers on articles: Art. 19(1)(g), Art. 21A

/// Normalise a section or article number into a lexicographically-sortable string.
///
/// Input: bare number like "302", "498A", "21A", "19(1)(g)"
/// Output: "0302.000.000", "0498.010.000", "0021.010.000", "0019.000.000~(1)(g)"
///
/// # Algorithm
///
/// 1. Extract leading ASCII digits → base number (zero-padded to 4 digits)
/// 2. Parse up to 2 uppercase letter suffixes: A=010, B=020, ..., Z=260
/// 3. Pad to exactly 3 segments with "000"
/// 4. Any remaining qualifier (sub-clauses) is appended after `~`, lowercased
pub fn normalize_section(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        return "0000.000.000".to_string();
    }

    let upper = s.to_ascii_uppercase();
    let bytes = upper.as_bytes();

    let digit_end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    let base: u32 = if digit_end > 0 {
        upper[..digit_end].parse().unwrap_or(0)
    } else {
        0
    };

    let suffix = &bytes[digit_end..];
    let mut segments: Vec<u32> = vec![base];
    let mut i = 0;

    while i < suffix.len() && segments.len() < 3 && suffix[i].is_ascii_uppercase() {
        let letter_val = (suffix[i] - b'A') as u32 + 1;
        segments.push(letter_val * 10);
        i += 1;
    }

    while segments.len() < 3 {
        segments.push(0);
    }

    let key = format!("{:04}.{:03}.{:03}", segments[0], segments[1], segments[2]);
    let qualifier = s[digit_end + i..].trim();
    if qualifier.is_empty() {
        key
    } else {
        with_clause(&key, &qualifier.to_ascii_lowercase())
    }
}

/// Append a clause qualifier to a sort key.
///
/// "0019.000.000" + "(1)(g)" → "0019.000.000~(1)(g)"
pub fn with_clause(sort_key: &str, clause: &str) -> String {
    format!("{}~{}", sort_key, clause)
}

/// Sort key for a prefixed entity identifier such as "IPC 302" or "Article 21A".
///
/// The prefix is kept as the leading component so identifiers from different
/// codes never interleave; identifiers without a numeric tail (act names)
/// sort by their lowercased text.
pub fn identifier_key(identifier: &str) -> String {
    let identifier = identifier.trim();
    match identifier.rsplit_once(' ') {
        Some((prefix, number)) if number.starts_with(|c: char| c.is_ascii_digit()) => {
            format!("{}|{}", prefix.to_ascii_lowercase(), normalize_section(number))
        }
        _ => identifier.to_ascii_lowercase(),
    }
}

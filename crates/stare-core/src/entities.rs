//! Legal entity sets and the default regex entity extractor.
//!
//! An [`EntitySet`] holds the statutory references found in a case text or
//! attached to a precedent: IPC sections, CrPC sections, constitutional
//! articles, and named Acts. Identifiers are normalised (`IPC 302`,
//! `CrPC 154`, `Article 21`, `POCSO Act`), deduplicated, and kept in
//! statute order within each category.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::section_key::identifier_key;

/// Category of a legal reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityCategory {
    Ipc,
    Crpc,
    Article,
    Act,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 4] = [Self::Ipc, Self::Crpc, Self::Article, Self::Act];

    /// Prefix used in normalised identifiers. Acts carry their own name.
    pub fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Ipc => Some("IPC"),
            Self::Crpc => Some("CrPC"),
            Self::Article => Some("Article"),
            Self::Act => None,
        }
    }

    /// Build the normalised identifier for a bare section/article number or act name.
    pub fn identifier(self, bare: &str) -> String {
        let bare = bare.trim();
        match self.prefix() {
            Some(prefix) => format!("{prefix} {}", normalize_number(bare)),
            None => canonical_act(bare),
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ipc => write!(f, "IPC"),
            Self::Crpc => write!(f, "CrPC"),
            Self::Article => write!(f, "Article"),
            Self::Act => write!(f, "Act"),
        }
    }
}

/// Uppercase the letter suffix of a section number, lowercase any clause.
///
/// "498a" → "498A", "19(1)(G)" → "19(1)(g)".
fn normalize_number(bare: &str) -> String {
    let digits = bare.chars().take_while(|c| c.is_ascii_digit()).count();
    let letters = bare[digits..]
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    let (head, rest) = bare.split_at(digits + letters);
    format!("{}{}", head.to_ascii_uppercase(), rest.to_ascii_lowercase())
}

/// Normalised legal references grouped by category.
///
/// Each category list is sorted by statute order and free of duplicates.
/// Identifiers are prefixed, so identifiers from different categories never
/// collide when sets are compared as a whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntitySet {
    #[serde(rename = "IPC_Sections")]
    ipc: Vec<String>,
    #[serde(rename = "CrPC_Sections")]
    crpc: Vec<String>,
    #[serde(rename = "Constitutional_Articles")]
    articles: Vec<String>,
    #[serde(rename = "Acts_Referenced")]
    acts: Vec<String>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from the bare per-category fields stored on a precedent.
    pub fn from_fields(
        ipc: &[String],
        crpc: &[String],
        articles: &[String],
        acts: &[String],
    ) -> Self {
        let mut set = Self::new();
        for (category, values) in [
            (EntityCategory::Ipc, ipc),
            (EntityCategory::Crpc, crpc),
            (EntityCategory::Article, articles),
            (EntityCategory::Act, acts),
        ] {
            for value in values.iter().filter(|v| !v.trim().is_empty()) {
                set.insert(category, &category.identifier(value));
            }
        }
        set
    }

    fn list_mut(&mut self, category: EntityCategory) -> &mut Vec<String> {
        match category {
            EntityCategory::Ipc => &mut self.ipc,
            EntityCategory::Crpc => &mut self.crpc,
            EntityCategory::Article => &mut self.articles,
            EntityCategory::Act => &mut self.acts,
        }
    }

    /// Insert an already-normalised identifier, keeping the category sorted.
    pub fn insert(&mut self, category: EntityCategory, identifier: &str) {
        let list = self.list_mut(category);
        let key = identifier_key(identifier);
        match list.binary_search_by(|probe| {
            identifier_key(probe)
                .cmp(&key)
                .then_with(|| probe.as_str().cmp(identifier))
        }) {
            Ok(_) => {}
            Err(pos) => list.insert(pos, identifier.to_string()),
        }
    }

    pub fn get(&self, category: EntityCategory) -> &[String] {
        match category {
            EntityCategory::Ipc => &self.ipc,
            EntityCategory::Crpc => &self.crpc,
            EntityCategory::Article => &self.articles,
            EntityCategory::Act => &self.acts,
        }
    }

    pub fn ipc(&self) -> &[String] {
        &self.ipc
    }

    pub fn crpc(&self) -> &[String] {
        &self.crpc
    }

    pub fn articles(&self) -> &[String] {
        &self.articles
    }

    pub fn acts(&self) -> &[String] {
        &self.acts
    }

    /// Every identifier across all categories.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        EntityCategory::ALL
            .into_iter()
            .flat_map(move |c| self.get(c).iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.ipc.len() + self.crpc.len() + self.articles.len() + self.acts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifiers of `category` present in both sets, in statute order.
    pub fn intersection(&self, other: &EntitySet, category: EntityCategory) -> Vec<String> {
        let theirs: BTreeSet<&str> = other.get(category).iter().map(String::as_str).collect();
        self.get(category)
            .iter()
            .filter(|id| theirs.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Identifiers of `category` present in `self` but not in `other`.
    pub fn difference(&self, other: &EntitySet, category: EntityCategory) -> Vec<String> {
        let theirs: BTreeSet<&str> = other.get(category).iter().map(String::as_str).collect();
        self.get(category)
            .iter()
            .filter(|id| !theirs.contains(id.as_str()))
            .cloned()
            .collect()
    }

    /// Jaccard index over all identifiers of both sets.
    ///
    /// Defined as 0.0 when `self` (the query side) is empty or the union is empty.
    pub fn jaccard(&self, other: &EntitySet) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let ours: BTreeSet<&str> = self.iter().collect();
        let theirs: BTreeSet<&str> = other.iter().collect();
        let union = ours.union(&theirs).count();
        if union == 0 {
            return 0.0;
        }
        let common = ours.intersection(&theirs).count();
        common as f64 / union as f64
    }
}

/// Extracts legal references from free text.
///
/// Implementations must be pure: the same text always yields the same set.
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> EntitySet;
}

fn compile(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("valid regex")
}

static IPC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bIPC\s+(?:Section\s+)?(\d+[A-Za-z]?)",
        r"\bSection\s+(\d+[A-Za-z]?)\s+(?:of\s+)?(?:the\s+)?(?:Indian\s+Penal\s+Code|IPC)\b",
        r"(?:Indian\s+Penal\s+Code|I\.P\.C\.?)\s+(\d+[A-Za-z]?)",
        r"\bu/s\s+(\d+[A-Za-z]?)\s+IPC\b",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

static CRPC_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bCrPC\s+(?:Section\s+)?(\d+[A-Za-z]?)",
        concat!(
            r"\bSection\s+(\d+[A-Za-z]?)\s+(?:of\s+)?(?:the\s+)?",
            r"(?:Cr\.?P\.?C\.?|Code\s+of\s+Criminal\s+Procedure)",
        ),
        r"\bCr\.?P\.?C\.?\s+(\d+[A-Za-z]?)",
        r"\bu/s\s+(\d+[A-Za-z]?)\s+CrPC\b",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

static ARTICLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bArticle\s+(\d+[A-Za-z]?(?:\(\d+\)(?:\([a-z]\))?)?)",
        r"\bArt\.\s*(\d+[A-Za-z]?)",
    ]
    .into_iter()
    .map(compile)
    .collect()
});

/// Named Acts: (pattern, canonical name). A year captured in group 1 is appended.
static ACT_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\bPrevention\s+of\s+Corruption\s+Act\b", "Prevention of Corruption Act"),
        (r"\bPOCSO\s+Act\b", "POCSO Act"),
        (r"\bDowry\s+Prohibition\s+Act\b", "Dowry Prohibition Act"),
        (r"\bMotor\s+Vehicles\s+Act\b", "Motor Vehicles Act"),
        (r"\bIndustrial\s+Disputes\s+Act(?:,?\s+(\d{4}))?", "Industrial Disputes Act"),
        (r"\bInformation\s+Technology\s+Act\b", "Information Technology Act"),
        (r"\bEnvironment\s+Protection\s+Act(?:,?\s+(\d{4}))?", "Environment Protection Act"),
        (r"\bForest\s+Rights\s+Act(?:,?\s+(\d{4}))?", "Forest Rights Act"),
        (r"\bMines\s+and\s+Minerals\s+Act\b", "Mines and Minerals Act"),
        (r"\bHindu\s+Marriage\s+Act\b", "Hindu Marriage Act"),
        (
            r"\bRights\s+of\s+Persons\s+with\s+Disabilities\s+Act(?:,?\s+(\d{4}))?",
            "Rights of Persons with Disabilities Act",
        ),
        (
            r"\bPrevention\s+of\s+Money\s+Laundering\s+Act\b",
            "Prevention of Money Laundering Act",
        ),
        (r"\bRERA\b", "RERA"),
        (r"\bPOSH\s+Act\b", "POSH Act"),
    ]
    .into_iter()
    .map(|(pattern, name)| (compile(pattern), name))
    .collect()
});

static TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*(\d{4})$").expect("valid regex"));

/// Canonical name for a matched Act; a captured year is appended without a comma.
fn act_identifier(name: &str, caps: &regex::Captures<'_>) -> String {
    match caps.get(1) {
        Some(year) => format!("{name} {}", year.as_str()),
        None => name.to_string(),
    }
}

/// Canonical form of an Act name as written in a precedent field.
///
/// Names the extractor knows map to the same identifier it produces. Other
/// names are whitespace-collapsed with any comma before a trailing year dropped.
pub fn canonical_act(value: &str) -> String {
    for (pattern, name) in ACT_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(value) {
            return act_identifier(name, &caps);
        }
    }
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    TRAILING_YEAR.replace(&collapsed, " $1").into_owned()
}

/// Rule-based extractor for Indian statutory references.
///
/// Recognises the common citation shapes: "IPC 302", "Section 302 IPC",
/// "Section 302 of the Indian Penal Code", "u/s 302 IPC", "Cr.P.C. 154",
/// "Article 19(1)(g)", "Art. 21", plus a fixed list of frequently cited Acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexEntityExtractor;

impl RegexEntityExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl EntityExtractor for RegexEntityExtractor {
    fn extract(&self, text: &str) -> EntitySet {
        let mut set = EntitySet::new();
        for (category, patterns) in [
            (EntityCategory::Ipc, &*IPC_PATTERNS),
            (EntityCategory::Crpc, &*CRPC_PATTERNS),
            (EntityCategory::Article, &*ARTICLE_PATTERNS),
        ] {
            for pattern in patterns {
                for caps in pattern.captures_iter(text) {
                    if let Some(number) = caps.get(1) {
                        set.insert(category, &category.identifier(number.as_str()));
                    }
                }
            }
        }
        for (pattern, name) in ACT_PATTERNS.iter() {
            for caps in pattern.captures_iter(text) {
                set.insert(EntityCategory::Act, &act_identifier(name, &caps));
            }
        }
        set
    }
}

/// Split a comma-joined section field ("302, 201,34") into bare identifiers.
pub fn split_field(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip the category prefix from a normalised identifier ("IPC 302" → "302").
pub fn bare_number(identifier: &str) -> &str {
    for category in EntityCategory::ALL {
        if let Some(prefix) = category.prefix() {
            if let Some(rest) = identifier.strip_prefix(prefix) {
                if let Some(rest) = rest.strip_prefix(' ') {
                    return rest;
                }
            }
        }
    }
    identifier
}

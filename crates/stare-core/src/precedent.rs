//! Precedent records as they arrive from corpus files, and the validated
//! immutable [`Precedent`] held by a corpus snapshot.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::entities::{EntitySet, split_field};

#[derive(Debug, Error, PartialEq)]
pub enum PrecedentError {
    #[error("precedent record has an empty id")]
    EmptyId,

    #[error("precedent {id} has no embedding")]
    MissingEmbedding { id: String },

    #[error("precedent {id} has a non-finite embedding component")]
    NonFiniteEmbedding { id: String },
}

/// A precedent as serialised in JSON corpus files.
///
/// Field aliases accept the column names used by the published judgment
/// datasets (`case_id`, `case_title`, `case_text`, `judgment_outcome`).
/// Section fields accept either a JSON array or a comma-joined string
/// such as `"302,201,34"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrecedentRecord {
    #[serde(alias = "case_id")]
    pub id: String,
    #[serde(alias = "case_title", default)]
    pub title: String,
    #[serde(default)]
    pub court: String,
    #[serde(default)]
    pub year: i32,
    #[serde(alias = "case_text", alias = "facts", default)]
    pub text: String,
    #[serde(default, deserialize_with = "sections")]
    pub ipc_sections: Vec<String>,
    #[serde(default, deserialize_with = "sections")]
    pub crpc_sections: Vec<String>,
    #[serde(alias = "articles", default, deserialize_with = "sections")]
    pub constitutional_articles: Vec<String>,
    #[serde(alias = "acts_referenced", default, deserialize_with = "sections")]
    pub acts: Vec<String>,
    #[serde(alias = "judgment_outcome", default)]
    pub outcome: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SectionItem {
    Text(String),
    Number(i64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SectionsField {
    Joined(String),
    List(Vec<SectionItem>),
}

fn sections<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let field: Option<SectionsField> = Option::deserialize(deserializer)?;
    Ok(match field {
        None => Vec::new(),
        Some(SectionsField::Joined(joined)) => split_field(&joined),
        Some(SectionsField::List(items)) => items
            .into_iter()
            .map(|item| match item {
                SectionItem::Text(s) => s.trim().to_string(),
                SectionItem::Number(n) => n.to_string(),
            })
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

/// A validated prior judgment. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Precedent {
    id: String,
    title: String,
    court: String,
    year: i32,
    text: String,
    ipc_sections: Vec<String>,
    crpc_sections: Vec<String>,
    constitutional_articles: Vec<String>,
    acts: Vec<String>,
    outcome: String,
    source: String,
    embedding: Vec<f32>,
    entities: EntitySet,
}

impl Precedent {
    /// Validate a record. Requires a non-empty id and a finite embedding.
    pub fn from_record(record: PrecedentRecord) -> Result<Self, PrecedentError> {
        let id = record.id.trim().to_string();
        if id.is_empty() {
            return Err(PrecedentError::EmptyId);
        }
        let embedding = match record.embedding {
            Some(e) if !e.is_empty() => e,
            _ => return Err(PrecedentError::MissingEmbedding { id }),
        };
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(PrecedentError::NonFiniteEmbedding { id });
        }

        let entities = EntitySet::from_fields(
            &record.ipc_sections,
            &record.crpc_sections,
            &record.constitutional_articles,
            &record.acts,
        );

        Ok(Self {
            id,
            title: record.title,
            court: record.court.trim().to_string(),
            year: record.year,
            text: record.text,
            ipc_sections: record.ipc_sections,
            crpc_sections: record.crpc_sections,
            constitutional_articles: record.constitutional_articles,
            acts: record.acts,
            outcome: record.outcome.trim().to_string(),
            source: record.source,
            embedding,
            entities,
        })
    }

    /// Convert back to the serialisable record form.
    pub fn to_record(&self) -> PrecedentRecord {
        PrecedentRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            court: self.court.clone(),
            year: self.year,
            text: self.text.clone(),
            ipc_sections: self.ipc_sections.clone(),
            crpc_sections: self.crpc_sections.clone(),
            constitutional_articles: self.constitutional_articles.clone(),
            acts: self.acts.clone(),
            outcome: self.outcome.clone(),
            source: self.source.clone(),
            embedding: Some(self.embedding.clone()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn court(&self) -> &str {
        &self.court
    }

    /// Decision year; 0 when unknown.
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn ipc_sections(&self) -> &[String] {
        &self.ipc_sections
    }

    pub fn crpc_sections(&self) -> &[String] {
        &self.crpc_sections
    }

    pub fn constitutional_articles(&self) -> &[String] {
        &self.constitutional_articles
    }

    pub fn acts(&self) -> &[String] {
        &self.acts
    }

    pub fn outcome(&self) -> &str {
        &self.outcome
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn dim(&self) -> usize {
        self.embedding.len()
    }

    /// Normalised entity set built from the section fields.
    pub fn entities(&self) -> &EntitySet {
        &self.entities
    }
}

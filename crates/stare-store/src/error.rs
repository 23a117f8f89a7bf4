use stare_core::PrecedentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corpus file not found: {0}")]
    FileNotFound(std::path::PathBuf),

    #[error("unsupported corpus format: {0} (expected .parquet or .json)")]
    UnsupportedFormat(std::path::PathBuf),

    #[error("precedent record has an empty id")]
    EmptyId,

    #[error("precedent {id} has no embedding")]
    MissingEmbedding { id: String },

    #[error("precedent {id} has an invalid embedding")]
    InvalidEmbedding { id: String },

    #[error("precedent {id} has embedding dimension {found}, expected {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("duplicate precedent id: {0}")]
    DuplicateId(String),

    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("precedent not found: {0}")]
    NotFound(String),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<PrecedentError> for StoreError {
    fn from(err: PrecedentError) -> Self {
        match err {
            PrecedentError::EmptyId => StoreError::EmptyId,
            PrecedentError::MissingEmbedding { id } => StoreError::MissingEmbedding { id },
            PrecedentError::NonFiniteEmbedding { id } => StoreError::InvalidEmbedding { id },
        }
    }
}

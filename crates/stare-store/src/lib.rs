//! Storage layer: immutable corpus snapshots, Parquet/JSON corpus files, TF-IDF lexical index.

mod error;
pub use error::StoreError;

pub mod corpus;
pub mod json;
pub mod lexical;
pub mod parquet;

pub use corpus::{Corpus, CorpusHandle, CorpusStats};
pub use lexical::{LexicalIndex, SparseVector};

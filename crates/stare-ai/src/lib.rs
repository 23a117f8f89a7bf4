//! Inference layer: frozen embedding models and semantic similarity scoring.

pub mod embedder;
pub mod hashing;
pub mod semantic;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;

pub use embedder::Embedder;
pub use hashing::{DEFAULT_HASH_DIM, HashEmbedder};
pub use semantic::{SemanticError, SemanticScorer, cosine_similarity};

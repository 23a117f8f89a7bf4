//! Feature-hashing embedder.
//!
//! Projects cleaned unigram and bigram features into a fixed number of
//! buckets with a signed FNV-1a hash, then L2-normalises. No model files,
//! fully deterministic across platforms and runs, so it serves offline
//! corpora and tests. Captures shared vocabulary, not paraphrase.

use stare_core::text::{clean_text, terms};

use crate::embedder::{Embedder, normalize};

pub const DEFAULT_HASH_DIM: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    /// Create an embedder with `dim` buckets (minimum 8).
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(8) }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        let cleaned = clean_text(text);
        let tokens = terms(&cleaned);

        let mut add = |feature: &str, weight: f32| {
            let hash = fnv1a(feature.as_bytes());
            let index = (hash % self.dim as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            vector[index] += sign * weight;
        };

        for token in &tokens {
            add(token, 1.0);
        }
        for pair in tokens.windows(2) {
            add(&format!("{} {}", pair[0], pair[1]), 0.5);
        }

        normalize(&mut vector);
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIM)
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "feature-hash"
    }

    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

//! The frozen embedding function.

/// A frozen text embedding model: a pure function from text to a fixed-dimension vector.
///
/// Implementations must be deterministic and safe to call from many threads
/// at once. The same model must embed the corpus and the queries scored
/// against it.
pub trait Embedder: Send + Sync {
    /// Output dimensionality.
    fn dim(&self) -> usize;

    /// Short identifier recorded in logs.
    fn name(&self) -> &str;

    /// Embed a single text.
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut out = self.embed_batch(&[text])?;
        out.pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }

    /// Embed a batch of texts, one vector per input in input order.
    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// L2-normalize a vector in place.
pub(crate) fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

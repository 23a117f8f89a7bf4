//! ONNX Runtime sentence embedder.
//!
//! Mean-pooled embeddings from a sentence-transformers export such as
//! all-MiniLM-L6-v2 (384 dimensions). The model directory must contain
//! `model.onnx` and `tokenizer.json`.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::embedder::{Embedder, normalize};

/// Token limit; longer judgments are truncated.
const MAX_TOKENS: usize = 256;

/// Sentence embedder backed by an ONNX Runtime session.
///
/// `Session::run` needs exclusive access, so the session sits behind a
/// mutex; the tokenizer is shared freely.
pub struct OnnxEmbedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dim: usize,
    name: String,
}

impl OnnxEmbedder {
    /// Load a model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(384);

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            ..Default::default()
        }));

        let name = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());

        info!(dim, model = %model_path.display(), "loaded embedding model");
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dim,
            name,
        })
    }
}

impl Embedder for OnnxEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        let inputs = BatchInputs::from_encodings(&encodings);
        let shape = [inputs.rows as i64, inputs.width as i64];
        let mask_data = inputs.mask.clone().into_boxed_slice();

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("embedding session poisoned"))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => Tensor::from_array((shape, inputs.ids.into_boxed_slice()))?,
            "attention_mask" => Tensor::from_array((shape, mask_data))?,
            "token_type_ids" => Tensor::from_array((shape, inputs.type_ids.into_boxed_slice()))?,
        ])?;

        // Token states: [rows, tokens, dim].
        let (output_shape, states) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == inputs.rows && dims[2] as usize == self.dim,
            "model output shape {dims:?} does not match [{}, _, {}]",
            inputs.rows,
            self.dim
        );
        let tokens = dims[1] as usize;

        Ok((0..inputs.rows)
            .map(|row| {
                let mask = &inputs.mask[row * inputs.width..][..tokens.min(inputs.width)];
                let block = &states[row * tokens * self.dim..][..tokens * self.dim];
                let mut pooled = mean_pool(block, mask, self.dim);
                normalize(&mut pooled);
                pooled
            })
            .collect())
    }
}

/// Tokenizer output padded into flat `[rows, width]` model inputs.
struct BatchInputs {
    rows: usize,
    width: usize,
    ids: Vec<i64>,
    mask: Vec<i64>,
    type_ids: Vec<i64>,
}

impl BatchInputs {
    fn from_encodings(encodings: &[tokenizers::Encoding]) -> Self {
        let rows = encodings.len();
        let width = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let mut inputs = Self {
            rows,
            width,
            ids: vec![0; rows * width],
            mask: vec![0; rows * width],
            type_ids: vec![0; rows * width],
        };
        for (row, encoding) in encodings.iter().enumerate() {
            let at = row * width;
            let columns = [
                (&mut inputs.ids, encoding.get_ids()),
                (&mut inputs.mask, encoding.get_attention_mask()),
                (&mut inputs.type_ids, encoding.get_type_ids()),
            ];
            for (target, values) in columns {
                for (j, &v) in values.iter().enumerate() {
                    target[at + j] = i64::from(v);
                }
            }
        }
        inputs
    }
}

/// Average the token states selected by the attention mask.
fn mean_pool(states: &[f32], mask: &[i64], dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dim];
    let mut weight = 0.0f32;
    for (token, &m) in states.chunks_exact(dim).zip(mask) {
        if m > 0 {
            let m = m as f32;
            for (p, v) in pooled.iter_mut().zip(token) {
                *p += v * m;
            }
            weight += m;
        }
    }
    if weight > 0.0 {
        for p in &mut pooled {
            *p /= weight;
        }
    }
    pooled
}

/// Last dimension of the model's first output, if static.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

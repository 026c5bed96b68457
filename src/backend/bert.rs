//! BERT-family encoder used both as the dense embedding model and as the
//! token-level embedding model.
//!
//! Dense embeddings are mean-pooled over the attention mask and
//! L2-normalized, matching sentence-transformer semantics. Token-level
//! embeddings are the raw last-hidden-state rows.

use anyhow::Result;
use candle_core::{DType, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, HiddenAct, DTYPE};
use tokenizers::{Encoding, Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

use super::{pick_device, resolve_model_files, RawTokenEmbedding, TextEmbedder, TokenEncoder};

pub struct BertEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: candle_core::Device,
    hidden_size: usize,
    max_positions: usize,
}

impl BertEncoder {
    /// Load a BERT encoder from a local directory or a Hub id. Slow
    /// (seconds to minutes on first download); callers go through the
    /// registry so this runs at most once per model kind.
    pub fn load(model_id: &str, use_cpu: bool) -> Result<Self> {
        let files = resolve_model_files(model_id)?;
        let device = pick_device(use_cpu)?;

        let config = std::fs::read_to_string(&files.config)?;
        let mut config: Config = serde_json::from_str(&config)?;
        config.hidden_act = HiddenAct::GeluApproximate;

        let tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(anyhow::Error::msg)?;

        let vb = if files.use_pth {
            VarBuilder::from_pth(&files.weights, DTYPE, &device)?
        } else {
            unsafe { VarBuilder::from_mmaped_safetensors(&[files.weights], DTYPE, &device)? }
        };
        let model = BertModel::load(vb, &config)?;

        Ok(Self {
            model,
            tokenizer,
            device,
            hidden_size: config.hidden_size,
            max_positions: config.max_position_embeddings,
        })
    }

    fn encode_text(&self, text: &str, max_length: usize) -> Result<Encoding> {
        let mut tokenizer = self.tokenizer.clone();
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                strategy: TruncationStrategy::LongestFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(anyhow::Error::msg)?;
        tokenizer.encode(text, true).map_err(anyhow::Error::msg)
    }

    /// Run the model; returns the last hidden state `[1, seq, hidden]` and
    /// the attention mask `[1, seq]`.
    fn forward(&self, encoding: &Encoding) -> Result<(Tensor, Tensor)> {
        let token_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = token_ids.zeros_like()?;
        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;
        Ok((hidden, attention_mask))
    }
}

impl TextEmbedder for BertEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts
            .iter()
            .map(|text| {
                let encoding = self.encode_text(text, self.max_positions)?;
                let (hidden, attention_mask) = self.forward(&encoding)?;

                // Mean pooling over non-padding positions
                let summed = hidden.sum(1)?;
                let counts = attention_mask.sum(1)?.to_dtype(hidden.dtype())?;
                let pooled = summed.broadcast_div(&counts)?;

                let normalized = normalize_l2(&pooled.to_dtype(DType::F32)?)?;
                Ok(normalized.squeeze(0)?.to_vec1::<f32>()?)
            })
            .collect()
    }
}

impl TokenEncoder for BertEncoder {
    fn encode_tokens(&self, text: &str, max_length: usize) -> Result<RawTokenEmbedding> {
        let encoding = self.encode_text(text, max_length)?;
        let (hidden, _) = self.forward(&encoding)?;
        let vectors = hidden.squeeze(0)?.to_dtype(DType::F32)?.to_vec2::<f32>()?;

        Ok(RawTokenEmbedding {
            tokens: encoding.get_tokens().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
            vectors,
            hidden_size: self.hidden_size,
        })
    }
}

fn normalize_l2(v: &Tensor) -> Result<Tensor> {
    Ok(v.broadcast_div(&v.sqr()?.sum_keepdim(1)?.sqrt()?)?)
}

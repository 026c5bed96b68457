//! Cross-encoder reranker: scores a (query, document) pair jointly.
//!
//! Loads a BERT sequence-classification checkpoint and applies the pooler
//! (dense + tanh on the CLS position) and the single-logit classification
//! head by hand, since the plain candle `BertModel` stops at the encoder.
//! Raw logits are mapped to 0-1 with a sigmoid.

use anyhow::Result;
use candle_core::{DType, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config, HiddenAct, DTYPE};
use tokenizers::{Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

use super::{pick_device, resolve_model_files, PairScorer};

/// Pair inputs longer than this are truncated by the tokenizer.
const MAX_PAIR_TOKENS: usize = 512;

pub struct CrossEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    pooler: Linear,
    classifier: Linear,
    device: candle_core::Device,
}

impl CrossEncoder {
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
        let model = BertModel::load(vb.clone(), &config)?;

        let hidden = config.hidden_size;
        let pooler = Linear::new(
            vb.get((hidden, hidden), "bert.pooler.dense.weight")?,
            Some(vb.get(hidden, "bert.pooler.dense.bias")?),
        );
        let classifier = Linear::new(
            vb.get((1, hidden), "classifier.weight")?,
            Some(vb.get(1, "classifier.bias")?),
        );

        Ok(Self {
            model,
            tokenizer,
            pooler,
            classifier,
            device,
        })
    }

    fn score_pair(&self, query: &str, document: &str) -> Result<f32> {
        let mut tokenizer = self.tokenizer.clone();
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: MAX_PAIR_TOKENS,
                strategy: TruncationStrategy::LongestFirst,
                stride: 0,
                direction: TruncationDirection::Right,
            }))
            .map_err(anyhow::Error::msg)?;
        let encoding = tokenizer
            .encode((query, document), true)
            .map_err(anyhow::Error::msg)?;

        let token_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        // Segment ids distinguish query from document in the pair encoding
        let token_type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask =
            Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        let cls = hidden.i((.., 0))?.to_dtype(DType::F32)?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logit = self
            .classifier
            .forward(&pooled)?
            .squeeze(0)?
            .squeeze(0)?
            .to_scalar::<f32>()?;

        Ok(sigmoid(logit))
    }
}

impl PairScorer for CrossEncoder {
    fn score(&self, query: &str, documents: &[String]) -> Result<Vec<f32>> {
        documents
            .iter()
            .map(|doc| self.score_pair(query, doc))
            .collect()
    }
}

/// Sigmoid normalization: maps raw logits to 0-1 range.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

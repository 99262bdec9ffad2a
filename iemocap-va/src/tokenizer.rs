//! Text tokenization for batched transcriptions.

use crate::error::{ConfigError, Result};
use crate::types::ModelRepo;
use eyre::{Result as EyreResult, WrapErr, eyre};
use ndarray::Array2;
use serde::Deserialize;
use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

/// Token ids and attention mask, both `(batch, longest)`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextEncoding {
    pub input_ids: Array2<i64>,
    /// 1 for real tokens, 0 for padding
    pub attention_mask: Array2<i64>,
}

impl TextEncoding {
    /// Right-pad token rows to the longest one.
    pub fn from_rows<'a, I>(rows: I, pad_id: u32) -> Self
    where
        I: IntoIterator<Item = (&'a [u32], &'a [u32])>,
    {
        let rows: Vec<_> = rows.into_iter().collect();
        let longest = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0);

        let mut input_ids = Array2::from_elem((rows.len(), longest), pad_id as i64);
        let mut attention_mask = Array2::<i64>::zeros((rows.len(), longest));

        for (i, (ids, mask)) in rows.into_iter().enumerate() {
            for (j, (&id, &m)) in ids.iter().zip(mask).enumerate() {
                input_ids[[i, j]] = id as i64;
                attention_mask[[i, j]] = m as i64;
            }
        }

        Self {
            input_ids,
            attention_mask,
        }
    }
}

/// Text encoder for a batch of transcriptions.
///
/// Pads to the longest sequence in the batch and truncates beyond the
/// encoder's own limit.
pub trait TextTokenizer {
    fn encode(&self, texts: &[&str]) -> Result<TextEncoding>;
}

/// Subset of a pretrained `tokenizer_config.json`.
#[derive(Debug, Default, Deserialize)]
struct TokenizerConfig {
    model_max_length: Option<usize>,
}

/// [`TextTokenizer`] backed by a HuggingFace `tokenizers` model.
#[derive(Clone, Debug)]
pub struct HfTokenizer {
    tokenizer: Tokenizer,
    pad_id: u32,
    max_length: usize,
}

impl HfTokenizer {
    /// Limit used when the pretrained config does not specify one.
    pub const DEFAULT_MAX_LENGTH: usize = 512;

    /// Configure `tokenizer` for batch-longest padding and truncation at `max_length`.
    pub fn new(mut tokenizer: Tokenizer, max_length: usize) -> Result<Self> {
        if max_length == 0 {
            return Err(ConfigError::ZeroMaxLength.into());
        }

        let padding = match tokenizer.get_padding() {
            Some(params) => params.clone(),
            None => PaddingParams {
                pad_id: tokenizer.token_to_id("[PAD]").unwrap_or(0),
                ..Default::default()
            },
        };
        let pad_id = padding.pad_id;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..padding
        }));
        tokenizer.with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))?;

        Ok(Self {
            tokenizer,
            pad_id,
            max_length,
        })
    }

    /// Load `tokenizer.json` (and `tokenizer_config.json` when present) from a repository.
    ///
    /// `max_length` overrides the pretrained `model_max_length`.
    pub fn from_repo(repo: &ModelRepo, max_length: Option<usize>) -> EyreResult<Self> {
        let path = repo.resolve("tokenizer.json")?;
        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| eyre!(e))
            .wrap_err_with(|| format!("failed to load tokenizer: {:?}", path.display()))?;

        let max_length = match max_length {
            Some(n) => n,
            None => pretrained_max_length(repo)?,
        };

        tracing::debug!(
            vocab_size = tokenizer.get_vocab_size(true),
            max_length,
            "tokenizer loaded"
        );

        Ok(Self::new(tokenizer, max_length)?)
    }

    pub fn pad_id(&self) -> u32 {
        self.pad_id
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }
}

/// `model_max_length` from `tokenizer_config.json`, if the repository has one.
fn pretrained_max_length(repo: &ModelRepo) -> EyreResult<usize> {
    let Ok(path) = repo.resolve("tokenizer_config.json") else {
        return Ok(HfTokenizer::DEFAULT_MAX_LENGTH);
    };

    let json = std::fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read tokenizer config: {:?}", path.display()))?;
    let config: TokenizerConfig =
        serde_json::from_str(&json).wrap_err("failed to parse tokenizer config")?;

    // Some configs carry a huge sentinel instead of a real limit
    Ok(config
        .model_max_length
        .filter(|&n| n > 0 && n <= 1 << 20)
        .unwrap_or(HfTokenizer::DEFAULT_MAX_LENGTH))
}

impl TextTokenizer for HfTokenizer {
    fn encode(&self, texts: &[&str]) -> Result<TextEncoding> {
        let encodings = self.tokenizer.encode_batch(texts.to_vec(), true)?;

        Ok(TextEncoding::from_rows(
            encodings
                .iter()
                .map(|e| (e.get_ids(), e.get_attention_mask())),
            self.pad_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const WORD_LEVEL: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": { "[PAD]": 0, "[UNK]": 1, "excuse": 2, "me": 3, "yeah": 4 },
            "unk_token": "[UNK]"
        }
    }"#;

    fn tokenizer(max_length: usize) -> HfTokenizer {
        HfTokenizer::new(Tokenizer::from_str(WORD_LEVEL).unwrap(), max_length).unwrap()
    }

    #[test]
    fn pads_to_batch_longest() {
        let enc = tokenizer(512).encode(&["excuse me", "yeah"]).unwrap();

        assert_eq!(enc.input_ids.dim(), (2, 2));
        assert_eq!(enc.input_ids.row(0).to_vec(), [2, 3]);
        assert_eq!(enc.input_ids.row(1).to_vec(), [4, 0]);
        assert_eq!(enc.attention_mask.row(1).to_vec(), [1, 0]);
    }

    #[test]
    fn truncates_at_max_length() {
        let enc = tokenizer(2).encode(&["excuse me yeah me"]).unwrap();

        assert_eq!(enc.input_ids.dim(), (1, 2));
        assert_eq!(enc.attention_mask.sum(), 2);
    }

    #[test]
    fn unknown_words_map_to_unk() {
        let enc = tokenizer(512).encode(&["hello"]).unwrap();

        assert_eq!(enc.input_ids.row(0).to_vec(), [1]);
    }

    #[test]
    fn rejects_zero_max_length() {
        let tokenizer = Tokenizer::from_str(WORD_LEVEL).unwrap();

        assert!(HfTokenizer::new(tokenizer, 0).is_err());
    }

    #[test]
    fn pads_ragged_rows() {
        let ids: [&[u32]; 2] = [&[5, 6, 7], &[8]];
        let masks: [&[u32]; 2] = [&[1, 1, 1], &[1]];

        let enc = TextEncoding::from_rows(ids.into_iter().zip(masks), 9);

        assert_eq!(enc.input_ids.row(1).to_vec(), [8, 9, 9]);
        assert_eq!(enc.attention_mask.row(1).to_vec(), [1, 0, 0]);
    }
}

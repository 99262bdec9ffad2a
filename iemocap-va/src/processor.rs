//! Raw waveform processor for batched audio input.

use crate::error::{ConfigError, EncodingError, Result};
use crate::types::ModelRepo;
use eyre::{Result as EyreResult, WrapErr};
use ndarray::{Array2, ArrayView1, s};
use serde::Deserialize;

/// Small constant added to the variance before normalization.
const NORM_EPSILON: f64 = 1e-7;

/// Padded audio values with their attention mask, both `(batch, max_length)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioEncoding {
    pub input_values: Array2<f32>,
    /// 1 for real samples, 0 for padding
    pub attention_mask: Array2<i64>,
}

/// Padding and truncation settings for one batched call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioPadding {
    pub max_length: usize,
    pub truncation: bool,
}

impl AudioPadding {
    /// Pad or truncate every sequence to exactly `max_length`.
    pub fn max_length(max_length: usize) -> Self {
        Self {
            max_length,
            truncation: true,
        }
    }
}

/// Audio encoder turning a list of raw sequences into fixed-shape input.
pub trait AudioProcessor {
    /// Sampling rate the processor expects, in Hz.
    fn sampling_rate(&self) -> u32;

    /// Pad (and optionally truncate) `audios` in one batched call.
    fn encode(&self, audios: &[ArrayView1<'_, f32>], padding: AudioPadding)
    -> Result<AudioEncoding>;
}

/// Settings read from a pretrained `preprocessor_config.json`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub sampling_rate: u32,
    pub padding_value: f32,
    pub do_normalize: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 16000,
            padding_value: 0.0,
            do_normalize: true,
        }
    }
}

/// Wav2Vec2-style waveform processor.
///
/// Each sequence is truncated, normalized to zero mean and unit variance over
/// its real samples when `do_normalize` is set, then right-padded with
/// `padding_value`. The attention mask is always produced.
#[derive(Clone, Debug, Default)]
pub struct WaveformProcessor {
    config: ProcessorConfig,
}

impl WaveformProcessor {
    pub const CONFIG_FILE: &'static str = "preprocessor_config.json";

    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    /// Load processor settings from a model repository.
    pub fn from_repo(repo: &ModelRepo) -> EyreResult<Self> {
        let path = repo.resolve(Self::CONFIG_FILE)?;
        let json = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("failed to read processor config: {:?}", path.display()))?;
        let config: ProcessorConfig =
            serde_json::from_str(&json).wrap_err("failed to parse processor config")?;

        tracing::debug!(?config, "audio processor loaded");

        Ok(Self::new(config))
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }
}

impl AudioProcessor for WaveformProcessor {
    fn sampling_rate(&self) -> u32 {
        self.config.sampling_rate
    }

    fn encode(
        &self,
        audios: &[ArrayView1<'_, f32>],
        padding: AudioPadding,
    ) -> Result<AudioEncoding> {
        let max_length = padding.max_length;
        if max_length == 0 {
            return Err(ConfigError::ZeroMaxLength.into());
        }

        let mut input_values =
            Array2::from_elem((audios.len(), max_length), self.config.padding_value);
        let mut attention_mask = Array2::<i64>::zeros((audios.len(), max_length));

        for (index, audio) in audios.iter().enumerate() {
            if audio.len() > max_length && !padding.truncation {
                return Err(EncodingError::ExceedsMaxLength {
                    index,
                    len: audio.len(),
                    max: max_length,
                }
                .into());
            }

            let len = audio.len().min(max_length);
            let audio = audio.slice(s![..len]);

            let mut row = input_values.slice_mut(s![index, ..len]);
            if self.config.do_normalize && len > 0 {
                let (mean, std) = mean_std(audio);
                row.zip_mut_with(&audio, |out, &x| {
                    *out = ((x as f64 - mean) / std) as f32;
                });
            } else {
                row.assign(&audio);
            }

            attention_mask.slice_mut(s![index, ..len]).fill(1);
        }

        Ok(AudioEncoding {
            input_values,
            attention_mask,
        })
    }
}

/// Mean and `sqrt(var + eps)` of a non-empty sequence.
fn mean_std(audio: ArrayView1<'_, f32>) -> (f64, f64) {
    let n = audio.len() as f64;
    let mean = audio.iter().map(|&x| x as f64).sum::<f64>() / n;
    let variance = audio
        .iter()
        .map(|&x| (x as f64 - mean).powi(2))
        .sum::<f64>()
        / n;

    (mean, (variance + NORM_EPSILON).sqrt())
}

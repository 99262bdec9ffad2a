//! iemocap-va: IEMOCAP speech + text dataset for valence/arousal regression.
//!
//! Maps pre-extracted per-utterance audio features and transcripts, joined
//! with emotion annotation, into padded batches for a training loop.
//!
//! # Architecture
//!
//! [`dataset::SplitDataset`] is a read-only view over one split. Its
//! collaborators are injected so each can be replaced:
//!
//! - [`features::FeatureStore`]: loads an utterance's audio features
//! - [`processor::AudioProcessor`]: pads/truncates audio to a fixed length
//! - [`tokenizer::TextTokenizer`]: tokenizes transcriptions to the batch-longest length
//!
//! # Dataset layout
//!
//! Under the dataset root:
//!
//! - `split/IEMOCAP/annotation.csv`: transcriptions keyed by `wav_file_name`
//! - `split/IEMOCAP/{train,valid,test}.csv`: one-hot category membership
//! - `feature/IEMOCAP/npy/<fname>.npy`: per-utterance audio features
//! - `split/IEMOCAP/va_map.json`: category to `[valence, arousal]` pairs
//!
//! The corpus does not ship `va_map.json`. Write it next to the split tables
//! or point [`config::DatasetConfig::va_map`] (`--va-map` on the CLI) at
//! another file; [`dataset::IemocapDataset::open`] fails without it.
//!
//! # Quick Start
//!
//! ```ignore
//! use iemocap_va::config::{DatasetConfig, PROCESSOR_ID, TOKENIZER_ID};
//! use iemocap_va::dataset::IemocapDataset;
//! use iemocap_va::split::Split;
//! use iemocap_va::types::ModelRepo;
//!
//! let config = DatasetConfig::new(
//!     "/data/clsreg",
//!     ModelRepo::api(TOKENIZER_ID)?,
//!     ModelRepo::api(PROCESSOR_ID)?,
//! );
//! let dataset = IemocapDataset::open(&config, Split::Train)?;
//!
//! let samples = [dataset.get(0)?, dataset.get(1)?];
//! let batch = dataset.collate(&samples)?;
//! println!("{:?}", batch.audios.dim());
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod loader;
pub mod processor;
pub mod split;
pub mod table;
pub mod tokenizer;
pub mod types;
pub mod va;

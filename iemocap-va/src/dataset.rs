//! Split dataset: per-item lookup and batch collation.

use crate::config::{DatasetConfig, MAX_AUDIO_SECS};
use crate::error::{EncodingError, LookupError, Result};
use crate::features::{FeatureStore, NpyFeatureStore};
use crate::loader::Batches;
use crate::processor::{AudioPadding, AudioProcessor, WaveformProcessor};
use crate::split::{Split, SplitIndex};
use crate::table::AnnotationTable;
use crate::tokenizer::{HfTokenizer, TextTokenizer};
use crate::va::{VaMap, ValenceArousal};
use eyre::{Result as EyreResult, WrapErr};
use ndarray::{Array2, ArrayD, Ix1};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;

/// One utterance: filename, target, audio features and transcription.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub fname: String,
    pub va: ValenceArousal,
    pub audio: ArrayD<f32>,
    pub text: String,
}

/// Collated batch. Every field has the batch size as its leading dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch {
    /// `(batch, max_audio_len)` padded or truncated audio
    pub audios: Array2<f32>,
    pub audio_mask: Array2<i64>,
    /// `(batch, longest)` token ids
    pub token: Array2<i64>,
    pub token_mask: Array2<i64>,
    pub fnames: Vec<String>,
    /// `(batch, 2)` valence and arousal
    pub va: Array2<f32>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.fnames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fnames.is_empty()
    }
}

/// Read-only view over one split of the corpus.
///
/// Generic over the feature store, audio processor and text tokenizer so each
/// can be swapped independently; [`IemocapDataset`] is the on-disk variant.
#[derive(Debug)]
pub struct SplitDataset<F, A, T> {
    index: SplitIndex,
    annotations: AnnotationTable,
    va_map: VaMap,
    features: F,
    processor: A,
    tokenizer: T,
    max_audio_len: usize,
}

/// Dataset reading `.npy` features with pretrained encoders.
pub type IemocapDataset = SplitDataset<NpyFeatureStore, WaveformProcessor, HfTokenizer>;

impl<F, A, T> SplitDataset<F, A, T>
where
    F: FeatureStore,
    A: AudioProcessor,
    T: TextTokenizer,
{
    /// Assemble a dataset from its parts.
    ///
    /// The audio cap is the processor's sampling rate times 16 seconds.
    pub fn new(
        index: SplitIndex,
        annotations: AnnotationTable,
        va_map: VaMap,
        features: F,
        processor: A,
        tokenizer: T,
    ) -> Self {
        let max_audio_len = processor.sampling_rate() as usize * MAX_AUDIO_SECS;

        Self {
            index,
            annotations,
            va_map,
            features,
            processor,
            tokenizer,
            max_audio_len,
        }
    }

    /// Override the audio cap, in seconds.
    pub fn with_max_audio_secs(mut self, secs: usize) -> Self {
        self.max_audio_len = self.processor.sampling_rate() as usize * secs;
        self
    }

    pub fn split(&self) -> Split {
        self.index.split()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Fixed length every audio sequence is padded or truncated to.
    pub fn max_audio_len(&self) -> usize {
        self.max_audio_len
    }

    pub fn index(&self) -> &SplitIndex {
        &self.index
    }

    /// Sample at `index`.
    pub fn get(&self, index: usize) -> Result<Sample> {
        let row = self.index.get(index).ok_or(LookupError::IndexOutOfBounds {
            index,
            len: self.len(),
        })?;

        let fname = row.fname();
        let category = row.category()?;
        let va = self.va_map.get(category)?;
        let text = self.annotations.transcription(fname)?;
        let audio = self.features.load(fname)?;

        tracing::trace!(index, fname, category, "sample loaded");

        Ok(Sample {
            fname: fname.to_string(),
            va,
            audio,
            text: text.to_string(),
        })
    }

    /// Collate samples into a [`Batch`], preserving their order.
    pub fn collate(&self, samples: &[Sample]) -> Result<Batch> {
        if samples.is_empty() {
            return Err(EncodingError::EmptyBatch.into());
        }

        let audios = samples
            .iter()
            .enumerate()
            .map(|(index, sample)| {
                sample
                    .audio
                    .view()
                    .into_dimensionality::<Ix1>()
                    .map_err(|_| EncodingError::AudioRank {
                        index,
                        ndim: sample.audio.ndim(),
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let texts: Vec<&str> = samples.iter().map(|s| s.text.as_str()).collect();
        let fnames: Vec<String> = samples.iter().map(|s| s.fname.clone()).collect();

        let audio = self
            .processor
            .encode(&audios, AudioPadding::max_length(self.max_audio_len))?;
        let text = self.tokenizer.encode(&texts)?;

        let va = Array2::from_shape_fn((samples.len(), 2), |(i, j)| {
            samples[i].va.to_array()[j]
        });

        tracing::trace!(
            batch_size = samples.len(),
            text_len = text.input_ids.ncols(),
            "batch collated"
        );

        Ok(Batch {
            audios: audio.input_values,
            audio_mask: audio.attention_mask,
            token: text.input_ids,
            token_mask: text.attention_mask,
            fnames,
            va,
        })
    }

    /// Samples in index order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Sample>> + '_ {
        (0..self.len()).map(|index| self.get(index))
    }

    /// Collated batches in index order; the last one may be short.
    pub fn batches(&self, batch_size: NonZeroUsize) -> Batches<'_, F, A, T> {
        Batches::new(self, batch_size)
    }

    /// Number of rows per arg-max category.
    pub fn category_counts(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for row in self.index.rows() {
            *counts.entry(row.category()?.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

impl IemocapDataset {
    /// Open `split` from the dataset root and pretrained encoder sources.
    pub fn open(config: &DatasetConfig, split: Split) -> EyreResult<Self> {
        tracing::debug!(root = ?config.root().display(), %split, "opening dataset");

        let annotation_path = config.annotation_path();
        let annotations = AnnotationTable::from_path(&annotation_path).wrap_err_with(|| {
            format!("failed to load annotations: {:?}", annotation_path.display())
        })?;

        let index = SplitIndex::load(&config.split_dir(), split)
            .wrap_err_with(|| format!("failed to load {split} split"))?;

        let va_map_path = config.va_map_path();
        let va_map = VaMap::from_json_file(&va_map_path).wrap_err_with(|| {
            format!("failed to load valence-arousal map: {:?}", va_map_path.display())
        })?;

        let features = NpyFeatureStore::new(config.feature_dir());
        let processor = WaveformProcessor::from_repo(&config.processor)?;
        let tokenizer = HfTokenizer::from_repo(&config.tokenizer, config.text_max_length)?;

        let dataset = Self::new(index, annotations, va_map, features, processor, tokenizer)
            .with_max_audio_secs(config.max_audio_secs);

        tracing::info!(
            %split,
            len = dataset.len(),
            annotations = dataset.annotations.len(),
            max_audio_len = dataset.max_audio_len(),
            "dataset ready"
        );

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::table::SplitTable;
    use crate::tokenizer::TextEncoding;
    use ndarray::{Array1, IxDyn};
    use std::collections::HashMap;

    /// Features kept in memory, already squeezed.
    struct MemoryFeatures(HashMap<String, ArrayD<f32>>);

    impl FeatureStore for MemoryFeatures {
        fn load(&self, fname: &str) -> Result<ArrayD<f32>> {
            self.0.get(fname).cloned().ok_or_else(|| {
                LookupError::MissingFeature {
                    path: fname.into(),
                }
                .into()
            })
        }
    }

    /// One token per character.
    struct CharTokenizer;

    impl TextTokenizer for CharTokenizer {
        fn encode(&self, texts: &[&str]) -> Result<TextEncoding> {
            let ids: Vec<Vec<u32>> = texts
                .iter()
                .map(|t| t.chars().map(|c| c as u32).collect())
                .collect();
            let masks: Vec<Vec<u32>> = ids.iter().map(|row| vec![1; row.len()]).collect();

            Ok(TextEncoding::from_rows(
                ids.iter().map(Vec::as_slice).zip(masks.iter().map(Vec::as_slice)),
                0,
            ))
        }
    }

    type TestDataset = SplitDataset<MemoryFeatures, WaveformProcessor, CharTokenizer>;

    fn dataset() -> TestDataset {
        let table = SplitTable::from_reader(
            ",Happy,Sad,Neutral\na.wav,1,0,0\nb.wav,0,1,0\nc.wav,0,0,1\n".as_bytes(),
        )
        .unwrap();
        let index = SplitIndex::from_tables(Split::Train, [table]);

        let annotations: AnnotationTable =
            [("a.wav", "hi"), ("b.wav", "oh no"), ("c.wav", "ok")]
                .into_iter()
                .collect();

        let va_map: VaMap = [
            ("Happy", [0.8f32, 0.6]),
            ("Sad", [-0.6, 0.3]),
            ("Neutral", [0.0, 0.0]),
        ]
        .into_iter()
        .collect();

        let features = MemoryFeatures(
            [("a.wav", 50), ("b.wav", 200), ("c.wav", 10)]
                .into_iter()
                .map(|(name, len)| (name.to_string(), Array1::from_elem(len, 0.1f32).into_dyn()))
                .collect(),
        );

        SplitDataset::new(
            index,
            annotations,
            va_map,
            features,
            WaveformProcessor::default(),
            CharTokenizer,
        )
    }

    #[test]
    fn maps_category_to_va() {
        let ds = dataset();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.get(1).unwrap().va, ValenceArousal::new(-0.6, 0.3));
        assert_eq!(ds.get(0).unwrap().text, "hi");
    }

    #[test]
    fn max_audio_len_is_sixteen_seconds() {
        assert_eq!(dataset().max_audio_len(), 256_000);
    }

    #[test]
    fn lookup_is_idempotent() {
        let ds = dataset();

        assert_eq!(ds.get(2).unwrap(), ds.get(2).unwrap());
    }

    #[test]
    fn out_of_range_index_fails() {
        let err = dataset().get(3).unwrap_err();

        assert!(matches!(
            err,
            Error::Lookup(LookupError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn collates_aligned_batch() {
        let ds = dataset();
        let samples = [ds.get(0).unwrap(), ds.get(1).unwrap()];

        let batch = ds.collate(&samples).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.audios.dim(), (2, 256_000));
        assert_eq!(batch.audio_mask.row(0).sum(), 50);
        assert_eq!(batch.audio_mask.row(1).sum(), 200);
        assert_eq!(batch.token.dim(), (2, 5));
        assert_eq!(batch.token_mask.row(0).sum(), 2);
        assert_eq!(batch.fnames, ["a.wav", "b.wav"]);
        assert_eq!(batch.va.dim(), (2, 2));
        assert_eq!(batch.va.row(1).to_vec(), [-0.6, 0.3]);
    }

    #[test]
    fn rejects_empty_batch() {
        let err = dataset().collate(&[]).unwrap_err();

        assert!(matches!(err, Error::Encoding(EncodingError::EmptyBatch)));
    }

    #[test]
    fn rejects_wrong_audio_rank() {
        let ds = dataset();
        let mut sample = ds.get(0).unwrap();
        sample.audio = ArrayD::zeros(IxDyn(&[2, 3]));

        let err = ds.collate(&[ds.get(1).unwrap(), sample]).unwrap_err();

        assert!(matches!(
            err,
            Error::Encoding(EncodingError::AudioRank { index: 1, ndim: 2 })
        ));
    }

    #[test]
    fn blank_indicator_row_fails_lookup() {
        let table = SplitTable::from_reader(",Happy,Sad\na.wav,,\n".as_bytes()).unwrap();
        let ds = SplitDataset::new(
            SplitIndex::from_tables(Split::Train, [table]),
            [("a.wav", "hi")].into_iter().collect(),
            [("Happy", [0.8f32, 0.6])].into_iter().collect(),
            MemoryFeatures(HashMap::new()),
            WaveformProcessor::default(),
            CharTokenizer,
        );

        assert!(matches!(
            ds.get(0).unwrap_err(),
            Error::Lookup(LookupError::UndefinedCategory { .. })
        ));
        assert!(ds.category_counts().is_err());
    }

    #[test]
    fn counts_categories() {
        let counts = dataset().category_counts().unwrap();

        assert_eq!(counts["Happy"], 1);
        assert_eq!(counts["Sad"], 1);
        assert_eq!(counts["Neutral"], 1);
    }
}

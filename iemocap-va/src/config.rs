//! Dataset location and pretrained encoder sources.

use crate::types::ModelRepo;
use std::path::{Path, PathBuf};

/// Split tables and annotation, relative to the dataset root.
pub const SPLIT_DIR: &str = "split/IEMOCAP";

/// Per-utterance `.npy` features, relative to the dataset root.
pub const FEATURE_DIR: &str = "feature/IEMOCAP/npy";

pub const ANNOTATION_FILE: &str = "annotation.csv";

pub const VA_MAP_FILE: &str = "va_map.json";

/// Audio is padded or truncated to this many seconds.
pub const MAX_AUDIO_SECS: usize = 16;

/// Pretrained text tokenizer.
pub const TOKENIZER_ID: &str = "distilbert-base-uncased";

/// Pretrained audio processor.
pub const PROCESSOR_ID: &str = "facebook/wav2vec2-base-960h";

/// Resolved dataset configuration.
#[derive(Debug)]
pub struct DatasetConfig {
    /// Dataset root containing `split/` and `feature/`
    pub root: PathBuf,
    /// Valence-arousal map override (default: `<root>/split/IEMOCAP/va_map.json`)
    pub va_map: Option<PathBuf>,
    pub tokenizer: ModelRepo,
    pub processor: ModelRepo,
    /// Text truncation override (default: the tokenizer's `model_max_length`)
    pub text_max_length: Option<usize>,
    pub max_audio_secs: usize,
}

impl DatasetConfig {
    /// Configuration with local tokenizer and processor directories.
    pub fn new(root: impl Into<PathBuf>, tokenizer: ModelRepo, processor: ModelRepo) -> Self {
        Self {
            root: root.into(),
            va_map: None,
            tokenizer,
            processor,
            text_max_length: None,
            max_audio_secs: MAX_AUDIO_SECS,
        }
    }

    pub fn split_dir(&self) -> PathBuf {
        self.root.join(SPLIT_DIR)
    }

    pub fn annotation_path(&self) -> PathBuf {
        self.split_dir().join(ANNOTATION_FILE)
    }

    pub fn feature_dir(&self) -> PathBuf {
        self.root.join(FEATURE_DIR)
    }

    pub fn va_map_path(&self) -> PathBuf {
        self.va_map
            .clone()
            .unwrap_or_else(|| self.split_dir().join(VA_MAP_FILE))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

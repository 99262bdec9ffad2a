//! Error types for iemocap-va organized by processing stage.

use ndarray_npy::{ReadNpyError, ViewNpyError};
use ndarray_stats::errors::EmptyInput;
use std::path::PathBuf;
use thiserror::Error;

/// Dataset error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration stage error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Tabular source loading error
    #[error(transparent)]
    Table(#[from] TableError),

    /// Per-item lookup error
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// Batch encoding error
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// Tokenizer error
    #[error(transparent)]
    Tokenizers(tokenizers::Error),
}

/// Configuration errors (split names, mapping files, encoder settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Split name outside TRAIN / VALID / TEST / ALL
    #[error("unknown split: {0:?} (expected TRAIN, VALID, TEST or ALL)")]
    UnknownSplit(String),

    /// Valence-arousal mapping could not be parsed
    #[error("invalid valence-arousal map: {0}")]
    InvalidVaMap(#[from] serde_json::Error),

    /// Maximum length of zero for an encoder
    #[error("max length must be positive")]
    ZeroMaxLength,
}

/// Errors raised while reading annotation and split-membership tables.
#[derive(Debug, Error)]
pub enum TableError {
    /// Required column missing from the header
    #[error("missing column {column:?} in {table}")]
    MissingColumn { table: &'static str, column: &'static str },

    /// Split table without any category column
    #[error("split table has no category columns")]
    NoCategories,

    /// Same key appears twice in the annotation table
    #[error("duplicate annotation for {0:?}")]
    DuplicateKey(String),

    /// Indicator cell that is not numeric
    #[error("invalid indicator {value:?} at row {row}, column {column:?}")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    /// CSV format or IO error
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Per-item lookup errors.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Index past the end of the split
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Utterance has no row in the annotation table
    #[error("no annotation for {0:?}")]
    MissingAnnotation(String),

    /// Category has no valence-arousal entry
    #[error("no valence-arousal entry for category {0:?}")]
    UnknownCategory(String),

    /// Feature blob missing on storage
    #[error("feature blob not found: {}", path.display())]
    MissingFeature { path: PathBuf },

    /// Feature blob whose leading axis is not a singleton
    #[error("expected leading singleton axis, got shape {shape:?}")]
    NotSingleton { shape: Vec<usize> },

    /// Indicator row with no comparable value
    #[error("undefined category for {fname:?}: {source}")]
    UndefinedCategory {
        fname: String,
        #[source]
        source: EmptyInput,
    },

    /// IO error during feature loading
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// `.npy` read error
    #[error(transparent)]
    ReadNpy(#[from] ReadNpyError),

    /// `.npy` zero-copy view error
    #[error(transparent)]
    ViewNpy(#[from] ViewNpyError),
}

/// Batch encoding errors (audio padding, text tokenization).
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Collation of an empty list
    #[error("cannot collate an empty batch")]
    EmptyBatch,

    /// Audio feature that is not a 1-D sequence
    #[error("audio at batch position {index} has rank {ndim}, expected 1")]
    AudioRank { index: usize, ndim: usize },

    /// Sequence longer than max length with truncation disabled
    #[error("audio at batch position {index} has {len} samples, exceeds max length {max}")]
    ExceedsMaxLength { index: usize, len: usize, max: usize },
}

/// Result type alias for iemocap-va operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// csv::Error → TableError → Error
impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Table(TableError::Csv(e))
    }
}

// std::io::Error → LookupError → Error
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Lookup(LookupError::Io(e))
    }
}

// ReadNpyError → LookupError → Error
impl From<ReadNpyError> for Error {
    fn from(e: ReadNpyError) -> Self {
        Error::Lookup(LookupError::ReadNpy(e))
    }
}

// ViewNpyError → LookupError → Error
impl From<ViewNpyError> for Error {
    fn from(e: ViewNpyError) -> Self {
        Error::Lookup(LookupError::ViewNpy(e))
    }
}

// serde_json::Error → ConfigError → Error
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(ConfigError::InvalidVaMap(e))
    }
}

impl From<tokenizers::Error> for Error {
    fn from(e: tokenizers::Error) -> Self {
        Error::Tokenizers(e)
    }
}

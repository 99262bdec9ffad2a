//! Annotation and split-membership tables.
//!
//! Both are CSV files whose first column is a row label. The annotation table
//! is keyed by its `wav_file_name` column; split tables are keyed by the label
//! column itself and carry one indicator column per emotion category.

use crate::error::{LookupError, Result, TableError};
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Transcriptions keyed by utterance filename.
#[derive(Clone, Debug, Default)]
pub struct AnnotationTable {
    transcriptions: HashMap<String, String>,
}

impl AnnotationTable {
    /// Column holding the utterance filename.
    pub const KEY_COLUMN: &'static str = "wav_file_name";
    /// Column holding the transcription text.
    pub const TEXT_COLUMN: &'static str = "transcription";

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_csv(csv::Reader::from_path(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let key = column_position(&headers, "annotation table", Self::KEY_COLUMN)?;
        let text = column_position(&headers, "annotation table", Self::TEXT_COLUMN)?;

        let mut transcriptions = HashMap::new();

        for record in reader.records() {
            let record = record?;
            let fname = record.get(key).unwrap_or_default().to_string();
            let transcription = record.get(text).unwrap_or_default().to_string();

            match transcriptions.entry(fname) {
                Entry::Occupied(entry) => {
                    return Err(TableError::DuplicateKey(entry.key().clone()).into());
                }
                Entry::Vacant(entry) => {
                    entry.insert(transcription);
                }
            }
        }

        Ok(Self { transcriptions })
    }

    /// Transcription of `fname`.
    pub fn transcription(&self, fname: &str) -> Result<&str> {
        self.transcriptions
            .get(fname)
            .map(String::as_str)
            .ok_or_else(|| LookupError::MissingAnnotation(fname.to_string()).into())
    }

    pub fn len(&self) -> usize {
        self.transcriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcriptions.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnnotationTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let transcriptions = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { transcriptions }
    }
}

fn column_position(
    headers: &csv::StringRecord,
    table: &'static str,
    column: &'static str,
) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| TableError::MissingColumn { table, column }.into())
}

/// One utterance of a split with its category indicators.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitRow {
    fname: String,
    categories: Arc<[String]>,
    indicators: Array1<f32>,
}

impl SplitRow {
    pub fn fname(&self) -> &str {
        &self.fname
    }

    /// Indicator values, aligned with [`SplitRow::categories`].
    pub fn indicators(&self) -> &Array1<f32> {
        &self.indicators
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Category of the largest indicator.
    ///
    /// Blank cells are skipped; ties resolve to the first column.
    pub fn category(&self) -> Result<&str> {
        let position = self.indicators.argmax_skipnan().map_err(|source| {
            LookupError::UndefinedCategory {
                fname: self.fname.clone(),
                source,
            }
        })?;

        Ok(&self.categories[position])
    }
}

/// Split-membership table: filename rows, one-hot category columns.
#[derive(Clone, Debug)]
pub struct SplitTable {
    categories: Arc<[String]>,
    rows: Vec<SplitRow>,
}

impl SplitTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_csv(csv::Reader::from_path(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let headers = reader.headers()?.clone();

        let categories: Arc<[String]> = headers.iter().skip(1).map(str::to_string).collect();
        if categories.is_empty() {
            return Err(TableError::NoCategories.into());
        }

        let mut rows = Vec::new();

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let fname = record.get(0).unwrap_or_default().to_string();

            let indicators = record
                .iter()
                .skip(1)
                .zip(categories.iter())
                .map(|(cell, column)| {
                    parse_indicator(cell).ok_or_else(|| TableError::InvalidCell {
                        row,
                        column: column.clone(),
                        value: cell.to_string(),
                    })
                })
                .collect::<std::result::Result<Array1<f32>, _>>()?;

            rows.push(SplitRow {
                fname,
                categories: Arc::clone(&categories),
                indicators,
            });
        }

        Ok(Self { categories, rows })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SplitRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<SplitRow> {
        self.rows
    }
}

/// Parse one indicator cell. Blank cells become NaN.
fn parse_indicator(cell: &str) -> Option<f32> {
    match cell.trim() {
        "" | "nan" | "NaN" => Some(f32::NAN),
        "True" | "true" => Some(1.0),
        "False" | "false" => Some(0.0),
        value => value.parse().ok(),
    }
}

//! Split selection and split-membership index.

use crate::error::{ConfigError, Result};
use crate::table::{SplitRow, SplitTable};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Named partition of the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Valid,
    Test,
    /// Union of TRAIN, VALID and TEST, in that order.
    All,
}

/// Leaf splits with their membership file names, in concatenation order.
static LEAF_TABLES: [(Split, &str); 3] = [
    (Split::Train, "train.csv"),
    (Split::Valid, "valid.csv"),
    (Split::Test, "test.csv"),
];

impl Split {
    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "TRAIN",
            Split::Valid => "VALID",
            Split::Test => "TEST",
            Split::All => "ALL",
        }
    }

    /// Leaf splits and membership files making up this split, in concatenation order.
    pub fn tables(self) -> &'static [(Split, &'static str)] {
        match self {
            Split::Train => &LEAF_TABLES[..1],
            Split::Valid => &LEAF_TABLES[1..2],
            Split::Test => &LEAF_TABLES[2..],
            Split::All => &LEAF_TABLES,
        }
    }
}

impl FromStr for Split {
    type Err = ConfigError;

    /// Parse a split name, ignoring ASCII case.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        [Split::Train, Split::Valid, Split::Test, Split::All]
            .into_iter()
            .find(|split| split.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownSplit(s.to_string()))
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered utterance rows belonging to a split.
///
/// Built once from the split-membership tables; immutable afterwards.
#[derive(Clone, Debug)]
pub struct SplitIndex {
    split: Split,
    rows: Vec<SplitRow>,
}

impl SplitIndex {
    /// Build an index from the membership tables of `split`, given in [`Split::tables`] order.
    pub fn from_tables(split: Split, tables: impl IntoIterator<Item = SplitTable>) -> Self {
        let rows = tables.into_iter().flat_map(SplitTable::into_rows).collect();
        Self { split, rows }
    }

    /// Load the membership tables of `split` from `split_dir`.
    pub fn load(split_dir: &Path, split: Split) -> Result<Self> {
        let tables = split
            .tables()
            .iter()
            .map(|&(part, file_name)| {
                let path = split_dir.join(file_name);

                tracing::debug!(split = %part, path = ?path.display(), "loading split table");

                SplitTable::from_path(&path)
            })
            .collect::<Result<Vec<_>>>()?;

        let index = Self::from_tables(split, tables);
        tracing::debug!(split = %split, len = index.len(), "split index ready");

        Ok(index)
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SplitRow> {
        self.rows.get(index)
    }

    pub fn rows(&self) -> &[SplitRow] {
        &self.rows
    }
}

//! Sequential batch iteration over a split.

use crate::dataset::{Batch, SplitDataset};
use crate::error::Result;
use crate::features::FeatureStore;
use crate::processor::AudioProcessor;
use crate::tokenizer::TextTokenizer;
use std::num::NonZeroUsize;
use std::ops::Range;

/// Iterator of collated batches in index order.
///
/// Stops after the first error.
pub struct Batches<'a, F, A, T> {
    dataset: &'a SplitDataset<F, A, T>,
    batch_size: usize,
    cursor: usize,
    failed: bool,
}

impl<'a, F, A, T> Batches<'a, F, A, T>
where
    F: FeatureStore,
    A: AudioProcessor,
    T: TextTokenizer,
{
    pub fn new(dataset: &'a SplitDataset<F, A, T>, batch_size: NonZeroUsize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.get(),
            cursor: 0,
            failed: false,
        }
    }

    /// Index range of the next batch, if any.
    pub fn next_range(&self) -> Option<Range<usize>> {
        let len = self.dataset.len();
        if self.failed || self.cursor >= len {
            return None;
        }
        Some(self.cursor..(self.cursor + self.batch_size).min(len))
    }

    fn load(&self, range: Range<usize>) -> Result<Batch> {
        let samples = range
            .map(|index| self.dataset.get(index))
            .collect::<Result<Vec<_>>>()?;
        self.dataset.collate(&samples)
    }
}

impl<F, A, T> Iterator for Batches<'_, F, A, T>
where
    F: FeatureStore,
    A: AudioProcessor,
    T: TextTokenizer,
{
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.next_range()?;
        self.cursor = range.end;

        let batch = self.load(range);
        self.failed = batch.is_err();

        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next_range() {
            Some(_) => (self.dataset.len() - self.cursor).div_ceil(self.batch_size),
            None => 0,
        };
        (0, Some(remaining))
    }
}

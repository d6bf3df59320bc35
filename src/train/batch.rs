use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::Dataset;
use crate::math::matrix::Matrix;

/// One pass over a dataset in mini-batches of `(images, labels)`.
///
/// Covers every row exactly once. With `shuffle` set, a permutation of all
/// row indices is drawn once from `seed` before slicing into contiguous
/// chunks; the final chunk is short when `batch_size` does not divide the
/// dataset size. The iterator is consumed by iteration; build a new one for
/// the next epoch.
#[derive(Debug)]
pub struct BatchIterator<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
    batch_size: usize,
    position: usize,
}

impl<'a> BatchIterator<'a> {
    /// # Panics
    /// Panics if `batch_size == 0`.
    pub fn new(dataset: &'a Dataset, batch_size: usize, shuffle: bool, seed: u64) -> Self {
        assert!(batch_size > 0, "batch_size must be at least 1");
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        if shuffle {
            indices.shuffle(&mut StdRng::seed_from_u64(seed));
        }
        BatchIterator { dataset, indices, batch_size, position: 0 }
    }

    /// Row indices of the remaining batches, in iteration order.
    pub fn indices(&self) -> &[usize] {
        &self.indices[self.position..]
    }
}

impl Iterator for BatchIterator<'_> {
    type Item = (Matrix, Vec<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.indices.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.indices.len());
        let batch = &self.indices[self.position..end];
        self.position = end;

        let images = self.dataset.images.select_rows(batch);
        let labels = batch.iter().map(|&i| self.dataset.labels[i]).collect();
        Some((images, labels))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.indices.len() - self.position).div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchIterator<'_> {}

/// Convenience constructor mirroring [`BatchIterator::new`].
pub fn batch_iterator(dataset: &Dataset, batch_size: usize, shuffle: bool, seed: u64) -> BatchIterator<'_> {
    BatchIterator::new(dataset, batch_size, shuffle, seed)
}

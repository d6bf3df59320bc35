use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::dataset::Dataset;
use crate::error::{NetError, Result};

pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_SPLIT_SEED: u64 = 42;

/// Shuffles row indices with `seed`, then puts the first
/// `floor(N * (1 - test_size))` rows in the training set and the rest in the
/// test set.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !(0.0..=1.0).contains(&test_size) {
        return Err(NetError::Config(format!("test_size must be in [0, 1], got {}", test_size)));
    }

    let n = dataset.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let split = (n as f64 * (1.0 - test_size)) as usize;
    let (train_idx, test_idx) = indices.split_at(split);
    Ok((dataset.select(train_idx), dataset.select(test_idx)))
}

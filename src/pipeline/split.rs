//! Seeded train/test partitioning

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use super::error::ModelError;

/// Row indices of the two partitions, in shuffled order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainTestSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    /// Select the rows of `items` that belong to each partition
    pub fn take<T: Clone>(&self, items: &[T]) -> (Vec<T>, Vec<T>) {
        let pick = |indices: &[usize]| -> Vec<T> { indices.iter().map(|&i| items[i].clone()).collect() };
        (pick(&self.train_indices), pick(&self.test_indices))
    }

    pub fn train_len(&self) -> usize {
        self.train_indices.len()
    }

    pub fn test_len(&self) -> usize {
        self.test_indices.len()
    }
}

/// Number of test rows for `n_rows` rows and a test fraction.
///
/// `round(test_fraction * n_rows)`, kept within `[1, n_rows - 1]` so both
/// partitions are non-empty.
pub fn test_size(n_rows: usize, test_fraction: f64) -> usize {
    let raw = (test_fraction * n_rows as f64).round() as usize;
    raw.clamp(1, n_rows.saturating_sub(1).max(1))
}

/// Shuffle `0..n_rows` with a seeded RNG and cut it into train and test.
///
/// No stratification: class balance between the partitions is whatever
/// the shuffle produces.
///
/// # Errors
///
/// - [`ModelError::InvalidConfig`] if `test_fraction` is outside (0, 1)
/// - [`ModelError::EmptyDataset`] if fewer than two rows are given
pub fn train_test_split(
    n_rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, ModelError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InvalidConfig {
            parameter: "test_fraction",
            reason: format!("must be in (0, 1), got {}", test_fraction),
        });
    }
    if n_rows < 2 {
        return Err(ModelError::EmptyDataset);
    }

    let n_test = test_size(n_rows, test_fraction);

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut order: Vec<usize> = (0..n_rows).collect();
    order.shuffle(&mut rng);

    let train_indices = order.split_off(n_test);
    let test_indices = order;

    log::debug!(
        "split {} rows into {} train / {} test (seed {})",
        n_rows,
        train_indices.len(),
        test_indices.len(),
        seed
    );

    Ok(TrainTestSplit {
        train_indices,
        test_indices,
    })
}

//! Deterministic train/holdout partitioning.

use rand::prelude::*;

/// Row indices of a train/holdout partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Shuffle `0..n_rows` with a seeded RNG and cut off a holdout partition.
///
/// The holdout receives `ceil(n_rows * holdout_fraction)` rows and training
/// gets the rest, so for a fixed `(n_rows, holdout_fraction, seed)` the
/// partition is always the same.
///
/// # Panics
///
/// Panics if `holdout_fraction` is outside `[0, 1)`.
pub fn train_test_split(n_rows: usize, holdout_fraction: f64, seed: u64) -> Split {
    assert!(
        (0.0..1.0).contains(&holdout_fraction),
        "holdout_fraction must be in [0, 1)"
    );
    let mut idx: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let holdout_len = ((n_rows as f64) * holdout_fraction).ceil() as usize;
    let holdout_len = holdout_len.min(n_rows);
    let (holdout, train) = idx.split_at(holdout_len);
    Split {
        train: train.to_vec(),
        holdout: holdout.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sizes() {
        let split = train_test_split(100, 0.2, 1);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.holdout.len(), 20);

        let split = train_test_split(11, 0.2, 1);
        assert_eq!(split.holdout.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn split_is_deterministic() {
        assert_eq!(train_test_split(57, 0.2, 1), train_test_split(57, 0.2, 1));
        assert_ne!(train_test_split(57, 0.2, 1), train_test_split(57, 0.2, 2));
    }

    #[test]
    fn split_partitions_all_rows() {
        let split = train_test_split(40, 0.2, 7);
        let mut all: Vec<usize> = split.train.iter().chain(&split.holdout).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn single_row_goes_to_holdout() {
        let split = train_test_split(1, 0.2, 1);
        assert!(split.train.is_empty());
        assert_eq!(split.holdout, vec![0]);
    }

    #[test]
    #[should_panic(expected = "holdout_fraction")]
    fn rejects_full_holdout() {
        train_test_split(10, 1.0, 1);
    }
}

//! Row and column sampling for forest training.
//!
//! - [`RowSample::bootstrap`]: draw `n` rows with replacement, kept as
//!   per-row multiplicities
//! - [`ColumnSampler`]: order the candidate features for one split
//!
//! All randomness comes from a [`Xoshiro256PlusPlus`] seeded per tree with
//! [`tree_seed`], so trees can be grown in any order or on any thread and
//! still come out identical.

use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Derive an independent seed for tree `tree_idx` from the forest seed.
///
/// SplitMix64 finalizer over `seed + tree_idx * golden_gamma`.
#[inline]
pub fn tree_seed(seed: u64, tree_idx: usize) -> u64 {
    let mut z = seed.wrapping_add((tree_idx as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// RNG for one tree.
pub fn tree_rng(seed: u64, tree_idx: usize) -> Xoshiro256PlusPlus {
    Xoshiro256PlusPlus::seed_from_u64(tree_seed(seed, tree_idx))
}

// ============================================================================
// RowSample
// ============================================================================

/// Rows used to grow one tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSample {
    /// Indices of selected rows, sorted and unique.
    pub indices: Vec<u32>,
    /// Multiplicity of each selected row (parallel to `indices`).
    pub weights: Vec<f32>,
}

impl RowSample {
    /// All rows, each once.
    pub fn all_rows(n_rows: usize) -> Self {
        Self {
            indices: (0..n_rows as u32).collect(),
            weights: vec![1.0; n_rows],
        }
    }

    /// Bootstrap: `n_rows` draws with replacement.
    pub fn bootstrap<R: Rng>(n_rows: usize, rng: &mut R) -> Self {
        let mut counts = vec![0u32; n_rows];
        for _ in 0..n_rows {
            counts[rng.gen_range(0..n_rows)] += 1;
        }
        let (indices, weights) = counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(|(i, &c)| (i as u32, c as f32))
            .unzip();
        Self { indices, weights }
    }

    /// Total weight (number of draws).
    pub fn total_weight(&self) -> f32 {
        self.weights.iter().sum()
    }
}

// ============================================================================
// ColumnSampler
// ============================================================================

/// Decides which features a split may look at.
///
/// Features are visited in a per-node random order. The grower evaluates
/// them until `max_features` features that are not constant within the node
/// have been tried; constant features are skipped without counting, so a node
/// only ends up a leaf when every feature is constant or no split helps.
///
/// When `max_features >= n_features` every feature is a candidate and no
/// randomness is consumed.
#[derive(Debug, Clone)]
pub struct ColumnSampler {
    n_features: usize,
    max_features: usize,
}

impl ColumnSampler {
    pub fn new(n_features: usize, max_features: usize) -> Self {
        Self {
            n_features,
            max_features: max_features.min(n_features),
        }
    }

    /// Returns true if only a subset of features is considered per split.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.max_features < self.n_features
    }

    /// Number of non-constant features to evaluate per split.
    #[inline]
    pub fn max_features(&self) -> usize {
        self.max_features
    }

    /// Order in which features are visited for one node.
    pub fn candidate_order<R: Rng>(&self, rng: &mut R) -> Vec<u32> {
        if !self.is_enabled() {
            return (0..self.n_features as u32).collect();
        }
        index::sample(rng, self.n_features, self.n_features)
            .into_iter()
            .map(|i| i as u32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_seeds_differ_and_are_stable() {
        assert_eq!(tree_seed(42, 3), tree_seed(42, 3));
        assert_ne!(tree_seed(42, 3), tree_seed(42, 4));
        assert_ne!(tree_seed(42, 0), tree_seed(43, 0));
    }

    #[test]
    fn bootstrap_draws_n_rows() {
        let mut rng = tree_rng(1, 0);
        let sample = RowSample::bootstrap(50, &mut rng);
        assert_eq!(sample.total_weight(), 50.0);
        assert_eq!(sample.indices.len(), sample.weights.len());
        assert!(sample.indices.windows(2).all(|w| w[0] < w[1]));
        // With replacement, some rows are almost surely left out.
        assert!(sample.indices.len() < 50);
    }

    #[test]
    fn bootstrap_is_deterministic() {
        let a = RowSample::bootstrap(30, &mut tree_rng(9, 2));
        let b = RowSample::bootstrap(30, &mut tree_rng(9, 2));
        assert_eq!(a, b);
    }

    #[test]
    fn all_rows_sample() {
        let sample = RowSample::all_rows(4);
        assert_eq!(sample.indices, vec![0, 1, 2, 3]);
        assert_eq!(sample.total_weight(), 4.0);
    }

    #[test]
    fn column_sampler_visits_every_feature_once() {
        let sampler = ColumnSampler::new(6, 3);
        assert!(sampler.is_enabled());
        assert_eq!(sampler.max_features(), 3);
        let mut rng = tree_rng(5, 0);
        let mut orders = Vec::new();
        for _ in 0..20 {
            let mut order = sampler.candidate_order(&mut rng);
            orders.push(order.clone());
            order.sort_unstable();
            assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
        }
        // Orders vary between nodes.
        assert!(orders.iter().any(|o| o != &orders[0]));
    }

    #[test]
    fn column_sampler_disabled_returns_all_in_order() {
        let sampler = ColumnSampler::new(3, 10);
        assert!(!sampler.is_enabled());
        assert_eq!(sampler.max_features(), 3);
        assert_eq!(sampler.candidate_order(&mut tree_rng(0, 0)), vec![0, 1, 2]);
    }
}

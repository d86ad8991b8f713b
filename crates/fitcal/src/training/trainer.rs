//! Random forest trainer.
//!
//! Every tree draws its own bootstrap sample and feature orders from an RNG
//! derived from `(seed, tree_idx)`, so the forest is identical whether the
//! trees are grown sequentially or on a thread pool.
//!
//! # Example
//!
//! ```ignore
//! use fitcal::training::{ForestParams, ForestTrainer};
//!
//! let params = ForestParams { n_trees: 100, ..Default::default() };
//! let forest = ForestTrainer::new(params).train(
//!     features.view(),
//!     targets.view(),
//!     Parallelism::Sequential,
//! );
//! ```

use ndarray::{ArrayView1, ArrayView2};

use super::grower::{GrowerParams, TreeGrower};
use super::logger::{TrainingLogger, Verbosity};
use super::sampling::{ColumnSampler, RowSample, tree_rng};
use crate::repr::{Forest, TreeView};
use crate::utils::Parallelism;

// =============================================================================
// ForestParams
// =============================================================================

/// Parameters for forest training.
///
/// Use struct construction with `..Default::default()` for convenient configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ForestParams {
    // --- Ensemble ---
    /// Number of trees.
    pub n_trees: u32,
    /// Draw a bootstrap sample per tree. When false every tree sees every row once.
    pub bootstrap: bool,

    // --- Tree structure ---
    pub max_depth: u32,
    pub min_samples_split: u32,
    pub min_samples_leaf: u32,

    // --- Sampling ---
    /// Non-constant features evaluated per split.
    pub max_features: u32,

    // --- Logging ---
    pub verbosity: Verbosity,

    // --- Reproducibility ---
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            bootstrap: true,
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 3,
            verbosity: Verbosity::default(),
            seed: 42,
        }
    }
}

impl ForestParams {
    fn to_grower_params(&self) -> GrowerParams {
        GrowerParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

// =============================================================================
// ForestTrainer
// =============================================================================

/// Grows a forest of independent regression trees.
pub struct ForestTrainer {
    params: ForestParams,
}

impl ForestTrainer {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    /// Train a forest on a sample-major matrix `[n_samples, n_features]`.
    ///
    /// An empty training set yields a forest with no trees.
    pub fn train<'a>(
        &self,
        features: ArrayView2<'a, f32>,
        targets: ArrayView1<'a, f32>,
        parallelism: Parallelism,
    ) -> Forest {
        let n_rows = features.nrows();
        let n_features = features.ncols();
        let mut logger = TrainingLogger::new(self.params.verbosity);

        if n_rows == 0 {
            if logger.verbosity() >= Verbosity::Warning {
                tracing::warn!("no training rows, returning an empty forest");
            }
            return Forest::new(n_features);
        }

        let n_trees = self.params.n_trees as usize;
        logger.start_training(n_trees, n_rows, n_features);

        let grower = TreeGrower::new(
            features,
            targets,
            self.params.to_grower_params(),
            ColumnSampler::new(n_features, self.params.max_features as usize),
        );
        let seed = self.params.seed;
        let bootstrap = self.params.bootstrap;

        let trees = parallelism.maybe_par_map(0..n_trees, |tree_idx| {
            let mut rng = tree_rng(seed, tree_idx);
            let sample = if bootstrap {
                RowSample::bootstrap(n_rows, &mut rng)
            } else {
                RowSample::all_rows(n_rows)
            };
            grower.grow(&sample, &mut rng)
        });

        for (idx, tree) in trees.iter().enumerate() {
            logger.log_tree(idx, tree.n_leaves(), tree.depth());
        }
        logger.finish_training();

        Forest::from_trees(trees, n_features)
    }
}

//! Averaging forest (collection of regression trees).

use ndarray::{Array1, ArrayView2};

use super::tree::{Tree, TreeValidationError, TreeView};
use crate::utils::Parallelism;

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForestValidationError {
    EmptyForest,
    InvalidTree { tree_idx: usize, error: TreeValidationError },
    FeatureOutOfRange { tree_idx: usize, feature: u32, n_features: usize },
}

/// Forest of regression trees whose predictions are averaged.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    n_features: usize,
}

impl Forest {
    /// Create an empty forest over `n_features` input columns.
    pub fn new(n_features: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_features,
        }
    }

    /// Create a forest from already grown trees.
    pub fn from_trees(trees: Vec<Tree>, n_features: usize) -> Self {
        Self { trees, n_features }
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Number of trees.
    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of input features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Get a reference to a specific tree.
    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    /// Iterate over trees.
    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Predict a single row: the mean of all tree outputs.
    ///
    /// An empty forest predicts 0.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        debug_assert_eq!(features.len(), self.n_features);
        if self.trees.is_empty() {
            return 0.0;
        }
        // Accumulate in f64 so a thousand-tree sum does not lose precision.
        let sum: f64 = self
            .trees
            .iter()
            .map(|t| t.predict_row(features) as f64)
            .sum();
        (sum / self.trees.len() as f64) as f32
    }

    /// Predict every row of a sample-major matrix `[n_samples, n_features]`.
    pub fn predict_batch(
        &self,
        features: ArrayView2<f32>,
        parallelism: Parallelism,
    ) -> Array1<f32> {
        let rows: Vec<usize> = (0..features.nrows()).collect();
        let preds = parallelism.maybe_par_map(rows, |r| {
            let row = features.row(r);
            match row.as_slice() {
                Some(slice) => self.predict_row(slice),
                None => self.predict_row(&row.to_vec()),
            }
        });
        Array1::from(preds)
    }

    /// Total split gain per feature, normalized to sum to 1.
    ///
    /// Returns all zeros when no tree has a split.
    pub fn feature_importance(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for tree in &self.trees {
            for node in 0..tree.n_nodes() as u32 {
                if !tree.is_leaf(node) {
                    let feature = tree.split_index(node) as usize;
                    if let Some(slot) = totals.get_mut(feature) {
                        *slot += tree.gains()[node as usize] as f64;
                    }
                }
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Validate every tree and check split features against `n_features`.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.trees.is_empty() {
            return Err(ForestValidationError::EmptyForest);
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ForestValidationError::InvalidTree { tree_idx: i, error: e })?;
            for node in 0..tree.n_nodes() as u32 {
                if !tree.is_leaf(node) && tree.split_index(node) as usize >= self.n_features {
                    return Err(ForestValidationError::FeatureOutOfRange {
                        tree_idx: i,
                        feature: tree.split_index(node),
                        n_features: self.n_features,
                    });
                }
            }
        }
        Ok(())
    }
}

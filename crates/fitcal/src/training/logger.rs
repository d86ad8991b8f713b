//! Training progress logging.
//!
//! [`TrainingLogger`] decides *whether* a training event is reported based on
//! [`Verbosity`]; the events themselves go through `tracing`, so the installed
//! subscriber still controls formatting and filtering.

use std::time::Instant;

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No training output.
    #[default]
    Silent,
    /// Only warnings (e.g. degenerate trees).
    Warning,
    /// Start/finish summaries.
    Info,
    /// Per-tree details.
    Debug,
}

/// Emits training events gated by a [`Verbosity`] level.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
    n_trees: usize,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
            n_trees: 0,
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Mark the start of training.
    pub fn start_training(&mut self, n_trees: usize, n_rows: usize, n_features: usize) {
        self.started = Some(Instant::now());
        self.n_trees = n_trees;
        if self.verbosity >= Verbosity::Info {
            tracing::info!(n_trees, n_rows, n_features, "training forest");
        }
    }

    /// Report a finished tree.
    pub fn log_tree(&self, tree_idx: usize, n_leaves: usize, depth: usize) {
        if self.verbosity >= Verbosity::Debug {
            tracing::debug!(tree = tree_idx, of = self.n_trees, n_leaves, depth, "grew tree");
        }
        if n_leaves == 1 && self.verbosity >= Verbosity::Warning {
            tracing::warn!(tree = tree_idx, "tree has no split; its bootstrap sample is constant");
        }
    }

    /// Mark the end of training.
    pub fn finish_training(&self) {
        if self.verbosity >= Verbosity::Info {
            let elapsed_ms = self
                .started
                .map(|t| t.elapsed().as_millis())
                .unwrap_or_default();
            tracing::info!(n_trees = self.n_trees, elapsed_ms, "forest trained");
        }
    }
}

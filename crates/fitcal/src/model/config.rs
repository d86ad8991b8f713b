//! Forest configuration with builder pattern.
//!
//! [`ForestConfig`] holds the forest hyperparameters and uses the `bon`
//! crate for builder generation with validation at build time.
//! [`FitOptions`] adds the train/holdout split on top.
//!
//! # Example
//!
//! ```
//! use fitcal::model::ForestConfig;
//!
//! // The production configuration
//! let config = ForestConfig::builder().build().unwrap();
//! assert_eq!(config.n_trees, 1000);
//!
//! // A small forest for quick experiments
//! let config = ForestConfig::builder().n_trees(50).n_threads(1).build().unwrap();
//! ```

use bon::Builder;

use crate::training::{ForestParams, Verbosity};

/// Number of trees in the production forest.
pub const N_TREES: u32 = 1000;
/// Non-constant features evaluated per split.
pub const MAX_FEATURES: u32 = 3;
/// Maximum tree depth.
pub const MAX_DEPTH: u32 = 6;
pub const MIN_SAMPLES_SPLIT: u32 = 2;
pub const MIN_SAMPLES_LEAF: u32 = 1;
/// Seed for bootstrap and feature sampling.
pub const FOREST_SEED: u64 = 42;
/// Share of prepared rows held out from training.
pub const HOLDOUT_FRACTION: f64 = 0.2;
/// Seed for the train/holdout shuffle.
pub const SPLIT_SEED: u64 = 1;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Number of trees must be at least 1.
    InvalidNTrees,
    /// A tree-shape parameter is below its minimum.
    InvalidTreeParam {
        field: &'static str,
        value: u32,
        min: u32,
    },
    /// Holdout fraction must be in [0, 1).
    InvalidHoldoutFraction(f64),
    /// A required path is empty.
    MissingPath(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNTrees => write!(f, "n_trees must be at least 1"),
            Self::InvalidTreeParam { field, value, min } => {
                write!(f, "{} must be at least {}, got {}", field, min, value)
            }
            Self::InvalidHoldoutFraction(v) => {
                write!(f, "holdout_fraction must be in [0, 1), got {}", v)
            }
            Self::MissingPath(field) => write!(f, "{} must not be empty", field),
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// ForestConfig
// =============================================================================

/// Random forest hyperparameters.
///
/// Defaults are the production values: [`N_TREES`] trees of depth at most
/// [`MAX_DEPTH`], [`MAX_FEATURES`] features per split, seeded with
/// [`FOREST_SEED`].
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ForestConfig {
    // === Ensemble ===
    /// Number of trees. Default: [`N_TREES`].
    #[builder(default = N_TREES)]
    pub n_trees: u32,

    /// Bootstrap rows per tree. Default: true.
    #[builder(default = true)]
    pub bootstrap: bool,

    // === Tree structure ===
    /// Default: [`MAX_DEPTH`].
    #[builder(default = MAX_DEPTH)]
    pub max_depth: u32,

    #[builder(default = MIN_SAMPLES_SPLIT)]
    pub min_samples_split: u32,

    #[builder(default = MIN_SAMPLES_LEAF)]
    pub min_samples_leaf: u32,

    // === Sampling ===
    /// Non-constant features evaluated per split. Values above the feature
    /// count mean "all features". Default: [`MAX_FEATURES`].
    #[builder(default = MAX_FEATURES)]
    pub max_features: u32,

    // === Resource control ===
    /// Thread count: 0 = auto, 1 = sequential, >1 = exact count.
    #[builder(default)]
    pub n_threads: usize,

    // === Reproducibility ===
    /// Default: [`FOREST_SEED`].
    #[builder(default = FOREST_SEED)]
    pub seed: u64,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: forest_config_builder::IsComplete> ForestConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `n_trees == 0`
    /// - `max_depth == 0` or `max_features == 0`
    /// - `min_samples_split < 2` or `min_samples_leaf == 0`
    pub fn build(self) -> Result<ForestConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ForestConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }

        let checks = [
            ("max_depth", self.max_depth, 1),
            ("max_features", self.max_features, 1),
            ("min_samples_split", self.min_samples_split, 2),
            ("min_samples_leaf", self.min_samples_leaf, 1),
        ];
        for (field, value, min) in checks {
            if value < min {
                return Err(ConfigError::InvalidTreeParam { field, value, min });
            }
        }

        Ok(())
    }

    /// Convert to trainer parameters.
    pub(crate) fn to_trainer_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            bootstrap: self.bootstrap,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features,
            verbosity: self.verbosity,
            seed: self.seed,
        }
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

// =============================================================================
// FitOptions
// =============================================================================

/// Everything [`TrainedModel::fit`](super::TrainedModel::fit) needs besides the data.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    pub forest: ForestConfig,
    /// Share of rows held out for evaluation. Default: [`HOLDOUT_FRACTION`].
    pub holdout_fraction: f64,
    /// Default: [`SPLIT_SEED`].
    pub split_seed: u64,
}

impl FitOptions {
    /// Production split around the given forest configuration.
    pub fn new(forest: ForestConfig) -> Self {
        Self {
            forest,
            holdout_fraction: HOLDOUT_FRACTION,
            split_seed: SPLIT_SEED,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.holdout_fraction) {
            return Err(ConfigError::InvalidHoldoutFraction(self.holdout_fraction));
        }
        self.forest.validate()
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ForestConfig::builder().build();
        assert!(config.is_ok());

        let config = config.unwrap();
        assert_eq!(config.n_trees, 1000);
        assert_eq!(config.max_features, 3);
        assert_eq!(config.max_depth, 6);
        assert_eq!(config.seed, 42);
        assert!(config.bootstrap);
        assert_eq!(config, ForestConfig::default());
    }

    #[test]
    fn test_invalid_n_trees_zero() {
        let result = ForestConfig::builder().n_trees(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidNTrees)));
    }

    #[test]
    fn test_valid_n_trees_one() {
        let result = ForestConfig::builder().n_trees(1).build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_max_depth_zero() {
        let result = ForestConfig::builder().max_depth(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidTreeParam {
                field: "max_depth",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_max_features_zero() {
        let result = ForestConfig::builder().max_features(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidTreeParam {
                field: "max_features",
                ..
            })
        ));
    }

    #[test]
    fn test_max_features_above_feature_count_is_valid() {
        let result = ForestConfig::builder().max_features(50).build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_min_samples_split() {
        let result = ForestConfig::builder().min_samples_split(1).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidTreeParam {
                field: "min_samples_split",
                value: 1,
                min: 2
            })
        ));
    }

    #[test]
    fn test_invalid_min_samples_leaf_zero() {
        let result = ForestConfig::builder().min_samples_leaf(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidTreeParam {
                field: "min_samples_leaf",
                ..
            })
        ));
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(ConfigError::InvalidNTrees.to_string(), "n_trees must be at least 1");
        let err = ConfigError::InvalidTreeParam {
            field: "max_depth",
            value: 0,
            min: 1,
        };
        assert_eq!(err.to_string(), "max_depth must be at least 1, got 0");
    }

    #[test]
    fn test_trainer_params_follow_config() {
        let config = ForestConfig::builder()
            .n_trees(7)
            .seed(3)
            .verbosity(Verbosity::Info)
            .build()
            .unwrap();
        let params = config.to_trainer_params();
        assert_eq!(params.n_trees, 7);
        assert_eq!(params.seed, 3);
        assert_eq!(params.verbosity, Verbosity::Info);
        assert_eq!(params.max_features, MAX_FEATURES);
    }

    #[test]
    fn test_fit_options_defaults() {
        let options = FitOptions::default();
        assert_eq!(options.holdout_fraction, 0.2);
        assert_eq!(options.split_seed, 1);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_fit_options_rejects_bad_holdout() {
        for fraction in [-0.1, 1.0, f64::NAN] {
            let options = FitOptions {
                holdout_fraction: fraction,
                ..Default::default()
            };
            assert!(matches!(
                options.validate(),
                Err(ConfigError::InvalidHoldoutFraction(_))
            ));
        }
    }
}

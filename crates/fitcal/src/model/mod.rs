//! Calorie model and configuration.
//!
//! - [`ForestConfig`] / [`FitOptions`]: hyperparameters and split settings
//! - [`TrainedModel`]: fit once, then predict per request
//! - [`ModelMeta`]: row counts, target range and holdout evaluation

mod config;
mod meta;
mod trained;

pub use config::{
    ConfigError, FOREST_SEED, FitOptions, ForestConfig, HOLDOUT_FRACTION, MAX_DEPTH, MAX_FEATURES,
    MIN_SAMPLES_LEAF, MIN_SAMPLES_SPLIT, N_TREES, SPLIT_SEED,
};
pub use meta::{Evaluation, ModelMeta};
pub use trained::{FitError, PREDICTION_DECIMALS, TrainedModel};

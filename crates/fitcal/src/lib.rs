//! fitcal: calorie-burn estimation for exercise sessions.
//!
//! A random forest is fit once on a calories table joined with an exercise
//! table, then answers single requests (age, BMI, duration, heart rate, body
//! temperature, gender) with an estimate of the calories burned.
//!
//! # Key Types
//!
//! - [`PipelineConfig`] / [`initialize`] - Load, prepare and fit in one call
//! - [`TrainedModel`] - Fitted forest plus its feature schema
//! - [`ForestConfig`] - Forest hyperparameters
//! - [`InferenceRequest`] - One prediction request
//!
//! # Data Flow
//!
//! [`data`] loads and joins the tables into a [`PreparedDataset`],
//! [`training`] grows the trees into a [`repr::Forest`], and [`inference`]
//! aligns requests to the schema the forest was trained on.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod inference;
pub mod model;
pub mod pipeline;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::{FitError, FitOptions, ForestConfig, ModelMeta, TrainedModel};

// Pipeline entry point
pub use pipeline::{PipelineConfig, initialize};

// Data types
pub use data::{CaloriesTable, DataError, ExerciseTable, FeatureSchema, Gender, PreparedDataset};

// Request types
pub use inference::{FeatureRecord, InferenceRequest, InputRanges, ValidationError};

// Shared utilities
pub use utils::{Parallelism, run_with_threads};

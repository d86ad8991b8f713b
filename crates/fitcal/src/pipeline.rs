//! One-shot initialization: load the tables, prepare them and fit the model.
//!
//! # Example
//!
//! ```no_run
//! use fitcal::pipeline::{PipelineConfig, initialize};
//!
//! let config = PipelineConfig::builder()
//!     .calories_path("data/calories.csv")
//!     .exercise_path("data/exercise.csv")
//!     .build()
//!     .unwrap();
//! let model = initialize(&config).unwrap();
//! ```

use std::path::PathBuf;
use std::time::Instant;

use bon::Builder;

use crate::data::{CaloriesTable, ExerciseTable, JoinPolicy, PrepareOptions, prepare};
use crate::model::{ConfigError, FitError, FitOptions, TrainedModel};

/// Where the training data lives and how the model is fit.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct PipelineConfig {
    /// CSV with `User_ID` and `Calories`.
    #[builder(into)]
    pub calories_path: PathBuf,

    /// CSV with the exercise sessions.
    #[builder(into)]
    pub exercise_path: PathBuf,

    #[builder(default)]
    pub join: JoinPolicy,

    #[builder(default)]
    pub fit: FitOptions,
}

impl<S: pipeline_config_builder::IsComplete> PipelineConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a path is empty or the fit options are invalid.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.calories_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("calories_path"));
        }
        if self.exercise_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingPath("exercise_path"));
        }
        self.fit.validate()
    }
}

/// Load both tables, prepare the feature table and fit the model.
///
/// Runs once at startup; the returned model is then used for every request.
pub fn initialize(config: &PipelineConfig) -> Result<TrainedModel, FitError> {
    let started = Instant::now();

    let calories = CaloriesTable::from_path(&config.calories_path)?;
    let exercise = ExerciseTable::from_path(&config.exercise_path)?;
    tracing::info!(
        calories = calories.len(),
        exercise = exercise.len(),
        "loaded training tables"
    );

    let dataset = prepare(
        &calories,
        &exercise,
        &PrepareOptions { join: config.join },
    )?;
    let model = TrainedModel::fit(&dataset, &config.fit)?;

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis(),
        n_trees = model.forest().n_trees(),
        "model ready"
    );
    Ok(model)
}

//! Trained calorie model.
//!
//! High-level wrapper around [`Forest`] with fitting and prediction.
//! Access components via [`forest()`](TrainedModel::forest),
//! [`schema()`](TrainedModel::schema), [`meta()`](TrainedModel::meta) and
//! [`config()`](TrainedModel::config).

use ndarray::{Array1, ArrayView1, ArrayView2};

use super::config::{ConfigError, FitOptions, ForestConfig};
use super::meta::{Evaluation, ModelMeta};
use crate::data::{DataError, FeatureSchema, PreparedDataset, train_test_split};
use crate::inference::{FeatureRecord, InferenceRequest, ValidationError, align_to_schema};
use crate::repr::Forest;
use crate::training::{ForestTrainer, Mae, Metric, Rmse};
use crate::utils::{Parallelism, round_to, run_with_threads};

/// Decimal places of the prediction shown to users.
pub const PREDICTION_DECIMALS: u32 = 2;

/// Errors from [`TrainedModel::fit`].
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("schema has {schema} columns but the forest expects {forest}")]
    SchemaMismatch { schema: usize, forest: usize },
}

/// A random forest fit on the prepared calories table, with the schema it
/// expects at inference time.
///
/// Immutable after fitting; share it by reference or `Arc`.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    forest: Forest,
    schema: FeatureSchema,
    config: ForestConfig,
    meta: ModelMeta,
}

impl TrainedModel {
    /// Split `dataset`, grow the forest on the training part and evaluate
    /// both parts.
    ///
    /// # Errors
    ///
    /// - [`FitError::Config`] if `options` fail validation
    /// - [`FitError::Data`] with [`DataError::InsufficientRows`] if the
    ///   training partition would be empty
    pub fn fit(dataset: &PreparedDataset, options: &FitOptions) -> Result<Self, FitError> {
        options.validate()?;

        let n_samples = dataset.n_samples();
        let split = train_test_split(n_samples, options.holdout_fraction, options.split_seed);
        if split.train.is_empty() {
            return Err(DataError::InsufficientRows { rows: n_samples }.into());
        }

        let train = dataset.select_rows(&split.train);
        let holdout = dataset.select_rows(&split.holdout);
        let config = options.forest.clone();
        let trainer = ForestTrainer::new(config.to_trainer_params());

        tracing::info!(
            train = train.n_samples(),
            holdout = holdout.n_samples(),
            n_trees = config.n_trees,
            "fitting random forest"
        );

        let (forest, evaluation) = run_with_threads(config.n_threads, |parallelism| {
            let forest = trainer.train(train.features(), train.targets(), parallelism);
            let evaluation = evaluate(&forest, &train, &holdout, parallelism);
            (forest, evaluation)
        });

        tracing::info!(
            train_rmse = evaluation.train_rmse,
            train_mae = evaluation.train_mae,
            holdout_rmse = evaluation.holdout_rmse,
            holdout_mae = evaluation.holdout_mae,
            "model evaluated"
        );

        let schema = dataset.schema().clone();
        let meta = ModelMeta {
            feature_names: schema.names().to_vec(),
            n_samples,
            n_train: train.n_samples(),
            n_holdout: holdout.n_samples(),
            target_range: train.target_range().unwrap_or_default(),
            evaluation,
        };

        Ok(Self {
            forest,
            schema,
            config,
            meta,
        })
    }

    /// Assemble a model from a forest and the schema it was grown on.
    ///
    /// # Errors
    ///
    /// [`FitError::SchemaMismatch`] if the schema width differs from the
    /// forest's feature count.
    pub fn from_parts(
        forest: Forest,
        schema: FeatureSchema,
        config: ForestConfig,
        meta: ModelMeta,
    ) -> Result<Self, FitError> {
        if schema.n_features() != forest.n_features() {
            return Err(FitError::SchemaMismatch {
                schema: schema.n_features(),
                forest: forest.n_features(),
            });
        }
        Ok(Self {
            forest,
            schema,
            config,
            meta,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Feature columns the model expects, in order.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Estimated calories for one request, unrounded.
    ///
    /// Inputs outside the usual ranges still give a finite estimate; use
    /// [`InputRanges::check`](crate::inference::InputRanges::check) to refuse them.
    pub fn predict(&self, request: &InferenceRequest) -> Result<f64, ValidationError> {
        self.predict_record(&request.to_record())
    }

    /// [`predict`](Self::predict) rounded to [`PREDICTION_DECIMALS`] places.
    pub fn predict_rounded(&self, request: &InferenceRequest) -> Result<f64, ValidationError> {
        self.predict(request).map(|v| round_to(v, PREDICTION_DECIMALS))
    }

    /// Estimate for a loosely typed record, aligned to the schema first.
    pub fn predict_record(&self, record: &FeatureRecord) -> Result<f64, ValidationError> {
        let row = align_to_schema(record, &self.schema)?;
        Ok(self.predict_row(row.view()))
    }

    /// Predict every row of a sample-major matrix already in schema order.
    ///
    /// # Panics
    ///
    /// Panics if the column count differs from the schema width.
    pub fn predict_batch(&self, features: ArrayView2<f32>) -> Array1<f32> {
        assert_eq!(
            features.ncols(),
            self.schema.n_features(),
            "feature matrix has the wrong number of columns"
        );
        self.forest.predict_batch(features, Parallelism::Sequential)
    }

    fn predict_row(&self, row: ArrayView1<f32>) -> f64 {
        let value = match row.as_slice() {
            Some(slice) => self.forest.predict_row(slice),
            None => self.forest.predict_row(&row.to_vec()),
        };
        value as f64
    }

    // =========================================================================
    // Feature Importance
    // =========================================================================

    /// Normalized impurity decrease per schema column, in schema order.
    pub fn feature_importance(&self) -> Vec<(String, f64)> {
        self.schema
            .names()
            .iter()
            .cloned()
            .zip(self.forest.feature_importance())
            .collect()
    }
}

fn evaluate(
    forest: &Forest,
    train: &PreparedDataset,
    holdout: &PreparedDataset,
    parallelism: Parallelism,
) -> Evaluation {
    let score = |data: &PreparedDataset| {
        let preds = forest.predict_batch(data.features(), parallelism);
        let preds = preds.as_slice().unwrap_or_default();
        let targets = data.targets().to_vec();
        (Rmse.compute(preds, &targets), Mae.compute(preds, &targets))
    };

    let (train_rmse, train_mae) = score(train);
    let (holdout_rmse, holdout_mae) = if holdout.n_samples() > 0 {
        let (rmse, mae) = score(holdout);
        (Some(rmse), Some(mae))
    } else {
        (None, None)
    };

    Evaluation {
        train_rmse,
        train_mae,
        holdout_rmse,
        holdout_mae,
    }
}

//! Regression metrics for model evaluation.

// =============================================================================
// Metric Trait
// =============================================================================

/// A metric for evaluating regression quality.
///
/// Lower is better for every metric defined here.
pub trait Metric: Send + Sync {
    /// Compute the metric over paired predictions and targets.
    ///
    /// Returns 0 for empty input.
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64;

    /// Name of the metric (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl Metric for Rmse {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        if predictions.is_empty() {
            return 0.0;
        }
        let mse = predictions
            .iter()
            .zip(targets)
            .map(|(p, l)| {
                let diff = *p as f64 - *l as f64;
                diff * diff
            })
            .sum::<f64>()
            / predictions.len() as f64;
        mse.sqrt()
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// MAE (Mean Absolute Error)
// =============================================================================

/// Mean Absolute Error: mean(|pred - label|)
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl Metric for Mae {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        debug_assert_eq!(predictions.len(), targets.len());
        if predictions.is_empty() {
            return 0.0;
        }
        predictions
            .iter()
            .zip(targets)
            .map(|(p, l)| (*p as f64 - *l as f64).abs())
            .sum::<f64>()
            / predictions.len() as f64
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

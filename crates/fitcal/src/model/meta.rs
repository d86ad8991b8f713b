//! Model metadata.
//!
//! What a trained model knows about its own training run: row counts, the
//! range of targets it saw, and how well it fits each partition.

use serde::{Deserialize, Serialize};

/// Error metrics on the training and holdout partitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub train_rmse: f64,
    pub train_mae: f64,
    /// `None` when no rows were held out.
    pub holdout_rmse: Option<f64>,
    pub holdout_mae: Option<f64>,
}

/// Shared metadata for a trained model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Feature names in schema order.
    pub feature_names: Vec<String>,
    /// Rows in the prepared dataset.
    pub n_samples: usize,
    pub n_train: usize,
    pub n_holdout: usize,
    /// Smallest and largest training target. Every prediction lies in this range.
    pub target_range: (f32, f32),
    pub evaluation: Evaluation,
}

impl ModelMeta {
    /// Width of the training-target range.
    pub fn target_span(&self) -> f32 {
        self.target_range.1 - self.target_range.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_serde_roundtrip() {
        let meta = ModelMeta {
            feature_names: vec!["Age".into(), "BMI".into()],
            n_samples: 10,
            n_train: 8,
            n_holdout: 2,
            target_range: (1.0, 300.0),
            evaluation: Evaluation {
                train_rmse: 1.5,
                train_mae: 1.0,
                holdout_rmse: Some(2.5),
                holdout_mae: None,
            },
        };

        let json = serde_json::to_string(&meta).unwrap();
        let restored: ModelMeta = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, meta);
        assert_eq!(restored.target_span(), 299.0);
    }
}

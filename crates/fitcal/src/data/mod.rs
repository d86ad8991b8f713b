//! Dataset loading and preparation.
//!
//! - [`CaloriesTable`], [`ExerciseTable`]: raw CSV tables
//! - [`prepare`]: join, derive BMI, one-hot encode gender
//! - [`FeatureSchema`]: ordered feature names carried by a trained model
//! - [`train_test_split`]: seeded train/holdout partition

mod error;
mod prepare;
pub mod schema;
mod split;
mod table;

pub use error::DataError;
pub use prepare::{
    BMI_DECIMALS, JoinPolicy, PrepareOptions, PreparedDataset, PreparedRecord, bmi, prepare,
};
pub use schema::FeatureSchema;
pub use split::{Split, train_test_split};
pub use table::{CaloriesRow, CaloriesTable, ExerciseRow, ExerciseTable, Gender};

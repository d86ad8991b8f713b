//! Forest training.
//!
//! - [`ForestTrainer`]: bootstraps rows and grows one tree per seed
//! - [`TreeGrower`]: exact CART split search on squared error
//! - [`Rmse`] / [`Mae`]: evaluation metrics
//! - [`TrainingLogger`]: verbosity-gated progress events

pub mod grower;
pub mod logger;
pub mod metrics;
pub mod sampling;
pub mod trainer;

pub use grower::{GrowerParams, TreeGrower};
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{Mae, Metric, Rmse};
pub use sampling::{ColumnSampler, RowSample};
pub use trainer::{ForestParams, ForestTrainer};

//! Error types for dataset loading and preparation.

use std::io;

/// Errors raised while loading or preparing the training tables.
///
/// Every variant is fatal for initialization: a model is never fit on a
/// table that produced one of these.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("invalid value {value:?} in column {column} at row {row}")]
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },

    #[error("table is empty after joining exercise and calories on user id")]
    EmptyTable,

    #[error(
        "unmatched rows in join: {exercise} exercise row(s) and {calories} calories row(s) have no partner"
    )]
    UnmatchedRows { exercise: usize, calories: usize },

    #[error("not enough rows to train: {rows} prepared row(s) leave an empty training partition")]
    InsufficientRows { rows: usize },
}

impl DataError {
    pub(crate) fn invalid(column: &str, row: usize, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            column: column.to_string(),
            row,
            value: value.into(),
        }
    }
}

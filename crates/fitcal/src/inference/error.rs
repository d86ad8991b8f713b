//! Request validation errors.

/// An inference input that cannot be turned into a feature row.
///
/// These are recoverable: the caller reports the message and asks again,
/// the model itself is unaffected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{column} must be a number, got {value:?}")]
    NotNumeric { column: String, value: String },

    #[error("{column} must be a finite number")]
    NonFinite { column: String },

    #[error("unknown gender {0:?}, expected \"male\" or \"female\"")]
    UnknownGender(String),

    #[error("{field} = {value} is outside the supported range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl ValidationError {
    pub(crate) fn not_numeric(column: &str, value: impl Into<String>) -> Self {
        Self::NotNumeric {
            column: column.to_string(),
            value: value.into(),
        }
    }

    pub(crate) fn non_finite(column: &str) -> Self {
        Self::NonFinite {
            column: column.to_string(),
        }
    }
}

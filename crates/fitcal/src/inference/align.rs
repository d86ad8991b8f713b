//! Schema alignment: loosely typed records to dense feature rows.

use std::collections::BTreeMap;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::data::FeatureSchema;

// =============================================================================
// FeatureValue / FeatureRecord
// =============================================================================

/// One input cell: a number, or text that should hold one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Text(String),
}

impl FeatureValue {
    /// Coerce to a finite number.
    ///
    /// Text is trimmed and parsed as `f64`. The result must also be finite
    /// after narrowing to the `f32` feature type.
    pub fn to_number(&self, column: &str) -> Result<f32, ValidationError> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::not_numeric(column, s.as_str()))?,
        };
        let narrowed = value as f32;
        if narrowed.is_finite() {
            Ok(narrowed)
        } else {
            Err(ValidationError::non_finite(column))
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<u32> for FeatureValue {
    fn from(v: u32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for FeatureValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Column name to value map, the input side of [`align_to_schema`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<FeatureValue>) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert or replace a column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FeatureValue>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.values.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<FeatureValue> {
        self.values.remove(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Columns in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<FeatureValue>> FromIterator<(K, V)> for FeatureRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

// =============================================================================
// align_to_schema
// =============================================================================

/// Reorder `record` into a dense row in `schema` order.
///
/// Schema columns missing from the record are filled with 0. Record columns
/// the schema does not know are dropped.
///
/// # Errors
///
/// - [`ValidationError::NotNumeric`] if a schema column holds unparsable text
/// - [`ValidationError::NonFinite`] if a schema column is NaN or infinite
pub fn align_to_schema(
    record: &FeatureRecord,
    schema: &FeatureSchema,
) -> Result<Array1<f32>, ValidationError> {
    let mut row = Vec::with_capacity(schema.n_features());
    for name in schema.iter() {
        let value = match record.get(name) {
            Some(v) => v.to_number(name)?,
            None => 0.0,
        };
        row.push(value);
    }

    for (name, _) in record.iter().filter(|(name, _)| !schema.contains(name)) {
        tracing::debug!(column = name, "dropping column not in feature schema");
    }

    Ok(Array1::from(row))
}

//! Feature schema: the ordered column names a trained model expects.
//!
//! The schema is produced once by [`prepare`](super::prepare) and travels with
//! the [`TrainedModel`](crate::model::TrainedModel). Every inference input is
//! aligned against it, so its order is part of the model contract.

use std::collections::HashMap;

/// Column name of the age feature.
pub const AGE: &str = "Age";
/// Column name of the derived body-mass-index feature.
pub const BMI: &str = "BMI";
/// Column name of the session duration feature (minutes).
pub const DURATION: &str = "Duration";
/// Column name of the heart rate feature (bpm).
pub const HEART_RATE: &str = "Heart_Rate";
/// Column name of the body temperature feature (°C).
pub const BODY_TEMP: &str = "Body_Temp";
/// Column name of the drop-first gender indicator. "female" is the implicit baseline.
pub const GENDER_MALE: &str = "Gender_male";
/// Column name of the regression target.
pub const CALORIES: &str = "Calories";

/// Ordered feature columns produced by preparation.
///
/// Numeric columns keep their selection order; the gender indicator is
/// appended after them, the way a drop-first encoder lays out dummies.
pub const FEATURE_COLUMNS: [&str; 6] = [AGE, BMI, DURATION, HEART_RATE, BODY_TEMP, GENDER_MALE];

/// Ordered list of feature names a model was fit against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Create a schema from ordered names.
    ///
    /// Duplicate names keep their first position in the lookup index.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        Self { names, index }
    }

    /// The schema produced by [`prepare`](super::prepare).
    pub fn calories() -> Self {
        Self::new(FEATURE_COLUMNS)
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.names.len()
    }

    /// Feature names in model order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of `name`, if it is part of the schema.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Whether `name` is part of the schema.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate over names in model order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calories_schema_order() {
        let schema = FeatureSchema::calories();
        assert_eq!(
            schema.names(),
            &["Age", "BMI", "Duration", "Heart_Rate", "Body_Temp", "Gender_male"]
        );
        assert_eq!(schema.position(GENDER_MALE), Some(5));
        assert_eq!(schema.position("Gender_female"), None);
        assert!(!schema.contains(CALORIES));
    }

    #[test]
    fn duplicate_names_keep_first_position() {
        let schema = FeatureSchema::new(["a", "b", "a"]);
        assert_eq!(schema.n_features(), 3);
        assert_eq!(schema.position("a"), Some(0));
    }
}

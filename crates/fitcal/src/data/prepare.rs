//! Feature preparation: join, derive BMI, select and encode.
//!
//! [`prepare`] turns the two raw tables into a [`PreparedDataset`]: a
//! sample-major `f32` feature matrix in [`FeatureSchema`] order plus the
//! calories target.

use std::collections::HashMap;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::error::DataError;
use super::schema::FeatureSchema;
use super::table::{CaloriesTable, ExerciseTable, Gender};
use crate::utils::round_to;

/// Decimal places kept on the derived BMI column.
pub const BMI_DECIMALS: u32 = 2;

/// Body-mass index from height (cm) and weight (kg), rounded to two decimals.
///
/// Rounding is half away from zero. Returns `None` when height is not positive.
pub fn bmi(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if height_cm <= 0.0 || !height_cm.is_finite() || !weight_kg.is_finite() {
        return None;
    }
    let metres = height_cm / 100.0;
    Some(round_to(weight_kg / (metres * metres), BMI_DECIMALS))
}

// =============================================================================
// Options
// =============================================================================

/// How exercise rows without a calories partner (and vice versa) are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JoinPolicy {
    /// Inner join: unmatched rows are dropped and reported in the log.
    #[default]
    Inner,
    /// Every row must find a partner; otherwise preparation fails.
    Exact,
}

/// Options for [`prepare`].
#[derive(Clone, Debug, Default)]
pub struct PrepareOptions {
    pub join: JoinPolicy,
}

// =============================================================================
// PreparedRecord / PreparedDataset
// =============================================================================

/// One joined, encoded row.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRecord {
    pub gender_male: f32,
    pub age: f32,
    pub bmi: f32,
    pub duration: f32,
    pub heart_rate: f32,
    pub body_temp: f32,
    pub calories: f32,
}

/// Prepared feature table and target.
///
/// Features are stored sample-major: `[n_samples, n_features]`, columns in
/// [`FeatureSchema`] order.
#[derive(Clone, Debug)]
pub struct PreparedDataset {
    features: Array2<f32>,
    targets: Array1<f32>,
    schema: FeatureSchema,
}

impl PreparedDataset {
    /// Assemble a dataset from parts.
    ///
    /// Returns `None` if shapes disagree with each other or with the schema.
    pub fn from_parts(
        features: Array2<f32>,
        targets: Array1<f32>,
        schema: FeatureSchema,
    ) -> Option<Self> {
        if features.nrows() != targets.len() || features.ncols() != schema.n_features() {
            return None;
        }
        Some(Self {
            features,
            targets,
            schema,
        })
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    pub fn targets(&self) -> ArrayView1<'_, f32> {
        self.targets.view()
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Read back row `idx` as a record, looking columns up by name.
    ///
    /// Columns missing from the schema read as 0.
    pub fn record(&self, idx: usize) -> Option<PreparedRecord> {
        if idx >= self.n_samples() {
            return None;
        }
        let row = self.features.row(idx);
        let col = |name: &str| self.schema.position(name).map(|i| row[i]).unwrap_or(0.0);
        Some(PreparedRecord {
            gender_male: col(super::schema::GENDER_MALE),
            age: col(super::schema::AGE),
            bmi: col(super::schema::BMI),
            duration: col(super::schema::DURATION),
            heart_rate: col(super::schema::HEART_RATE),
            body_temp: col(super::schema::BODY_TEMP),
            calories: self.targets[idx],
        })
    }

    /// Select a subset of rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(ndarray::Axis(0), indices),
            targets: self.targets.select(ndarray::Axis(0), indices),
            schema: self.schema.clone(),
        }
    }

    /// Minimum and maximum target value, or `None` for an empty dataset.
    pub fn target_range(&self) -> Option<(f32, f32)> {
        self.targets.iter().fold(None, |acc, &y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        })
    }
}

// =============================================================================
// prepare
// =============================================================================

/// Join exercise sessions with calories and build the feature table.
///
/// Rows are joined on user id in exercise-table order; a user with several
/// calories rows yields one joined row per match.
///
/// # Errors
///
/// - [`DataError::UnmatchedRows`] with [`JoinPolicy::Exact`] when any row lacks a partner
/// - [`DataError::InvalidValue`] when a height makes BMI undefined
/// - [`DataError::EmptyTable`] when nothing survives the join
pub fn prepare(
    calories: &CaloriesTable,
    exercise: &ExerciseTable,
    options: &PrepareOptions,
) -> Result<PreparedDataset, DataError> {
    let mut by_user: HashMap<&str, Vec<f64>> = HashMap::with_capacity(calories.len());
    for row in calories.rows() {
        by_user.entry(row.user_id.as_str()).or_default().push(row.calories);
    }

    let schema = FeatureSchema::calories();
    let n_features = schema.n_features();
    let mut features = Vec::with_capacity(exercise.len() * n_features);
    let mut targets = Vec::with_capacity(exercise.len());
    let mut unmatched_exercise = 0usize;
    let mut matched_users = std::collections::HashSet::new();

    for (i, row) in exercise.rows().iter().enumerate() {
        let Some(matches) = by_user.get(row.user_id.as_str()) else {
            unmatched_exercise += 1;
            continue;
        };
        matched_users.insert(row.user_id.as_str());

        let bmi = bmi(row.height, row.weight)
            .ok_or_else(|| DataError::invalid("Height", i + 1, row.height.to_string()))?;
        let encoded = encode(row.gender, row.age, bmi, row.duration, row.heart_rate, row.body_temp);

        for &y in matches {
            features.extend_from_slice(&encoded);
            targets.push(y as f32);
        }
    }

    let unmatched_calories: usize = by_user
        .iter()
        .filter(|(user, _)| !matched_users.contains(*user))
        .map(|(_, rows)| rows.len())
        .sum();

    if unmatched_exercise > 0 || unmatched_calories > 0 {
        match options.join {
            JoinPolicy::Exact => {
                return Err(DataError::UnmatchedRows {
                    exercise: unmatched_exercise,
                    calories: unmatched_calories,
                });
            }
            JoinPolicy::Inner => tracing::warn!(
                exercise = unmatched_exercise,
                calories = unmatched_calories,
                "dropped rows without a join partner"
            ),
        }
    }

    if targets.is_empty() {
        return Err(DataError::EmptyTable);
    }

    let n_samples = targets.len();
    let features = Array2::from_shape_vec((n_samples, n_features), features)
        .map_err(|_| DataError::EmptyTable)?;

    tracing::info!(rows = n_samples, features = n_features, "prepared training table");

    Ok(PreparedDataset {
        features,
        targets: Array1::from(targets),
        schema,
    })
}

/// Encode one session into [`FeatureSchema::calories`] order.
fn encode(
    gender: Gender,
    age: f64,
    bmi: f64,
    duration: f64,
    heart_rate: f64,
    body_temp: f64,
) -> [f32; 6] {
    [
        age as f32,
        bmi as f32,
        duration as f32,
        heart_rate as f32,
        body_temp as f32,
        gender.male_indicator(),
    ]
}

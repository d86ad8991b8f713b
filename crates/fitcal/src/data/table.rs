//! Raw CSV tables: calories per user and exercise sessions.
//!
//! Both loaders check the header row before reading data so that a missing
//! column is reported by name instead of surfacing as a per-row parse error.
//! Header lookup accepts the dataset spelling (`User_ID`, `Heart_Rate`,
//! `Body_Temp`) as well as the compact one (`UserID`, `HeartRate`, `BodyTemp`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use super::error::DataError;

const USER_ID: &[&str] = &["User_ID", "UserID", "user_id"];
const CALORIES: &[&str] = &["Calories"];
const GENDER: &[&str] = &["Gender"];
const AGE: &[&str] = &["Age"];
const HEIGHT: &[&str] = &["Height"];
const WEIGHT: &[&str] = &["Weight"];
const DURATION: &[&str] = &["Duration"];
const HEART_RATE: &[&str] = &["Heart_Rate", "HeartRate"];
const BODY_TEMP: &[&str] = &["Body_Temp", "BodyTemp"];

// =============================================================================
// Gender
// =============================================================================

/// Gender category of a session.
///
/// `Female` is the reference category of the drop-first encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Parse a gender label, ignoring case and surrounding whitespace.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("male") {
            Some(Self::Male)
        } else if label.eq_ignore_ascii_case("female") {
            Some(Self::Female)
        } else {
            None
        }
    }

    /// Value of the `Gender_male` indicator column.
    #[inline]
    pub fn male_indicator(self) -> f32 {
        match self {
            Self::Male => 1.0,
            Self::Female => 0.0,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Female => f.write_str("female"),
            Self::Male => f.write_str("male"),
        }
    }
}

// =============================================================================
// Rows
// =============================================================================

/// One row of the calories table.
#[derive(Clone, Debug, PartialEq)]
pub struct CaloriesRow {
    pub user_id: String,
    pub calories: f64,
}

/// One exercise session.
///
/// Height is in centimetres, weight in kilograms, duration in minutes,
/// heart rate in bpm and body temperature in °C.
#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseRow {
    pub user_id: String,
    pub gender: Gender,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    pub duration: f64,
    pub heart_rate: f64,
    pub body_temp: f64,
}

// =============================================================================
// Tables
// =============================================================================

/// Calories burned per user.
#[derive(Clone, Debug, Default)]
pub struct CaloriesTable {
    rows: Vec<CaloriesRow>,
}

impl CaloriesTable {
    pub fn new(rows: Vec<CaloriesRow>) -> Self {
        Self { rows }
    }

    /// Load from a CSV file with a header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::from_reader(File::open(path.as_ref())?)
    }

    /// Load from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut reader = csv_reader(reader);
        let headers = reader.headers()?.clone();
        let user_id = resolve(&headers, USER_ID)?;
        let calories = resolve(&headers, CALORIES)?;

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = i + 1;
            rows.push(CaloriesRow {
                user_id: text(&record, user_id, USER_ID[0], row)?,
                calories: number(&record, calories, CALORIES[0], row)?,
            });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[CaloriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Exercise sessions with physiological measurements.
#[derive(Clone, Debug, Default)]
pub struct ExerciseTable {
    rows: Vec<ExerciseRow>,
}

impl ExerciseTable {
    pub fn new(rows: Vec<ExerciseRow>) -> Self {
        Self { rows }
    }

    /// Load from a CSV file with a header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        Self::from_reader(File::open(path.as_ref())?)
    }

    /// Load from any CSV source with a header row.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut reader = csv_reader(reader);
        let headers = reader.headers()?.clone();
        let cols = [
            resolve(&headers, USER_ID)?,
            resolve(&headers, GENDER)?,
            resolve(&headers, AGE)?,
            resolve(&headers, HEIGHT)?,
            resolve(&headers, WEIGHT)?,
            resolve(&headers, DURATION)?,
            resolve(&headers, HEART_RATE)?,
            resolve(&headers, BODY_TEMP)?,
        ];

        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let row = i + 1;
            let gender_label = text(&record, cols[1], GENDER[0], row)?;
            let gender = Gender::parse(&gender_label)
                .ok_or_else(|| DataError::invalid(GENDER[0], row, gender_label))?;

            rows.push(ExerciseRow {
                user_id: text(&record, cols[0], USER_ID[0], row)?,
                gender,
                age: number(&record, cols[2], AGE[0], row)?,
                height: number(&record, cols[3], HEIGHT[0], row)?,
                weight: number(&record, cols[4], WEIGHT[0], row)?,
                duration: number(&record, cols[5], DURATION[0], row)?,
                heart_rate: number(&record, cols[6], HEART_RATE[0], row)?,
                body_temp: number(&record, cols[7], BODY_TEMP[0], row)?,
            });
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ExerciseRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Find the index of the first header matching any alias.
fn resolve(headers: &StringRecord, aliases: &[&str]) -> Result<usize, DataError> {
    headers
        .iter()
        .position(|h| aliases.contains(&h))
        .ok_or_else(|| DataError::MissingColumn(aliases[0].to_string()))
}

fn text(record: &StringRecord, idx: usize, column: &str, row: usize) -> Result<String, DataError> {
    match record.get(idx) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        Some(v) => Err(DataError::invalid(column, row, v)),
        None => Err(DataError::invalid(column, row, "")),
    }
}

fn number(record: &StringRecord, idx: usize, column: &str, row: usize) -> Result<f64, DataError> {
    let raw = record.get(idx).unwrap_or("");
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DataError::invalid(column, row, raw)),
    }
}

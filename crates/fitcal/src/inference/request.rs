//! Typed inference requests and front-end input handling.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::align::FeatureRecord;
use super::error::ValidationError;
use crate::data::schema::{AGE, BMI, BODY_TEMP, DURATION, GENDER_MALE, HEART_RATE};
use crate::data::{Gender, bmi};

// =============================================================================
// InferenceRequest
// =============================================================================

/// One prediction request as a front-end submits it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    #[serde(rename = "Age")]
    pub age: u32,
    #[serde(rename = "BMI")]
    pub bmi: f64,
    /// Minutes.
    #[serde(rename = "Duration")]
    pub duration: u32,
    /// Beats per minute.
    #[serde(rename = "HeartRate")]
    pub heart_rate: u32,
    /// Degrees Celsius.
    #[serde(rename = "BodyTemp")]
    pub body_temp: f64,
    #[serde(rename = "Gender")]
    pub gender: Gender,
}

impl InferenceRequest {
    /// Build a request from height (cm) and weight (kg) instead of BMI.
    ///
    /// BMI is derived and rounded exactly as during preparation.
    ///
    /// # Errors
    ///
    /// [`ValidationError::OutOfRange`] on `Height` if it is not positive.
    pub fn from_body_measurements(
        age: u32,
        height_cm: f64,
        weight_kg: f64,
        duration: u32,
        heart_rate: u32,
        body_temp: f64,
        gender: Gender,
    ) -> Result<Self, ValidationError> {
        let bmi = bmi(height_cm, weight_kg).ok_or(ValidationError::OutOfRange {
            field: "Height",
            value: height_cm,
            min: 0.0,
            max: f64::INFINITY,
        })?;
        Ok(Self {
            age,
            bmi,
            duration,
            heart_rate,
            body_temp,
            gender,
        })
    }

    /// Feature record keyed by schema column names.
    pub fn to_record(&self) -> FeatureRecord {
        FeatureRecord::new()
            .with(AGE, self.age)
            .with(BMI, self.bmi)
            .with(DURATION, self.duration)
            .with(HEART_RATE, self.heart_rate)
            .with(BODY_TEMP, self.body_temp)
            .with(GENDER_MALE, self.gender.male_indicator() as f64)
    }
}

// =============================================================================
// InputRanges
// =============================================================================

/// Ranges a front-end offers for each input.
///
/// The predictor accepts any finite input; these are only checked where a
/// caller asks for it.
#[derive(Clone, Debug, PartialEq)]
pub struct InputRanges {
    pub age: RangeInclusive<f64>,
    pub bmi: RangeInclusive<f64>,
    pub duration: RangeInclusive<f64>,
    pub heart_rate: RangeInclusive<f64>,
    pub body_temp: RangeInclusive<f64>,
}

impl InputRanges {
    pub const DEFAULT: InputRanges = InputRanges {
        age: 10.0..=100.0,
        bmi: 15.0..=40.0,
        duration: 0.0..=35.0,
        heart_rate: 60.0..=130.0,
        body_temp: 36.0..=42.0,
    };

    /// Check every field of `request`; the first violation is returned.
    pub fn check(&self, request: &InferenceRequest) -> Result<(), ValidationError> {
        let fields = [
            ("Age", request.age as f64, &self.age),
            ("BMI", request.bmi, &self.bmi),
            ("Duration", request.duration as f64, &self.duration),
            ("HeartRate", request.heart_rate as f64, &self.heart_rate),
            ("BodyTemp", request.body_temp, &self.body_temp),
        ];
        for (field, value, range) in fields {
            if !range.contains(&value) {
                return Err(ValidationError::OutOfRange {
                    field,
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }
        Ok(())
    }
}

impl Default for InputRanges {
    fn default() -> Self {
        Self::DEFAULT
    }
}

// =============================================================================
// RequestForm
// =============================================================================

/// Raw text fields of an input form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestForm {
    pub age: String,
    pub bmi: String,
    pub duration: String,
    pub heart_rate: String,
    pub body_temp: String,
    pub gender: String,
}

impl RequestForm {
    /// Parse the form into a typed request.
    ///
    /// Age, duration and heart rate must be whole non-negative numbers.
    pub fn parse(&self) -> Result<InferenceRequest, ValidationError> {
        Ok(InferenceRequest {
            age: parse_whole("Age", &self.age)?,
            bmi: parse_real("BMI", &self.bmi)?,
            duration: parse_whole("Duration", &self.duration)?,
            heart_rate: parse_whole("HeartRate", &self.heart_rate)?,
            body_temp: parse_real("BodyTemp", &self.body_temp)?,
            gender: Gender::parse(&self.gender)
                .ok_or_else(|| ValidationError::UnknownGender(self.gender.trim().to_string()))?,
        })
    }
}

fn parse_real(column: &str, text: &str) -> Result<f64, ValidationError> {
    let value = text
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::not_numeric(column, text))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::non_finite(column))
    }
}

fn parse_whole(column: &str, text: &str) -> Result<u32, ValidationError> {
    let value = parse_real(column, text)?;
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(ValidationError::not_numeric(column, text));
    }
    Ok(value as u32)
}

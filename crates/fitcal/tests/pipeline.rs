//! End-to-end tests: CSV tables in, calorie estimates out.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use approx::assert_abs_diff_eq;
use rstest::rstest;

use fitcal::data::{PrepareOptions, prepare};
use fitcal::testing::{calories_csv, exercise_csv, synthetic_tables};
use fitcal::{
    CaloriesTable, ExerciseTable, FeatureRecord, FitOptions, ForestConfig, Gender, InferenceRequest,
    InputRanges, PipelineConfig, TrainedModel, ValidationError, initialize,
};

// =============================================================================
// Fixtures
// =============================================================================

const CALORIES_SCENARIO: &str = "User_ID,Calories\n1,100\n";
const EXERCISE_SCENARIO: &str =
    "User_ID,Gender,Age,Height,Weight,Duration,Heart_Rate,Body_Temp\n1,male,30,180,80,20,100,38.0\n";

fn small_fit() -> FitOptions {
    FitOptions::new(
        ForestConfig::builder()
            .n_trees(40)
            .n_threads(1)
            .build()
            .unwrap(),
    )
}

/// Write the synthetic tables to a per-test directory and return both paths.
fn write_tables(name: &str, n_users: usize) -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!("fitcal-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let (calories, exercise) = synthetic_tables(n_users, 7);
    let calories_path = dir.join("calories.csv");
    let exercise_path = dir.join("exercise.csv");
    std::fs::write(&calories_path, calories_csv(&calories).unwrap()).unwrap();
    std::fs::write(&exercise_path, exercise_csv(&exercise).unwrap()).unwrap();
    (calories_path, exercise_path)
}

fn shared_model() -> &'static TrainedModel {
    static MODEL: OnceLock<TrainedModel> = OnceLock::new();
    MODEL.get_or_init(|| {
        let (calories_path, exercise_path) = write_tables("shared", 300);
        let config = PipelineConfig::builder()
            .calories_path(calories_path)
            .exercise_path(exercise_path)
            .fit(small_fit())
            .build()
            .unwrap();
        initialize(&config).unwrap()
    })
}

fn request() -> InferenceRequest {
    InferenceRequest {
        age: 30,
        bmi: 24.69,
        duration: 20,
        heart_rate: 100,
        body_temp: 38.0,
        gender: Gender::Male,
    }
}

// =============================================================================
// Preparation
// =============================================================================

#[test]
fn scenario_prepared_record() {
    let calories = CaloriesTable::from_reader(CALORIES_SCENARIO.as_bytes()).unwrap();
    let exercise = ExerciseTable::from_reader(EXERCISE_SCENARIO.as_bytes()).unwrap();
    let dataset = prepare(&calories, &exercise, &PrepareOptions::default()).unwrap();

    assert_eq!(dataset.n_samples(), 1);
    assert_eq!(
        dataset.schema().names(),
        ["Age", "BMI", "Duration", "Heart_Rate", "Body_Temp", "Gender_male"]
    );
    let record = dataset.record(0).unwrap();
    assert_eq!(record.gender_male, 1.0);
    assert_eq!(record.age, 30.0);
    assert_abs_diff_eq!(record.bmi, 24.69, epsilon = 1e-6);
    assert_eq!(record.duration, 20.0);
    assert_eq!(record.heart_rate, 100.0);
    assert_eq!(record.body_temp, 38.0);
    assert_eq!(record.calories, 100.0);
}

#[test]
fn schema_is_stable_across_runs() {
    let (calories, exercise) = synthetic_tables(50, 1);
    let a = prepare(&calories, &exercise, &PrepareOptions::default()).unwrap();
    let b = prepare(&calories, &exercise, &PrepareOptions::default()).unwrap();
    assert_eq!(a.schema(), b.schema());
    assert_eq!(a.features(), b.features());
}

// =============================================================================
// Initialization
// =============================================================================

#[test]
fn initialize_fits_from_files() {
    let model = shared_model();
    let meta = model.meta();
    assert_eq!(meta.n_samples, 300);
    assert_eq!(meta.n_holdout, 60);
    assert_eq!(meta.n_train, 240);
    assert_eq!(model.forest().n_trees(), 40);
    // The synthetic target is smooth; a 40-tree forest should explain most of it.
    let holdout_mae = meta.evaluation.holdout_mae.unwrap();
    assert!(holdout_mae < 40.0, "holdout mae = {holdout_mae}");
}

#[test]
fn initialization_is_deterministic() {
    let (calories_path, exercise_path) = write_tables("determinism", 120);
    let config = PipelineConfig::builder()
        .calories_path(calories_path)
        .exercise_path(exercise_path)
        .fit(small_fit())
        .build()
        .unwrap();
    let a = initialize(&config).unwrap();
    let b = initialize(&config).unwrap();
    assert_eq!(a.schema(), b.schema());
    assert_eq!(a.predict(&request()).unwrap(), b.predict(&request()).unwrap());
}

#[test]
fn thread_count_does_not_change_predictions() {
    let (calories, exercise) = synthetic_tables(150, 2);
    let dataset = prepare(&calories, &exercise, &PrepareOptions::default()).unwrap();
    let fit = |threads: usize| {
        let config = ForestConfig::builder()
            .n_trees(16)
            .n_threads(threads)
            .build()
            .unwrap();
        TrainedModel::fit(&dataset, &FitOptions::new(config)).unwrap()
    };
    let sequential = fit(1);
    let parallel = fit(4);
    assert_eq!(
        sequential.predict(&request()).unwrap(),
        parallel.predict(&request()).unwrap()
    );
    assert_eq!(sequential.meta(), parallel.meta());
}

// =============================================================================
// Prediction
// =============================================================================

#[test]
fn predict_is_deterministic() {
    let model = shared_model();
    let first = model.predict(&request()).unwrap();
    for _ in 0..5 {
        assert_eq!(model.predict(&request()).unwrap(), first);
    }
}

#[test]
fn female_request_maps_to_reference_category() {
    let model = shared_model();
    let female = InferenceRequest {
        gender: Gender::Female,
        ..request()
    };
    // Dropping the indicator column must read as female.
    let mut record = request().to_record();
    record.remove("Gender_male");
    assert_eq!(
        model.predict_record(&record).unwrap(),
        model.predict(&female).unwrap()
    );
}

#[rstest]
#[case(10)]
#[case(100)]
fn age_endpoints_are_accepted(#[case] age: u32) {
    let request = InferenceRequest { age, ..request() };
    assert!(InputRanges::DEFAULT.check(&request).is_ok());
    let value = shared_model().predict_rounded(&request).unwrap();
    assert!(value.is_finite());
}

#[rstest]
#[case(0, 60, 36.0)]
#[case(35, 130, 42.0)]
#[case(200, 10, 20.0)]
fn out_of_range_inputs_still_predict(
    #[case] duration: u32,
    #[case] heart_rate: u32,
    #[case] body_temp: f64,
) {
    let request = InferenceRequest {
        duration,
        heart_rate,
        body_temp,
        ..request()
    };
    assert!(shared_model().predict(&request).unwrap().is_finite());
}

#[test]
fn training_rows_predict_within_target_range() {
    let model = shared_model();
    let (calories, exercise) = synthetic_tables(300, 7);
    let (lo, hi) = model.meta().target_range;
    for (cal, ex) in calories.rows().iter().zip(exercise.rows()).take(25) {
        let request = InferenceRequest::from_body_measurements(
            ex.age as u32,
            ex.height,
            ex.weight,
            ex.duration as u32,
            ex.heart_rate as u32,
            ex.body_temp,
            ex.gender,
        )
        .unwrap();
        let pred = model.predict(&request).unwrap();
        assert!(pred.is_finite());
        assert!(pred >= lo as f64 - 1e-3 && pred <= hi as f64 + 1e-3);
        assert!(cal.calories >= 1.0);
    }
}

#[test]
fn non_numeric_input_is_a_validation_error() {
    let model = shared_model();
    let record = request().to_record().with("Duration", "twenty");
    let err = model.predict_record(&record).unwrap_err();
    assert_eq!(
        err,
        ValidationError::NotNumeric {
            column: "Duration".into(),
            value: "twenty".into()
        }
    );
    // The model keeps serving afterwards.
    assert!(model.predict(&request()).is_ok());
}

#[test]
fn unknown_columns_are_dropped() {
    let model = shared_model();
    let with_extra: FeatureRecord = request()
        .to_record()
        .with("User_ID", "12345")
        .with("Height", 180.0);
    assert_eq!(
        model.predict_record(&with_extra).unwrap(),
        model.predict(&request()).unwrap()
    );
}

#[test]
fn model_is_shareable_across_threads() {
    let model = Arc::new(shared_model().clone());
    let expected = model.predict(&request()).unwrap();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let model = Arc::clone(&model);
            std::thread::spawn(move || model.predict(&request()).unwrap())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

use rand::prelude::*;

use crate::data::{CaloriesRow, CaloriesTable, ExerciseRow, ExerciseTable, Gender};

/// Calories burned per session from an energy-expenditure regression on
/// heart rate, weight and age, split by gender.
pub fn reference_calories(
    gender: Gender,
    age: f64,
    weight: f64,
    duration: f64,
    heart_rate: f64,
) -> f64 {
    let per_minute = match gender {
        Gender::Male => -55.0969 + 0.6309 * heart_rate + 0.1988 * weight + 0.2017 * age,
        Gender::Female => -20.4022 + 0.4472 * heart_rate - 0.1263 * weight + 0.074 * age,
    } / 4.184;
    (per_minute * duration).max(1.0)
}

/// Generate `n_users` synthetic sessions and their calories.
///
/// Each user appears once in each table, in the same order. Measurements
/// stay inside the ranges a front-end offers; calories follow
/// [`reference_calories`] rounded to whole numbers, as in the real dataset.
pub fn synthetic_tables(n_users: usize, seed: u64) -> (CaloriesTable, ExerciseTable) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut calories = Vec::with_capacity(n_users);
    let mut exercise = Vec::with_capacity(n_users);

    for i in 0..n_users {
        let user_id = (10_000_000 + i).to_string();
        let gender = if rng.r#gen::<bool>() {
            Gender::Male
        } else {
            Gender::Female
        };
        let age = rng.gen_range(20u32..80) as f64;
        let height = match gender {
            Gender::Male => rng.gen_range(165u32..200),
            Gender::Female => rng.gen_range(150u32..185),
        } as f64;
        let bmi = rng.gen_range(19.0..30.0);
        let weight = (bmi * (height / 100.0) * (height / 100.0)).round();
        let duration = rng.gen_range(1u32..31) as f64;
        let heart_rate = (75.0 + duration * 1.3 + rng.gen_range(-5.0..5.0)).round().min(128.0);
        let body_temp = (37.0 + duration * 0.09 + rng.gen_range(-0.3..0.3)).min(41.5);
        let body_temp = (body_temp * 10.0).round() / 10.0;

        let burned = reference_calories(gender, age, weight, duration, heart_rate).round();

        calories.push(CaloriesRow {
            user_id: user_id.clone(),
            calories: burned,
        });
        exercise.push(ExerciseRow {
            user_id,
            gender,
            age,
            height,
            weight,
            duration,
            heart_rate,
            body_temp,
        });
    }

    (CaloriesTable::new(calories), ExerciseTable::new(exercise))
}

/// Render a calories table as CSV with the dataset headers.
pub fn calories_csv(table: &CaloriesTable) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["User_ID", "Calories"])?;
    for row in table.rows() {
        writer.write_record([row.user_id.clone(), row.calories.to_string()])?;
    }
    into_string(writer)
}

/// Render an exercise table as CSV with the dataset headers.
pub fn exercise_csv(table: &ExerciseTable) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "User_ID",
        "Gender",
        "Age",
        "Height",
        "Weight",
        "Duration",
        "Heart_Rate",
        "Body_Temp",
    ])?;
    for row in table.rows() {
        writer.write_record([
            row.user_id.clone(),
            row.gender.to_string(),
            row.age.to_string(),
            row.height.to_string(),
            row.weight.to_string(),
            row.duration.to_string(),
            row.heart_rate.to_string(),
            row.body_temp.to_string(),
        ])?;
    }
    into_string(writer)
}

fn into_string(writer: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;
    String::from_utf8(bytes).map_err(|e| csv::Error::from(std::io::Error::other(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_deterministic_and_aligned() {
        let (c1, e1) = synthetic_tables(50, 3);
        let (c2, e2) = synthetic_tables(50, 3);
        assert_eq!(c1.rows(), c2.rows());
        assert_eq!(e1.rows(), e2.rows());
        assert!(c1
            .rows()
            .iter()
            .zip(e1.rows())
            .all(|(c, e)| c.user_id == e.user_id));
    }

    #[test]
    fn values_are_plausible() {
        let (calories, exercise) = synthetic_tables(200, 11);
        for row in exercise.rows() {
            assert!((20.0..80.0).contains(&row.age));
            assert!((1.0..=30.0).contains(&row.duration));
            assert!(row.heart_rate <= 128.0);
            assert!(row.body_temp <= 41.5);
        }
        assert!(calories.rows().iter().all(|r| r.calories >= 1.0));
    }

    #[test]
    fn csv_round_trips_through_loaders() {
        let (calories, exercise) = synthetic_tables(5, 0);
        let c = CaloriesTable::from_reader(calories_csv(&calories).unwrap().as_bytes())
            .unwrap();
        let e = ExerciseTable::from_reader(exercise_csv(&exercise).unwrap().as_bytes())
            .unwrap();
        assert_eq!(c.rows(), calories.rows());
        assert_eq!(e.rows(), exercise.rows());
    }

    #[test]
    fn longer_sessions_burn_more() {
        let short = reference_calories(Gender::Male, 30.0, 80.0, 10.0, 110.0);
        let long = reference_calories(Gender::Male, 30.0, 80.0, 20.0, 110.0);
        assert!(long > short);
    }
}

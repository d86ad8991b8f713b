//! Deterministic fixtures for tests and benchmarks.

pub mod data;

pub use data::{calories_csv, exercise_csv, reference_calories, synthetic_tables};

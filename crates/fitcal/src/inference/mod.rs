//! Inference inputs.
//!
//! Requests arrive either typed ([`InferenceRequest`]), as raw form text
//! ([`RequestForm`]) or as a loose [`FeatureRecord`]. All of them end up as a
//! dense row through [`align_to_schema`] before reaching the forest.

mod align;
mod error;
mod request;

pub use align::{FeatureRecord, FeatureValue, align_to_schema};
pub use error::ValidationError;
pub use request::{InferenceRequest, InputRanges, RequestForm};

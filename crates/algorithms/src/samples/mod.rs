//! Sample set construction
//!
//! Turns raw readings from one or more providers into a cleaned,
//! deduplicated [`airsurf_core::SampleSet`].

mod builder;
mod reading;

pub use builder::{
    build_sample_set, CleaningParams, Coordinate, DuplicatePolicy, SampleSetBuilder,
};
pub use reading::{FieldMapping, RawReading, ReadingSource};

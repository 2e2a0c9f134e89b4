//! # airsurf algorithms
//!
//! Ordinary kriging of scattered air-quality readings.
//!
//! ## Stages
//!
//! - **samples**: clean, merge and deduplicate readings from several sources
//! - **interpolation**: linear semivariogram fitting, the kriging solver, and
//!   grid evaluation
//! - **pipeline**: [`interpolate`] chains the stages and colors the result
//!
//! ## Usage
//!
//! ```ignore
//! use airsurf_algorithms::prelude::*;
//!
//! let source = ReadingSource::from_records("stations", &records, &FieldMapping::new("pm25", "lat", "lon"));
//! let out = interpolate(&[source], &InterpolationParams::default(), &ColorMap::default())?;
//! println!("{:?}", out.raster.bounds());
//! ```

pub mod cancel;
pub mod interpolation;
pub(crate) mod maybe_rayon;
pub mod pipeline;
pub mod samples;

pub use cancel::CancelToken;
pub use pipeline::{interpolate, GridParams, Interpolation, InterpolationParams, VariogramSource};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cancel::CancelToken;
    pub use crate::interpolation::{
        estimate, evaluate, fit, Estimate, EvaluateParams, FitMode, FittedVariogram,
        KrigingSystem, LinearVariogram, VariogramParams,
    };
    pub use crate::pipeline::{
        interpolate, GridParams, Interpolation, InterpolationParams, VariogramSource,
    };
    pub use crate::samples::{
        build_sample_set, CleaningParams, DuplicatePolicy, FieldMapping, RawReading,
        ReadingSource, SampleSetBuilder,
    };
    pub use airsurf_colormap::{render, ColorMap, ColorScheme, GeoreferencedRaster, ValueRange};
    pub use airsurf_core::prelude::*;
}

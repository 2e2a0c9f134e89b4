//! # airsurf core
//!
//! Core types for the airsurf interpolation engine.
//!
//! This crate provides:
//! - `Sample` / `SampleSet`: geo-tagged measurements with distinct coordinates
//! - `GridSpec`: regular lon/lat query grids
//! - `Surface`: dense kriging output aligned to a grid
//! - `GeoTransform` / `GeoBounds`: georeferencing for rendered rasters
//! - Great-circle distance used by every spatial computation

pub mod bounds;
pub mod error;
pub mod geodesy;
pub mod grid;
pub mod raster;
pub mod sample;

pub use bounds::GeoBounds;
pub use error::{Error, Result};
pub use grid::GridSpec;
pub use raster::{GeoTransform, Surface, SurfaceStatistics};
pub use sample::{Sample, SampleSet};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bounds::GeoBounds;
    pub use crate::error::{Error, Result};
    pub use crate::geodesy::great_circle_km;
    pub use crate::grid::GridSpec;
    pub use crate::raster::{GeoTransform, Surface};
    pub use crate::sample::{Sample, SampleSet};
}

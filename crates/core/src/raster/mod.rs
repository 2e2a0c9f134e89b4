//! Interpolated surfaces and their georeferencing

mod geotransform;
mod surface;

pub use geotransform::GeoTransform;
pub use surface::{Surface, SurfaceStatistics};

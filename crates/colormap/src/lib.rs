//! # airsurf colormap
//!
//! Color mapping and surface-to-RGBA rendering for airsurf.
//!
//! Provides a handful of color schemes on top of a generic multi-stop
//! interpolation engine. The main entry point is [`render`], which turns an
//! interpolated [`Surface`](airsurf_core::Surface) into a
//! [`GeoreferencedRaster`] whose bounds are exactly the grid extent.
//!
//! ## Usage
//!
//! ```ignore
//! use airsurf_colormap::{render, ColorMap, ColorScheme};
//!
//! let raster = render(&surface, &grid, &ColorMap::new(ColorScheme::AirQuality))?;
//! let top_down = raster.north_up_pixels();
//! ```

mod render;
mod scheme;

pub use render::{render, ColorMap, GeoreferencedRaster, ValueRange};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};

//! Surface-to-RGBA rendering with exact georeferencing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use airsurf_core::raster::{GeoTransform, Surface};
use airsurf_core::{Error, GeoBounds, GridSpec, Result};

use crate::scheme::{evaluate, ColorScheme};

/// How surface values are normalized before color lookup.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueRange {
    /// Stretch between the surface minimum and maximum.
    #[default]
    Auto,
    /// Fixed range; values outside are clamped to the end colors.
    Fixed { min: f64, max: f64 },
}

/// Color mapping configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorMap {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Value normalization.
    pub range: ValueRange,
    /// Run the scheme from high to low (high values get the low-end color).
    pub reversed: bool,
    /// Opacity of populated cells in [0, 1].
    pub opacity: f64,
    /// Color for masked pixels (RGBA). Default: fully transparent.
    pub nodata_color: [u8; 4],
    /// Cells whose kriging variance exceeds this are rendered with
    /// `nodata_color`. Requires a surface evaluated with variance.
    pub max_variance: Option<f64>,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            scheme: ColorScheme::Viridis,
            range: ValueRange::Auto,
            reversed: true,
            opacity: 1.0,
            nodata_color: [0, 0, 0, 0],
            max_variance: None,
        }
    }
}

impl ColorMap {
    /// Create a color map with the given scheme and defaults otherwise.
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            reversed: false,
            ..Default::default()
        }
    }

    /// Create a color map with an explicit value range.
    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            range: ValueRange::Fixed { min, max },
            ..Self::new(scheme)
        }
    }

    fn validate(&self, surface: &Surface) -> Result<()> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(Error::invalid_parameter(
                "opacity",
                self.opacity,
                "must lie in [0, 1]",
            ));
        }
        if let ValueRange::Fixed { min, max } = self.range
            && !(min.is_finite() && max.is_finite() && min < max)
        {
            return Err(Error::invalid_parameter(
                "range",
                format!("{min}..{max}"),
                "must be finite with min < max",
            ));
        }
        if let Some(limit) = self.max_variance {
            if !(limit.is_finite() && limit >= 0.0) {
                return Err(Error::invalid_parameter(
                    "max_variance",
                    limit,
                    "must be finite and non-negative",
                ));
            }
            if !surface.has_variance() {
                return Err(Error::invalid_parameter(
                    "max_variance",
                    limit,
                    "surface was evaluated without variance",
                ));
            }
        }
        Ok(())
    }

    /// Resolve the (min, max) normalization range for a surface.
    pub fn resolve_range(&self, surface: &Surface) -> (f64, f64) {
        match self.range {
            ValueRange::Fixed { min, max } => (min, max),
            ValueRange::Auto => {
                let stats = surface.statistics();
                let (min, max) = (stats.min, stats.max);
                if !min.is_finite() || !max.is_finite() {
                    (0.0, 1.0)
                } else if is_flat(min, max) {
                    (min, min + 1.0)
                } else {
                    (min, max)
                }
            }
        }
    }

    /// Color for a single value against a resolved range.
    pub fn color(&self, value: f64, min: f64, max: f64) -> [u8; 4] {
        if !value.is_finite() {
            return self.nodata_color;
        }
        let mut t = if is_flat(min, max) {
            0.0
        } else {
            (value - min) / (max - min)
        };
        if self.reversed {
            t = 1.0 - t;
        }
        let alpha = (self.opacity * 255.0).round() as u8;
        evaluate(self.scheme, t).with_alpha(alpha)
    }
}

/// True when `max - min` is rounding noise relative to the endpoints.
/// Kriging identical values can leave a spread of a few ulps.
fn is_flat(min: f64, max: f64) -> bool {
    (max - min).abs() <= 1e-9 * max.abs().max(min.abs()).max(1.0)
}

/// An RGBA8 pixel buffer tied to the geographic box it covers.
///
/// Pixels are stored south-up: row 0 is the minimum-latitude edge, matching
/// row 0 of the surface it was rendered from. The bounds are always the
/// grid extent passed to [`render`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeoreferencedRaster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    bounds: GeoBounds,
    value_range: (f64, f64),
}

impl GeoreferencedRaster {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// South-up RGBA8 buffer of length `width * height * 4`.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// The (min, max) value range the colors were normalized against.
    pub fn value_range(&self) -> (f64, f64) {
        self.value_range
    }

    /// RGBA at (col, row) of the south-up buffer.
    pub fn pixel(&self, col: usize, row: usize) -> Option<[u8; 4]> {
        if col >= self.width || row >= self.height {
            return None;
        }
        let o = (row * self.width + col) * 4;
        Some([
            self.pixels[o],
            self.pixels[o + 1],
            self.pixels[o + 2],
            self.pixels[o + 3],
        ])
    }

    /// Transform for the south-up buffer.
    pub fn transform(&self) -> GeoTransform {
        GeoTransform::south_up(&self.bounds, self.width, self.height)
    }

    /// Transform for [`north_up_pixels`](Self::north_up_pixels).
    pub fn north_up_transform(&self) -> GeoTransform {
        GeoTransform::north_up(&self.bounds, self.width, self.height)
    }

    /// Copy of the buffer with rows flipped so the northern edge comes
    /// first, the order image encoders write.
    pub fn north_up_pixels(&self) -> Vec<u8> {
        let stride = self.width * 4;
        self.pixels
            .chunks_exact(stride)
            .rev()
            .flatten()
            .copied()
            .collect()
    }
}

/// Render a surface to a georeferenced RGBA raster.
///
/// One pixel per grid point; surface row 0 (`grid.y_min()`) becomes the
/// southern pixel row and the raster bounds are exactly `grid.extent()`.
///
/// # Errors
/// - [`Error::SizeMismatch`] if the surface does not match the grid
/// - [`Error::InvalidParameter`] for an invalid color map
pub fn render(surface: &Surface, grid: &GridSpec, color_map: &ColorMap) -> Result<GeoreferencedRaster> {
    if !surface.matches(grid) {
        let (er, ec) = grid.shape();
        let (ar, ac) = surface.shape();
        return Err(Error::SizeMismatch { er, ec, ar, ac });
    }
    color_map.validate(surface)?;

    let (height, width) = surface.shape();
    let (min, max) = color_map.resolve_range(surface);
    let estimate = surface.estimate();
    let variance = surface.variance();

    let mut pixels = vec![0u8; width * height * 4];
    let mut masked = 0usize;
    for ((row, col), &value) in estimate.indexed_iter() {
        let offset = (row * width + col) * 4;
        let hidden = match (color_map.max_variance, &variance) {
            (Some(limit), Some(var)) => var[(row, col)] > limit,
            _ => false,
        };
        let rgba = if hidden {
            masked += 1;
            color_map.nodata_color
        } else {
            color_map.color(value, min, max)
        };
        pixels[offset..offset + 4].copy_from_slice(&rgba);
    }

    debug!(
        width,
        height,
        min,
        max,
        masked,
        scheme = color_map.scheme.name(),
        "rendered surface"
    );

    Ok(GeoreferencedRaster {
        width,
        height,
        pixels,
        bounds: grid.extent(),
        value_range: (min, max),
    })
}

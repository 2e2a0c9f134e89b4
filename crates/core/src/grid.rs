//! Regular query grids over a geographic box

use serde::{Deserialize, Serialize};

use crate::bounds::GeoBounds;
use crate::error::{Error, Result};
use crate::sample::SampleSet;

/// A regular grid of query points.
///
/// `x` is longitude and `y` is latitude. Both axes are spaced linearly with
/// the endpoints included, so the grid has `x_count × y_count` points and the
/// outermost points lie exactly on the extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGridSpec")]
pub struct GridSpec {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    x_count: usize,
    y_count: usize,
}

#[derive(Deserialize)]
struct RawGridSpec {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    x_count: usize,
    y_count: usize,
}

impl TryFrom<RawGridSpec> for GridSpec {
    type Error = Error;

    fn try_from(raw: RawGridSpec) -> Result<Self> {
        GridSpec::new(
            raw.x_min, raw.x_max, raw.y_min, raw.y_max, raw.x_count, raw.y_count,
        )
    }
}

impl GridSpec {
    /// Create a grid specification.
    ///
    /// # Errors
    /// [`Error::InvalidGridSpec`] if a count is below 2, a bound is not
    /// finite, or `min >= max` on either axis.
    pub fn new(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        x_count: usize,
        y_count: usize,
    ) -> Result<Self> {
        if x_count < 2 || y_count < 2 {
            return Err(Error::InvalidGridSpec(format!(
                "need at least 2 points per axis, got {x_count}x{y_count}"
            )));
        }
        if ![x_min, x_max, y_min, y_max].iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidGridSpec("bounds must be finite".into()));
        }
        if x_min >= x_max {
            return Err(Error::InvalidGridSpec(format!(
                "x_min ({x_min}) must be below x_max ({x_max})"
            )));
        }
        if y_min >= y_max {
            return Err(Error::InvalidGridSpec(format!(
                "y_min ({y_min}) must be below y_max ({y_max})"
            )));
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
            x_count,
            y_count,
        })
    }

    /// Grid over a geographic box.
    pub fn from_bounds(bounds: &GeoBounds, x_count: usize, y_count: usize) -> Result<Self> {
        Self::new(
            bounds.min_lon,
            bounds.max_lon,
            bounds.min_lat,
            bounds.max_lat,
            x_count,
            y_count,
        )
    }

    /// Grid over the sample extent grown by `padding` degrees on each side.
    ///
    /// With zero padding a sample set lying on a single meridian or parallel
    /// has a degenerate extent and is rejected.
    pub fn around_samples(
        samples: &SampleSet,
        padding: f64,
        x_count: usize,
        y_count: usize,
    ) -> Result<Self> {
        if !padding.is_finite() || padding < 0.0 {
            return Err(Error::invalid_parameter(
                "padding",
                padding,
                "must be finite and non-negative",
            ));
        }
        Self::from_bounds(&samples.bounds().padded(padding), x_count, y_count)
    }

    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    pub fn x_count(&self) -> usize {
        self.x_count
    }

    pub fn y_count(&self) -> usize {
        self.y_count
    }

    /// Surface shape as (rows, cols) = (y_count, x_count).
    pub fn shape(&self) -> (usize, usize) {
        (self.y_count, self.x_count)
    }

    /// Total number of query points.
    pub fn len(&self) -> usize {
        self.x_count * self.y_count
    }

    /// Always false: a valid grid has at least 2×2 points.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Spacing between neighbouring points as (dx, dy) in degrees.
    pub fn step(&self) -> (f64, f64) {
        (
            (self.x_max - self.x_min) / (self.x_count - 1) as f64,
            (self.y_max - self.y_min) / (self.y_count - 1) as f64,
        )
    }

    /// Longitude of column `col`. The last column is exactly `x_max`.
    #[inline]
    pub fn x_at(&self, col: usize) -> f64 {
        linspace_at(self.x_min, self.x_max, self.x_count, col)
    }

    /// Latitude of row `row`. Row 0 is `y_min`, the last row is exactly `y_max`.
    #[inline]
    pub fn y_at(&self, row: usize) -> f64 {
        linspace_at(self.y_min, self.y_max, self.y_count, row)
    }

    /// Query point at (row, col) as (lat, lon).
    #[inline]
    pub fn point(&self, row: usize, col: usize) -> (f64, f64) {
        (self.y_at(row), self.x_at(col))
    }

    /// All longitudes in column order.
    pub fn x_coords(&self) -> Vec<f64> {
        (0..self.x_count).map(|c| self.x_at(c)).collect()
    }

    /// All latitudes in row order (ascending).
    pub fn y_coords(&self) -> Vec<f64> {
        (0..self.y_count).map(|r| self.y_at(r)).collect()
    }

    /// Geographic extent covered by the grid.
    pub fn extent(&self) -> GeoBounds {
        GeoBounds::new(self.y_min, self.y_max, self.x_min, self.x_max)
    }
}

#[inline]
fn linspace_at(min: f64, max: f64, count: usize, i: usize) -> f64 {
    if i + 1 == count {
        return max;
    }
    min + (max - min) * i as f64 / (count - 1) as f64
}

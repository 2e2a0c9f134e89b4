//! Interpolated surfaces

use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::error::{Error, Result};
use crate::grid::GridSpec;

/// A dense grid of kriging estimates aligned to a [`GridSpec`].
///
/// Values are stored row-major as (row, col) where row `i` is the grid's
/// `i`-th latitude counted from `y_min` and col `j` its `j`-th longitude.
/// Every cell is finite: the grid evaluator never produces a partially
/// filled surface.
///
/// # Example
///
/// ```ignore
/// let surface = evaluate(&samples, &model, &grid, &EvaluateParams::default())?;
/// let south_west = surface.get(0, 0)?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    estimate: Array2<f64>,
    variance: Option<Array2<f64>>,
}

impl Surface {
    /// Build a surface from estimate (and optional variance) arrays.
    ///
    /// # Errors
    /// [`Error::SizeMismatch`] if the variance array has a different shape.
    pub fn new(estimate: Array2<f64>, variance: Option<Array2<f64>>) -> Result<Self> {
        if let Some(var) = &variance
            && var.dim() != estimate.dim()
        {
            let (er, ec) = estimate.dim();
            let (ar, ac) = var.dim();
            return Err(Error::SizeMismatch { er, ec, ar, ac });
        }
        Ok(Self { estimate, variance })
    }

    /// Build a surface from row-major (estimate, variance) pairs for `grid`.
    pub fn from_cells(grid: &GridSpec, cells: Vec<(f64, f64)>, keep_variance: bool) -> Result<Self> {
        let (rows, cols) = grid.shape();
        if cells.len() != rows * cols {
            return Err(Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: cells.len() / cols.max(1),
                ac: cols,
            });
        }
        let (est, var): (Vec<f64>, Vec<f64>) = cells.into_iter().unzip();
        let estimate = Array2::from_shape_vec((rows, cols), est).map_err(|_| {
            Error::SizeMismatch {
                er: rows,
                ec: cols,
                ar: rows,
                ac: cols,
            }
        })?;
        let variance = if keep_variance {
            Some(Array2::from_shape_vec((rows, cols), var).map_err(|_| {
                Error::SizeMismatch {
                    er: rows,
                    ec: cols,
                    ar: rows,
                    ac: cols,
                }
            })?)
        } else {
            None
        };
        Self::new(estimate, variance)
    }

    // Dimensions

    pub fn rows(&self) -> usize {
        self.estimate.nrows()
    }

    pub fn cols(&self) -> usize {
        self.estimate.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.estimate.dim()
    }

    pub fn len(&self) -> usize {
        self.estimate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.estimate.is_empty()
    }

    // Data access

    /// Estimate at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.estimate
            .get((row, col))
            .copied()
            .ok_or(self.out_of_bounds(row, col))
    }

    /// Kriging variance at (row, col), if variance was computed.
    pub fn variance_at(&self, row: usize, col: usize) -> Result<Option<f64>> {
        match &self.variance {
            None => {
                self.get(row, col)?;
                Ok(None)
            }
            Some(var) => var
                .get((row, col))
                .copied()
                .map(Some)
                .ok_or(self.out_of_bounds(row, col)),
        }
    }

    /// View of a single row (one latitude).
    pub fn row(&self, row: usize) -> Result<ArrayView1<'_, f64>> {
        if row >= self.rows() {
            return Err(self.out_of_bounds(row, 0));
        }
        Ok(self.estimate.row(row))
    }

    pub fn estimate(&self) -> ArrayView2<'_, f64> {
        self.estimate.view()
    }

    pub fn variance(&self) -> Option<ArrayView2<'_, f64>> {
        self.variance.as_ref().map(|v| v.view())
    }

    pub fn has_variance(&self) -> bool {
        self.variance.is_some()
    }

    /// Consume the surface, returning (estimate, variance).
    pub fn into_arrays(self) -> (Array2<f64>, Option<Array2<f64>>) {
        (self.estimate, self.variance)
    }

    /// Whether the surface dimensions match `grid`.
    pub fn matches(&self, grid: &GridSpec) -> bool {
        self.shape() == grid.shape()
    }

    // Statistics

    /// Basic statistics over the estimate cells.
    pub fn statistics(&self) -> SurfaceStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for &v in self.estimate.iter() {
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        let count = self.estimate.len();
        SurfaceStatistics {
            min,
            max,
            mean: if count > 0 { sum / count as f64 } else { f64::NAN },
            count,
        }
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::IndexOutOfBounds {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }
}

/// Basic statistics for a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

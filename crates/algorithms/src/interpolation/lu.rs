//! Dense LU factorization with partial pivoting.
//!
//! The ordinary kriging matrix depends only on the sample locations, so it is
//! factorized once per run and every grid point reuses the factors with a
//! forward/back substitution.

use ndarray::Array2;
use airsurf_core::{Error, Result};

/// Pivots smaller than this fraction of the largest matrix magnitude are
/// treated as zero.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// `PA = LU` with unit-diagonal `L` stored below the diagonal of `lu`.
#[derive(Debug, Clone)]
pub struct LuFactors {
    lu: Array2<f64>,
    /// Row `k` of `PA` is row `perm[k]` of `A`
    perm: Vec<usize>,
}

impl LuFactors {
    /// Factorize a square matrix.
    ///
    /// # Errors
    /// [`Error::SingularSystem`] if a pivot falls below
    /// `SINGULAR_TOLERANCE × max|a_ij|`, or the matrix holds non-finite values.
    pub fn factorize(mut a: Array2<f64>) -> Result<Self> {
        let n = a.nrows();
        if n != a.ncols() {
            let (ar, ac) = a.dim();
            return Err(Error::SizeMismatch { er: n, ec: n, ar, ac });
        }

        let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if !scale.is_finite() || scale == 0.0 {
            return Err(Error::SingularSystem {
                pivot_index: 0,
                pivot: scale,
            });
        }
        let tol = SINGULAR_TOLERANCE * scale;
        let mut perm: Vec<usize> = (0..n).collect();

        for k in 0..n {
            let mut max_val = a[(k, k)].abs();
            let mut max_row = k;
            for row in (k + 1)..n {
                let val = a[(row, k)].abs();
                if val > max_val {
                    max_val = val;
                    max_row = row;
                }
            }

            // `!(>)` also rejects NaN
            if !(max_val > tol) {
                return Err(Error::SingularSystem {
                    pivot_index: k,
                    pivot: max_val,
                });
            }

            if max_row != k {
                for col in 0..n {
                    a.swap((k, col), (max_row, col));
                }
                perm.swap(k, max_row);
            }

            let pivot = a[(k, k)];
            for row in (k + 1)..n {
                let factor = a[(row, k)] / pivot;
                a[(row, k)] = factor;
                if factor != 0.0 {
                    for col in (k + 1)..n {
                        a[(row, col)] -= factor * a[(k, col)];
                    }
                }
            }
        }

        Ok(Self { lu: a, perm })
    }

    pub fn dim(&self) -> usize {
        self.perm.len()
    }

    /// Solve `Ax = b` against the stored factors.
    ///
    /// # Panics
    /// If `b.len()` differs from the matrix dimension.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.dim();
        assert_eq!(b.len(), n, "right-hand side length must match the system");

        let mut x: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();

        // Forward substitution with unit-diagonal L
        for i in 0..n {
            let row = self.lu.row(i);
            let mut sum = x[i];
            for j in 0..i {
                sum -= row[j] * x[j];
            }
            x[i] = sum;
        }

        // Back substitution with U
        for i in (0..n).rev() {
            let row = self.lu.row(i);
            let mut sum = x[i];
            for j in (i + 1)..n {
                sum -= row[j] * x[j];
            }
            x[i] = sum / row[i];
        }

        x
    }
}

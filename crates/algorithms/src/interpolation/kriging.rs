//! Ordinary Kriging
//!
//! Best Linear Unbiased Estimator (BLUE) for spatial data. Uses a fitted
//! semivariogram to compute interpolation weights that minimize estimation
//! variance while satisfying an unbiasedness constraint.
//!
//! The kriging system for n sample points:
//! ```text
//! [γ(x₁,x₁) ... γ(x₁,xₙ) 1] [w₁]   [γ(x₁,x₀)]
//! [   ...     ...    ...    .]  [. ] = [   ...    ]
//! [γ(xₙ,x₁) ... γ(xₙ,xₙ) 1] [wₙ]   [γ(xₙ,x₀)]
//! [  1       ...    1       0] [μ ]   [    1     ]
//! ```
//! where γ is the semivariance at great-circle distance, x₀ is the target
//! location, and μ is the Lagrange multiplier ensuring Σwᵢ = 1. The estimate
//! is Σwᵢzᵢ and the kriging variance is Σwᵢγ(xᵢ,x₀) + μ.
//!
//! The left-hand matrix does not depend on x₀, so [`KrigingSystem`]
//! factorizes it once and answers each query with one substitution pass.
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use ndarray::Array2;
use serde::Serialize;

use airsurf_core::{Error, Result, Sample, SampleSet};

use super::lu::LuFactors;
use super::variogram::LinearVariogram;

/// A query closer than this (km) to a sample returns that sample exactly.
pub const SNAP_DISTANCE_KM: f64 = 1e-9;

/// Kriging estimate at one location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Estimate {
    pub value: f64,
    /// Kriging variance (≥ 0)
    pub variance: f64,
}

/// Solution of the kriging system at one location.
#[derive(Debug, Clone, PartialEq)]
pub struct KrigingWeights {
    /// One weight per sample, in sample set order; sums to 1
    pub weights: Vec<f64>,
    /// Lagrange multiplier μ
    pub lagrange: f64,
}

#[derive(Debug, Clone)]
enum Solver {
    /// LU factors of the kriging matrix with its γ block divided by `scale`.
    /// Weights are invariant to that scaling; μ is multiplied back.
    Factorized { lu: LuFactors, scale: f64 },
    /// γ ≡ 0: every unbiased weight vector is optimal.
    Flat,
}

/// Ordinary kriging system factorized for a fixed sample set and model.
#[derive(Debug, Clone)]
pub struct KrigingSystem<'a> {
    samples: &'a [Sample],
    model: LinearVariogram,
    solver: Solver,
}

impl<'a> KrigingSystem<'a> {
    /// Build and factorize the kriging matrix.
    ///
    /// # Errors
    /// - [`Error::InsufficientData`] with fewer than 2 samples
    /// - [`Error::InvalidParameter`] for an invalid model
    /// - [`Error::SingularSystem`] if samples coincide to working precision
    pub fn new(samples: &'a SampleSet, model: &LinearVariogram) -> Result<Self> {
        let pts = samples.as_slice();
        let n = pts.len();
        if n < 2 {
            return Err(Error::InsufficientData { needed: 2, got: n });
        }
        model.validate()?;

        let m = n + 1;
        let mut mat = Array2::<f64>::zeros((m, m));
        let mut scale = 0.0_f64;
        for i in 0..n {
            for j in (i + 1)..n {
                let g = model.evaluate(pts[i].distance_to(&pts[j]));
                mat[(i, j)] = g;
                mat[(j, i)] = g;
                scale = scale.max(g);
            }
        }

        if scale == 0.0 {
            return Ok(Self {
                samples: pts,
                model: *model,
                solver: Solver::Flat,
            });
        }

        for i in 0..n {
            for j in 0..n {
                mat[(i, j)] /= scale;
            }
            mat[(i, n)] = 1.0;
            mat[(n, i)] = 1.0;
        }

        let lu = LuFactors::factorize(mat)?;
        Ok(Self {
            samples: pts,
            model: *model,
            solver: Solver::Factorized { lu, scale },
        })
    }

    /// Number of samples in the system.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn model(&self) -> &LinearVariogram {
        &self.model
    }

    /// Index of a sample within snapping distance of (lat, lon).
    fn coincident(&self, distances: &[f64]) -> Option<usize> {
        distances.iter().position(|&d| d < SNAP_DISTANCE_KM)
    }

    fn distances(&self, latitude: f64, longitude: f64) -> Vec<f64> {
        self.samples
            .iter()
            .map(|s| s.distance_km(latitude, longitude))
            .collect()
    }

    fn solve(&self, distances: &[f64]) -> Result<KrigingWeights> {
        let n = self.len();

        if let Some(idx) = self.coincident(distances) {
            let mut weights = vec![0.0; n];
            weights[idx] = 1.0;
            return Ok(KrigingWeights {
                weights,
                lagrange: 0.0,
            });
        }

        match &self.solver {
            Solver::Flat => Ok(KrigingWeights {
                weights: vec![1.0 / n as f64; n],
                lagrange: 0.0,
            }),
            Solver::Factorized { lu, scale } => {
                let mut rhs: Vec<f64> = distances
                    .iter()
                    .map(|&d| self.model.evaluate(d) / scale)
                    .collect();
                rhs.push(1.0);

                let mut x = lu.solve(&rhs);
                if let Some(bad) = x.iter().position(|v| !v.is_finite()) {
                    return Err(Error::SingularSystem {
                        pivot_index: bad,
                        pivot: f64::NAN,
                    });
                }
                let lagrange = x.pop().unwrap_or(0.0) * scale;
                Ok(KrigingWeights {
                    weights: x,
                    lagrange,
                })
            }
        }
    }

    /// Kriging weights and Lagrange multiplier at (lat, lon).
    pub fn weights(&self, latitude: f64, longitude: f64) -> Result<KrigingWeights> {
        self.solve(&self.distances(latitude, longitude))
    }

    /// Kriging estimate and variance at (lat, lon).
    pub fn estimate(&self, latitude: f64, longitude: f64) -> Result<Estimate> {
        let distances = self.distances(latitude, longitude);

        if let Some(idx) = self.coincident(&distances) {
            return Ok(Estimate {
                value: self.samples[idx].value,
                variance: 0.0,
            });
        }

        let sol = self.solve(&distances)?;
        let mut value = 0.0;
        let mut variance = sol.lagrange;
        for ((w, s), &d) in sol.weights.iter().zip(self.samples).zip(&distances) {
            value += w * s.value;
            variance += w * self.model.evaluate(d);
        }

        Ok(Estimate {
            value,
            // Round-off can push a near-zero variance slightly negative
            variance: variance.max(0.0),
        })
    }
}

/// One-shot ordinary kriging estimate at `query` = (lat, lon).
///
/// Factorizes the system for this single query; use [`KrigingSystem`] when
/// estimating many locations against the same samples.
pub fn estimate(
    samples: &SampleSet,
    model: &LinearVariogram,
    query: (f64, f64),
) -> Result<Estimate> {
    KrigingSystem::new(samples, model)?.estimate(query.0, query.1)
}

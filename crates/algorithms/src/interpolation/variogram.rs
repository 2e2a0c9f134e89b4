//! Semivariogram computation and linear model fitting
//!
//! The semivariance γ(h) measures spatial dissimilarity as a function of
//! separation distance h:
//! ```text
//! γ(h) = ½ [z(xᵢ) - z(xⱼ)]²   for a pair at great-circle distance h
//! ```
//!
//! The model is linear, `γ(h) = slope·h + nugget` for h > 0 with γ(0) = 0,
//! fitted by least squares either to the raw pair scatter or to lag-binned
//! means. Distances are great-circle kilometres.
//!
//! Reference:
//! Matheron, G. (1963). Principles of geostatistics. Economic Geology.
//! Cressie, N. (1993). Statistics for Spatial Data. Wiley.

use serde::{Deserialize, Serialize};
use tracing::debug;

use airsurf_core::{Error, Result, SampleSet};

/// Separations below this (in km) count as zero lag.
pub const ZERO_LAG_KM: f64 = 1e-9;

/// Linear semivariogram model `γ(h) = slope·h + nugget` (h in km).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearVariogram {
    /// Semivariance increase per kilometre
    pub slope: f64,
    /// Semivariance as h → 0⁺ (measurement noise + micro-scale variation)
    pub nugget: f64,
}

impl LinearVariogram {
    /// Create a model, validating both parameters.
    pub fn new(slope: f64, nugget: f64) -> Result<Self> {
        let model = Self { slope, nugget };
        model.validate()?;
        Ok(model)
    }

    /// Check that both parameters are finite and non-negative.
    pub fn validate(&self) -> Result<()> {
        if !(self.slope.is_finite() && self.slope >= 0.0) {
            return Err(Error::invalid_parameter(
                "slope",
                self.slope,
                "must be finite and non-negative",
            ));
        }
        if !(self.nugget.is_finite() && self.nugget >= 0.0) {
            return Err(Error::invalid_parameter(
                "nugget",
                self.nugget,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }

    /// Evaluate the model at distance h (km).
    #[inline]
    pub fn evaluate(&self, h: f64) -> f64 {
        if h < ZERO_LAG_KM {
            return 0.0;
        }
        self.slope * h + self.nugget
    }

    /// Whether γ is identically zero.
    pub fn is_flat(&self) -> bool {
        self.slope == 0.0 && self.nugget == 0.0
    }
}

/// How the linear model is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitMode {
    /// Least squares over every (distance, semivariance) pair.
    #[default]
    Pairwise,
    /// Least squares over lag-bin means, weighted by pair count.
    ///
    /// Bins are `n_lags` equal widths from zero to the longest pair
    /// distance (see [`empirical_variogram`]). Libraries that bin from the
    /// shortest pair distance or fit bins unweighted give different slopes
    /// on the same data.
    Binned { n_lags: usize },
}

impl FitMode {
    /// Binned fit over six zero-based lag bins.
    pub const fn binned() -> Self {
        FitMode::Binned { n_lags: 6 }
    }
}

/// Parameters for semivariogram fitting
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VariogramParams {
    pub mode: FitMode,
}

/// Fitted model with goodness-of-fit information.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FittedVariogram {
    pub model: LinearVariogram,
    /// Weighted residual sum of squares of the fit
    pub rss: f64,
    /// Number of sample pairs that went into the fit
    pub n_pairs: usize,
}

/// Empirical variogram: semivariance values at discrete lag distances.
#[derive(Debug, Clone)]
pub struct EmpiricalVariogram {
    /// Mean pair distance in each lag bin (NaN for empty bins)
    pub lags: Vec<f64>,
    /// Semivariance values γ(h) at each lag (NaN for empty bins)
    pub semivariance: Vec<f64>,
    /// Number of point pairs contributing to each lag bin
    pub pair_counts: Vec<usize>,
}

impl EmpiricalVariogram {
    /// Non-empty bins as (lag, semivariance, pair count).
    pub fn valid_bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.lags
            .iter()
            .zip(&self.semivariance)
            .zip(&self.pair_counts)
            .filter(|(_, cnt)| **cnt > 0)
            .map(|((&lag, &sv), &cnt)| (lag, sv, cnt))
    }
}

/// (great-circle distance km, semivariance) for every unordered sample pair.
pub fn pairwise_semivariance(samples: &SampleSet) -> Vec<(f64, f64)> {
    let pts = samples.as_slice();
    let n = pts.len();
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let dz = pts[i].value - pts[j].value;
            pairs.push((pts[i].distance_to(&pts[j]), 0.5 * dz * dz));
        }
    }
    pairs
}

/// Compute the empirical variogram with `n_lags` equal-width bins spanning
/// zero to the maximum pair distance.
pub fn empirical_variogram(samples: &SampleSet, n_lags: usize) -> Result<EmpiricalVariogram> {
    if samples.len() < 2 {
        return Err(Error::InsufficientData {
            needed: 2,
            got: samples.len(),
        });
    }
    if n_lags == 0 {
        return Err(Error::invalid_parameter("n_lags", n_lags, "must be at least 1"));
    }

    let pairs = pairwise_semivariance(samples);
    let max_dist = pairs.iter().fold(0.0_f64, |m, &(h, _)| m.max(h));

    let mut dist_sum = vec![0.0_f64; n_lags];
    let mut semivariance = vec![0.0_f64; n_lags];
    let mut pair_counts = vec![0_usize; n_lags];

    for &(h, sv) in &pairs {
        let bin = if max_dist > 0.0 {
            ((h / max_dist * n_lags as f64) as usize).min(n_lags - 1)
        } else {
            0
        };
        dist_sum[bin] += h;
        semivariance[bin] += sv;
        pair_counts[bin] += 1;
    }

    let mut lags = dist_sum;
    for k in 0..n_lags {
        if pair_counts[k] > 0 {
            lags[k] /= pair_counts[k] as f64;
            semivariance[k] /= pair_counts[k] as f64;
        } else {
            lags[k] = f64::NAN;
            semivariance[k] = f64::NAN;
        }
    }

    Ok(EmpiricalVariogram {
        lags,
        semivariance,
        pair_counts,
    })
}

/// Weighted least-squares fit of a non-negative linear model to
/// (distance, semivariance, weight) points.
///
/// A negative slope collapses to the mean semivariance as a pure nugget; a
/// negative intercept, or a scatter with no spread in distance, refits
/// through the origin. Returns the model and its weighted RSS.
pub fn fit_linear(points: &[(f64, f64, f64)]) -> (LinearVariogram, f64) {
    let sw: f64 = points.iter().map(|p| p.2).sum();
    if points.is_empty() || sw <= 0.0 {
        return (LinearVariogram { slope: 0.0, nugget: 0.0 }, 0.0);
    }

    let mean_h = points.iter().map(|&(h, _, w)| w * h).sum::<f64>() / sw;
    let mean_g = points.iter().map(|&(_, g, w)| w * g).sum::<f64>() / sw;
    let shh: f64 = points.iter().map(|&(h, _, w)| w * h * h).sum();

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for &(h, g, w) in points {
        let dh = h - mean_h;
        sxx += w * dh * dh;
        sxy += w * dh * (g - mean_g);
    }

    let through_origin = || {
        if shh > 0.0 {
            let shg: f64 = points.iter().map(|&(h, g, w)| w * h * g).sum();
            LinearVariogram {
                slope: shg / shh,
                nugget: 0.0,
            }
        } else {
            LinearVariogram {
                slope: 0.0,
                nugget: mean_g,
            }
        }
    };

    let model = if sxx <= 1e-12 * shh {
        through_origin()
    } else {
        let slope = sxy / sxx;
        let nugget = mean_g - slope * mean_h;
        if slope < 0.0 {
            LinearVariogram {
                slope: 0.0,
                nugget: mean_g,
            }
        } else if nugget < 0.0 {
            through_origin()
        } else {
            LinearVariogram { slope, nugget }
        }
    };

    let rss = points
        .iter()
        .map(|&(h, g, w)| {
            let r = g - (model.slope * h + model.nugget);
            w * r * r
        })
        .sum();

    (model, rss)
}

/// Fit a linear semivariogram to a sample set.
///
/// # Errors
/// - [`Error::InsufficientData`] with fewer than 2 samples
/// - [`Error::InvalidParameter`] for a binned fit with zero lags
pub fn fit(samples: &SampleSet, params: &VariogramParams) -> Result<FittedVariogram> {
    if samples.len() < 2 {
        return Err(Error::InsufficientData {
            needed: 2,
            got: samples.len(),
        });
    }

    let (points, n_pairs): (Vec<(f64, f64, f64)>, usize) = match params.mode {
        FitMode::Pairwise => {
            let pairs = pairwise_semivariance(samples);
            let n = pairs.len();
            (pairs.into_iter().map(|(h, g)| (h, g, 1.0)).collect(), n)
        }
        FitMode::Binned { n_lags } => {
            let emp = empirical_variogram(samples, n_lags)?;
            let n = emp.pair_counts.iter().sum();
            (
                emp.valid_bins()
                    .map(|(h, g, cnt)| (h, g, cnt as f64))
                    .collect(),
                n,
            )
        }
    };

    let (model, rss) = fit_linear(&points);
    debug!(
        slope = model.slope,
        nugget = model.nugget,
        rss,
        n_pairs,
        mode = ?params.mode,
        "fitted linear semivariogram"
    );

    Ok(FittedVariogram {
        model,
        rss,
        n_pairs,
    })
}

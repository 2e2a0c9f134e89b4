//! Spatial interpolation of air-quality samples
//!
//! - Variogram: empirical semivariance and linear model fitting
//! - Ordinary Kriging: BLUE estimate and variance at a single location
//! - Grid: kriging evaluated over a regular latitude/longitude grid

mod grid;
pub mod kriging;
mod lu;
pub mod variogram;

pub use grid::{evaluate, evaluate_with, EvaluateParams};
pub use kriging::{estimate, Estimate, KrigingSystem, KrigingWeights, SNAP_DISTANCE_KM};
pub use lu::{LuFactors, SINGULAR_TOLERANCE};
pub use variogram::{
    empirical_variogram, fit, fit_linear, pairwise_semivariance, EmpiricalVariogram, FitMode,
    FittedVariogram, LinearVariogram, VariogramParams, ZERO_LAG_KM,
};

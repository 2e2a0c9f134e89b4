//! End-to-end interpolation: readings in, georeferenced raster out.

use serde::{Deserialize, Serialize};
use tracing::info;

use airsurf_colormap::{render, ColorMap, GeoreferencedRaster};
use airsurf_core::{GridSpec, Result, SampleSet, Surface};

use crate::cancel::CancelToken;
use crate::interpolation::{
    evaluate_with, fit, EvaluateParams, KrigingSystem, LinearVariogram, VariogramParams,
};
use crate::samples::{build_sample_set, CleaningParams, ReadingSource};

/// Output grid layout around the sample extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// Degrees added on every side of the sample bounding box (default: 0.01)
    pub padding_deg: f64,
    /// Longitude samples (default: 100)
    pub x_count: usize,
    /// Latitude samples (default: 100)
    pub y_count: usize,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            padding_deg: 0.01,
            x_count: 100,
            y_count: 100,
        }
    }
}

impl GridParams {
    /// Grid over `samples` grown by `padding_deg`.
    pub fn resolve(&self, samples: &SampleSet) -> Result<GridSpec> {
        GridSpec::around_samples(samples, self.padding_deg, self.x_count, self.y_count)
    }
}

/// Where the semivariogram model comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariogramSource {
    /// Fit to the cleaned samples
    Fit(VariogramParams),
    /// Use a caller-supplied model
    Fixed(LinearVariogram),
}

impl Default for VariogramSource {
    fn default() -> Self {
        VariogramSource::Fit(VariogramParams::default())
    }
}

impl VariogramSource {
    pub fn resolve(&self, samples: &SampleSet) -> Result<LinearVariogram> {
        match self {
            VariogramSource::Fit(params) => Ok(fit(samples, params)?.model),
            VariogramSource::Fixed(model) => {
                model.validate()?;
                Ok(*model)
            }
        }
    }
}

/// Parameters for a full interpolation run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationParams {
    pub cleaning: CleaningParams,
    pub grid: GridParams,
    pub variogram: VariogramSource,
    /// Keep the kriging variance surface (default: true)
    pub compute_variance: bool,
    #[serde(skip)]
    pub cancel: Option<CancelToken>,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            cleaning: CleaningParams::default(),
            grid: GridParams::default(),
            variogram: VariogramSource::default(),
            compute_variance: true,
            cancel: None,
        }
    }
}

/// Everything a presentation layer needs: the colored raster plus the
/// samples, model, grid and raw surface it came from.
#[derive(Debug, Clone)]
pub struct Interpolation {
    pub raster: GeoreferencedRaster,
    pub samples: SampleSet,
    pub model: LinearVariogram,
    pub grid: GridSpec,
    pub surface: Surface,
}

/// Run the whole chain: build samples, choose a model, krige the grid,
/// and color the result.
///
/// # Errors
/// The first error of any stage; no partial output is returned.
pub fn interpolate(
    sources: &[ReadingSource],
    params: &InterpolationParams,
    color_map: &ColorMap,
) -> Result<Interpolation> {
    let samples = build_sample_set(sources, &params.cleaning)?;
    let model = params.variogram.resolve(&samples)?;
    let grid = params.grid.resolve(&samples)?;

    let system = KrigingSystem::new(&samples, &model)?;
    let evaluate_params = EvaluateParams {
        compute_variance: params.compute_variance,
        cancel: params.cancel.clone(),
    };
    let surface = evaluate_with(&system, &grid, &evaluate_params)?;
    let raster = render(&surface, &grid, color_map)?;

    let stats = surface.statistics();
    info!(
        samples = samples.len(),
        slope = model.slope,
        nugget = model.nugget,
        width = raster.width(),
        height = raster.height(),
        min = stats.min,
        max = stats.max,
        "interpolation complete"
    );

    Ok(Interpolation {
        raster,
        samples,
        model,
        grid,
        surface,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::FitMode;

    #[test]
    fn test_defaults() {
        let p = InterpolationParams::default();
        assert_eq!(p.grid.padding_deg, 0.01);
        assert_eq!((p.grid.x_count, p.grid.y_count), (100, 100));
        assert_eq!(p.variogram, VariogramSource::Fit(VariogramParams::default()));
        assert!(p.compute_variance);
        assert!(p.cancel.is_none());
    }

    #[test]
    fn test_variogram_source_json() {
        let fixed: VariogramSource =
            serde_json::from_str(r#"{"kind": "fixed", "slope": 2.0, "nugget": 1.0}"#).unwrap();
        assert_eq!(
            fixed,
            VariogramSource::Fixed(LinearVariogram::new(2.0, 1.0).unwrap())
        );

        let binned: VariogramSource = serde_json::from_str(
            r#"{"kind": "fit", "mode": {"kind": "binned", "n_lags": 4}}"#,
        )
        .unwrap();
        assert_eq!(
            binned,
            VariogramSource::Fit(VariogramParams {
                mode: FitMode::Binned { n_lags: 4 }
            })
        );

        let plain: VariogramSource = serde_json::from_str(r#"{"kind": "fit"}"#).unwrap();
        assert_eq!(plain, VariogramSource::default());
    }

    #[test]
    fn test_params_from_partial_json() {
        let p: InterpolationParams =
            serde_json::from_str(r#"{"grid": {"x_count": 20}, "compute_variance": false}"#)
                .unwrap();
        assert_eq!(p.grid.x_count, 20);
        assert_eq!(p.grid.y_count, 100);
        assert!(!p.compute_variance);
        assert!(p.cleaning.enabled);
    }

    #[test]
    fn test_fixed_model_is_validated() {
        let source = VariogramSource::Fixed(LinearVariogram {
            slope: f64::NAN,
            nugget: 0.0,
        });
        let samples = SampleSet::new(vec![
            airsurf_core::Sample::new(0.0, 0.0, 1.0).unwrap(),
            airsurf_core::Sample::new(1.0, 1.0, 2.0).unwrap(),
        ])
        .unwrap();
        assert!(source.resolve(&samples).is_err());
    }
}

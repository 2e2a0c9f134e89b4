//! Evaluate a kriging model over a regular latitude/longitude grid.
//!
//! Rows are evaluated in parallel (rayon, behind the `parallel` feature)
//! against one shared [`KrigingSystem`]. Any failing cell aborts the run:
//! a surface is either complete or not produced at all.

use tracing::debug;

use airsurf_core::{GridSpec, Result, SampleSet, Surface};

use crate::cancel::CancelToken;
use crate::maybe_rayon::*;

use super::kriging::KrigingSystem;
use super::variogram::LinearVariogram;

/// Parameters for grid evaluation
#[derive(Debug, Clone)]
pub struct EvaluateParams {
    /// Keep the kriging variance alongside the estimate (default: true)
    pub compute_variance: bool,
    /// Checked once per row; a cancelled run returns [`airsurf_core::Error::Cancelled`]
    pub cancel: Option<CancelToken>,
}

impl Default for EvaluateParams {
    fn default() -> Self {
        Self {
            compute_variance: true,
            cancel: None,
        }
    }
}

/// Krige every point of `grid`.
///
/// Row `i` of the returned surface is latitude `grid.y_at(i)`, so row 0 lies
/// on `y_min`.
///
/// # Errors
/// Anything [`KrigingSystem::new`] or [`KrigingSystem::estimate`] returns,
/// or `Cancelled`.
pub fn evaluate(
    samples: &SampleSet,
    model: &LinearVariogram,
    grid: &GridSpec,
    params: &EvaluateParams,
) -> Result<Surface> {
    let system = KrigingSystem::new(samples, model)?;
    evaluate_with(&system, grid, params)
}

/// Krige every point of `grid` against an already factorized system.
pub fn evaluate_with(
    system: &KrigingSystem<'_>,
    grid: &GridSpec,
    params: &EvaluateParams,
) -> Result<Surface> {
    let (rows, cols) = grid.shape();
    if let Some(token) = &params.cancel {
        token.check()?;
    }

    let xs = grid.x_coords();
    let row_results: Vec<Vec<(f64, f64)>> = (0..rows)
        .into_par_iter()
        .map(|row| {
            if let Some(token) = &params.cancel {
                token.check()?;
            }
            let lat = grid.y_at(row);
            xs.iter()
                .map(|&lon| {
                    let e = system.estimate(lat, lon)?;
                    Ok((e.value, e.variance))
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let cells: Vec<(f64, f64)> = row_results.into_iter().flatten().collect();
    debug!(rows, cols, samples = system.len(), "evaluated kriging grid");
    Surface::from_cells(grid, cells, params.compute_variance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use airsurf_core::{Error, Sample};
    use approx::assert_relative_eq;

    fn samples() -> SampleSet {
        SampleSet::new(vec![
            Sample::new(14.60, 121.00, 10.0).unwrap(),
            Sample::new(14.61, 121.01, 50.0).unwrap(),
            Sample::new(14.59, 121.02, 30.0).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_shape_and_orientation() {
        let s = samples();
        let model = LinearVariogram::new(2.0, 1.0).unwrap();
        let grid = GridSpec::new(121.0, 121.02, 14.59, 14.61, 4, 3).unwrap();
        let surface = evaluate(&s, &model, &grid, &EvaluateParams::default()).unwrap();
        assert_eq!(surface.shape(), (3, 4));
        assert!(surface.has_variance());

        let system = KrigingSystem::new(&s, &model).unwrap();
        for row in 0..3 {
            for col in 0..4 {
                let (lat, lon) = grid.point(row, col);
                let e = system.estimate(lat, lon).unwrap();
                assert_relative_eq!(surface.get(row, col).unwrap(), e.value, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_estimates_within_sample_range() {
        let s = samples();
        let model = LinearVariogram::new(0.0, 400.0).unwrap();
        let grid = GridSpec::new(120.99, 121.03, 14.58, 14.62, 7, 7).unwrap();
        let surface = evaluate(&s, &model, &grid, &EvaluateParams::default()).unwrap();
        for &v in surface.estimate().iter() {
            assert!(v.is_finite());
            assert!((10.0..=50.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn test_variance_optional() {
        let grid = GridSpec::new(121.0, 121.02, 14.59, 14.61, 3, 3).unwrap();
        let params = EvaluateParams {
            compute_variance: false,
            cancel: None,
        };
        let model = LinearVariogram::new(1.0, 0.0).unwrap();
        let surface = evaluate(&samples(), &model, &grid, &params).unwrap();
        assert!(!surface.has_variance());
    }

    #[test]
    fn test_cancelled_run_fails() {
        let token = CancelToken::new();
        token.cancel();
        let params = EvaluateParams {
            compute_variance: true,
            cancel: Some(token),
        };
        let grid = GridSpec::new(121.0, 121.02, 14.59, 14.61, 10, 10).unwrap();
        let model = LinearVariogram::new(1.0, 0.0).unwrap();
        assert_eq!(
            evaluate(&samples(), &model, &grid, &params),
            Err(Error::Cancelled)
        );
    }

    #[test]
    fn test_cancel_from_another_thread_stops_run() {
        // 100 stations on a 600x600 grid: far longer than the cancel delay
        let s = SampleSet::new(
            (0..100)
                .map(|i| {
                    let lat = 14.5 + ((i * 37) % 100) as f64 * 0.002;
                    let lon = 121.0 + ((i * 61) % 100) as f64 * 0.002;
                    Sample::new(lat, lon, (i % 17) as f64).unwrap()
                })
                .collect(),
        )
        .unwrap();
        let model = LinearVariogram::new(1.0, 0.5).unwrap();
        let system = KrigingSystem::new(&s, &model).unwrap();
        let grid = GridSpec::new(121.0, 121.2, 14.5, 14.7, 600, 600).unwrap();

        let token = CancelToken::new();
        let remote = token.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            remote.cancel();
        });
        let params = EvaluateParams {
            compute_variance: true,
            cancel: Some(token),
        };
        let result = evaluate_with(&system, &grid, &params);
        canceller.join().unwrap();
        assert_eq!(result, Err(Error::Cancelled));
    }

    #[test]
    fn test_singular_system_produces_no_surface() {
        let s = SampleSet::new(vec![
            Sample::new(10.0, -180.0, 1.0).unwrap(),
            Sample::new(10.0, 180.0, 2.0).unwrap(),
            Sample::new(0.0, 0.0, 3.0).unwrap(),
        ])
        .unwrap();
        let grid = GridSpec::new(-10.0, 10.0, 0.0, 20.0, 3, 3).unwrap();
        let model = LinearVariogram::new(1.0, 0.0).unwrap();
        assert!(matches!(
            evaluate(&s, &model, &grid, &EvaluateParams::default()),
            Err(Error::SingularSystem { .. })
        ));
    }
}

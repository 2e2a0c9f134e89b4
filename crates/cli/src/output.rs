//! Writing interpolation results to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use airsurf_algorithms::interpolation::LinearVariogram;
use airsurf_algorithms::Interpolation;
use airsurf_core::{GeoBounds, GeoTransform, GridSpec, Sample};

/// Sidecar describing the `.rgba` buffer written next to it.
#[derive(Debug, Serialize)]
pub struct RasterMetadata<'a> {
    pub width: usize,
    pub height: usize,
    /// Pixel rows in the `.rgba` file run north to south
    pub bounds: GeoBounds,
    /// Pixel-edge transform: the extent divided into `width × height` cells
    pub transform: GeoTransform,
    /// Kriged nodes: pixel (col, row) holds the value at `grid.x_at(col)`,
    /// `grid.y_at(height - 1 - row)`, spaced `span / (count - 1)`
    pub grid: GridSpec,
    /// Node spacing (dx, dy) in degrees
    pub node_spacing: (f64, f64),
    pub value_range: (f64, f64),
    pub model: LinearVariogram,
    pub samples: &'a [Sample],
}

impl<'a> RasterMetadata<'a> {
    pub fn new(result: &'a Interpolation) -> Self {
        Self {
            width: result.raster.width(),
            height: result.raster.height(),
            bounds: result.raster.bounds(),
            transform: result.raster.north_up_transform(),
            grid: result.grid,
            node_spacing: result.grid.step(),
            value_range: result.raster.value_range(),
            model: result.model,
            samples: result.samples.as_slice(),
        }
    }
}

fn with_extension(stem: &Path, ext: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Write `<stem>.rgba` (north-up RGBA8) and `<stem>.json`.
///
/// Returns the two paths written.
pub fn write_outputs(stem: &Path, result: &Interpolation) -> Result<(PathBuf, PathBuf)> {
    let rgba_path = with_extension(stem, "rgba");
    let json_path = with_extension(stem, "json");

    fs::write(&rgba_path, result.raster.north_up_pixels())
        .with_context(|| format!("Failed to write {}", rgba_path.display()))?;

    let meta = serde_json::to_string_pretty(&RasterMetadata::new(result))
        .context("Failed to serialize raster metadata")?;
    fs::write(&json_path, meta)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    Ok((rgba_path, json_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use airsurf_algorithms::samples::{RawReading, ReadingSource};
    use airsurf_algorithms::{interpolate, GridParams, InterpolationParams};
    use airsurf_colormap::ColorMap;
    use serde_json::Value;

    fn run() -> Interpolation {
        let source = ReadingSource::from_readings(
            "test",
            vec![
                RawReading::new(14.60, 121.00, 10.0),
                RawReading::new(14.61, 121.01, 50.0),
                RawReading::new(14.59, 121.02, 30.0),
            ],
        );
        let params = InterpolationParams {
            grid: GridParams {
                padding_deg: 0.01,
                x_count: 8,
                y_count: 5,
            },
            ..Default::default()
        };
        interpolate(&[source], &params, &ColorMap::default()).unwrap()
    }

    #[test]
    fn test_appends_extensions_to_stem() {
        assert_eq!(
            with_extension(Path::new("out/pm25.v2"), "json"),
            PathBuf::from("out/pm25.v2.json")
        );
    }

    #[test]
    fn test_writes_buffer_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let result = run();
        let (rgba, json) = write_outputs(&dir.path().join("surface"), &result).unwrap();

        let bytes = fs::read(&rgba).unwrap();
        assert_eq!(bytes.len(), 8 * 5 * 4);
        assert_eq!(bytes, result.raster.north_up_pixels());

        let meta: Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(meta["width"], 8);
        assert_eq!(meta["height"], 5);
        assert_eq!(meta["samples"].as_array().unwrap().len(), 3);
        assert_eq!(
            meta["bounds"]["min_lat"].as_f64().unwrap(),
            result.grid.y_min()
        );
        assert!(meta["transform"]["pixel_height"].as_f64().unwrap() < 0.0);
    }

    #[test]
    fn test_sidecar_separates_pixel_edges_from_nodes() {
        let result = run();
        let meta = serde_json::to_value(RasterMetadata::new(&result)).unwrap();
        let (dx, dy) = result.grid.step();
        let (_, lon_span) = result.grid.extent().span();

        assert_eq!(meta["grid"]["x_count"], 8);
        assert_eq!(meta["grid"]["y_min"].as_f64().unwrap(), result.grid.y_min());
        assert_eq!(meta["node_spacing"][0].as_f64().unwrap(), dx);
        assert_eq!(meta["node_spacing"][1].as_f64().unwrap(), dy);
        assert_eq!(dx, lon_span / 7.0);
        assert_eq!(
            meta["transform"]["pixel_width"].as_f64().unwrap(),
            lon_span / 8.0
        );
    }
}

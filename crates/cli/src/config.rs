//! JSON run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use airsurf_algorithms::samples::{FieldMapping, ReadingSource};
use airsurf_algorithms::InterpolationParams;
use airsurf_colormap::ColorMap;

/// One reading file: a JSON array of records.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Defaults to the file stem
    #[serde(default)]
    pub name: Option<String>,
    /// Relative paths resolve against the config file's directory
    pub path: PathBuf,
    #[serde(default)]
    pub fields: FieldMapping,
}

/// Everything one `airsurf` invocation needs.
///
/// ```json
/// {
///   "sources": [{"path": "stations.json", "fields": {"value": "pm25", "latitude": "gps_lat", "longitude": "gps_long"}}],
///   "params": {"grid": {"x_count": 200, "y_count": 200}},
///   "color_map": {"scheme": "air_quality", "reversed": false}
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub params: InterpolationParams,
    #[serde(default)]
    pub color_map: ColorMap,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: RunConfig = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        if config.sources.is_empty() {
            anyhow::bail!("Config {} lists no sources", path.display());
        }
        Ok(config)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Read every source file and map its records.
    pub fn read_sources(&self) -> Result<Vec<ReadingSource>> {
        self.sources
            .iter()
            .map(|src| {
                let path = self.resolve(&src.path);
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read source {}", path.display()))?;
                let records: Vec<Value> = serde_json::from_str(&text).with_context(|| {
                    format!("Source {} is not a JSON array of records", path.display())
                })?;
                let name = src.name.clone().unwrap_or_else(|| {
                    path.file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string())
                });
                Ok(ReadingSource::from_records(name, &records, &src.fields))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airsurf_algorithms::VariogramSource;
    use airsurf_colormap::ColorScheme;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_loads_minimal_config_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write(dir.path(), "run.json", r#"{"sources": [{"path": "a.json"}]}"#);
        let config = RunConfig::load(&cfg).unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.params.grid.x_count, 100);
        assert_eq!(config.color_map, ColorMap::default());
        assert_eq!(config.sources[0].fields, FieldMapping::default());
    }

    #[test]
    fn test_reads_sources_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "mobile.json",
            r#"[{"pm25": "12", "gps_lat": 14.6, "gps_long": 121.0}, {"pm25": null}]"#,
        );
        let cfg = write(
            dir.path(),
            "run.json",
            r#"{
                "sources": [{"path": "mobile.json", "fields": {"value": "pm25", "latitude": "gps_lat", "longitude": "gps_long"}}],
                "params": {"variogram": {"kind": "fixed", "slope": 1.0, "nugget": 0.5}},
                "color_map": {"scheme": "air_quality"}
            }"#,
        );
        let config = RunConfig::load(&cfg).unwrap();
        assert!(matches!(config.params.variogram, VariogramSource::Fixed(_)));
        assert_eq!(config.color_map.scheme, ColorScheme::AirQuality);

        let sources = config.read_sources().unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "mobile");
        assert_eq!(sources[0].len(), 2);
        assert_eq!(sources[0].readings[0].value, Some(12.0));
    }

    #[test]
    fn test_rejects_empty_source_list() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write(dir.path(), "run.json", r#"{"sources": []}"#);
        assert!(RunConfig::load(&cfg).is_err());
    }

    #[test]
    fn test_missing_source_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = write(dir.path(), "run.json", r#"{"sources": [{"path": "nope.json"}]}"#);
        let config = RunConfig::load(&cfg).unwrap();
        let err = config.read_sources().unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }
}

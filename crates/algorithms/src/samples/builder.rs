//! Normalize readings from several sources into one [`SampleSet`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use airsurf_core::sample::is_valid_coordinate;
use airsurf_core::{Error, Result, Sample, SampleSet};

use super::reading::{RawReading, ReadingSource};

/// How to resolve readings that share an identical coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first reading in source order
    #[default]
    KeepFirst,
    /// Replace the colliding readings with their mean value
    Average,
    /// Fail with [`Error::DuplicateCoordinate`]
    Reject,
}

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn matches(&self, latitude: f64, longitude: f64) -> bool {
        self.latitude == latitude && self.longitude == longitude
    }
}

/// Parameters for sample cleaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningParams {
    /// Drop unusable readings instead of failing (default: true)
    pub enabled: bool,
    /// Coordinates whose readings are discarded, e.g. a calibration bench.
    /// Only applied when cleaning is enabled.
    pub exclusions: Vec<Coordinate>,
    /// Collision handling (default: keep first)
    pub duplicates: DuplicatePolicy,
}

impl Default for CleaningParams {
    fn default() -> Self {
        Self {
            enabled: true,
            exclusions: Vec::new(),
            duplicates: DuplicatePolicy::KeepFirst,
        }
    }
}

/// Builds a [`SampleSet`] from one or more [`ReadingSource`]s.
///
/// # Example
///
/// ```ignore
/// let samples = SampleSetBuilder::new(CleaningParams::default())
///     .exclude(14.649929, 121.068478)
///     .build(&[stations, mobile])?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct SampleSetBuilder {
    params: CleaningParams,
}

/// Outcome of inspecting a single reading.
enum Verdict {
    Keep(Sample),
    Drop,
}

impl SampleSetBuilder {
    pub fn new(params: CleaningParams) -> Self {
        Self { params }
    }

    /// Add an exclusion coordinate.
    pub fn exclude(mut self, latitude: f64, longitude: f64) -> Self {
        self.params
            .exclusions
            .push(Coordinate::new(latitude, longitude));
        self
    }

    pub fn params(&self) -> &CleaningParams {
        &self.params
    }

    fn inspect(&self, source: &str, index: usize, reading: &RawReading) -> Result<Verdict> {
        let fields = [
            ("value", reading.value),
            ("latitude", reading.latitude),
            ("longitude", reading.longitude),
        ];
        for (field, v) in fields {
            if !v.is_some_and(f64::is_finite) {
                if self.params.enabled {
                    return Ok(Verdict::Drop);
                }
                return Err(Error::MissingField {
                    source_name: source.to_string(),
                    index,
                    field: field.to_string(),
                });
            }
        }

        let (Some(value), Some(latitude), Some(longitude)) =
            (reading.value, reading.latitude, reading.longitude)
        else {
            return Ok(Verdict::Drop);
        };

        if !is_valid_coordinate(latitude, longitude) {
            if self.params.enabled {
                return Ok(Verdict::Drop);
            }
            return Err(Error::InvalidCoordinate {
                latitude,
                longitude,
            });
        }

        if self.params.enabled
            && self
                .params
                .exclusions
                .iter()
                .any(|c| c.matches(latitude, longitude))
        {
            return Ok(Verdict::Drop);
        }

        Ok(Verdict::Keep(Sample::new(latitude, longitude, value)?))
    }

    /// Clean, concatenate and deduplicate `sources` in order.
    ///
    /// # Errors
    /// - [`Error::EmptySampleSet`] if nothing survives
    /// - [`Error::MissingField`] / [`Error::InvalidCoordinate`] with cleaning disabled
    /// - [`Error::DuplicateCoordinate`] under [`DuplicatePolicy::Reject`]
    pub fn build(&self, sources: &[ReadingSource]) -> Result<SampleSet> {
        let mut kept: Vec<Sample> = Vec::new();
        for source in sources {
            let before = kept.len();
            for (index, reading) in source.readings.iter().enumerate() {
                if let Verdict::Keep(sample) = self.inspect(&source.name, index, reading)? {
                    kept.push(sample);
                }
            }
            let n_kept = kept.len() - before;
            debug!(
                source = %source.name,
                kept = n_kept,
                dropped = source.len() - n_kept,
                "cleaned reading source"
            );
        }

        let merged = deduplicate(kept, self.params.duplicates)?;
        debug!(
            sources = sources.len(),
            samples = merged.len(),
            "built sample set"
        );
        SampleSet::new(merged)
    }
}

/// Convenience wrapper around [`SampleSetBuilder::build`].
pub fn build_sample_set(sources: &[ReadingSource], params: &CleaningParams) -> Result<SampleSet> {
    SampleSetBuilder::new(params.clone()).build(sources)
}

// +0.0 folds -0.0 into 0.0 so both hash to the same key
fn coordinate_key(sample: &Sample) -> (u64, u64) {
    (
        (sample.latitude + 0.0).to_bits(),
        (sample.longitude + 0.0).to_bits(),
    )
}

fn deduplicate(samples: Vec<Sample>, policy: DuplicatePolicy) -> Result<Vec<Sample>> {
    let mut index: HashMap<(u64, u64), usize> = HashMap::with_capacity(samples.len());
    let mut out: Vec<Sample> = Vec::with_capacity(samples.len());
    // (sum, count) per output slot, only used by Average
    let mut sums: Vec<(f64, usize)> = Vec::new();

    for sample in samples {
        match index.get(&coordinate_key(&sample)) {
            None => {
                index.insert(coordinate_key(&sample), out.len());
                sums.push((sample.value, 1));
                out.push(sample);
            }
            Some(&slot) => match policy {
                DuplicatePolicy::KeepFirst => {}
                DuplicatePolicy::Average => {
                    sums[slot].0 += sample.value;
                    sums[slot].1 += 1;
                }
                DuplicatePolicy::Reject => {
                    return Err(Error::DuplicateCoordinate {
                        latitude: sample.latitude,
                        longitude: sample.longitude,
                    });
                }
            },
        }
    }

    if policy == DuplicatePolicy::Average {
        for (sample, (sum, count)) in out.iter_mut().zip(&sums) {
            if *count > 1 {
                sample.value = sum / *count as f64;
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, readings: &[RawReading]) -> ReadingSource {
        ReadingSource::from_readings(name, readings.to_vec())
    }

    #[test]
    fn test_concatenates_in_source_order() {
        let a = source("a", &[RawReading::new(14.6, 121.0, 10.0)]);
        let b = source("b", &[RawReading::new(14.7, 121.1, 20.0)]);
        let set = build_sample_set(&[a, b], &CleaningParams::default()).unwrap();
        let values: Vec<f64> = set.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![10.0, 20.0]);
    }

    #[test]
    fn test_cleaning_drops_unusable_readings() {
        let readings = [
            RawReading::new(14.6, 121.0, 10.0),
            RawReading {
                value: None,
                ..RawReading::new(14.7, 121.0, 0.0)
            },
            RawReading::new(14.8, 121.0, f64::NAN),
            RawReading::new(95.0, 121.0, 5.0),
            RawReading::new(14.9, 190.0, 5.0),
        ];
        let set = build_sample_set(&[source("s", &readings)], &CleaningParams::default()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].value, 10.0);
    }

    #[test]
    fn test_exclusion_is_exact_match() {
        let readings = [
            RawReading::new(14.649929, 121.068478, 99.0),
            RawReading::new(14.649930, 121.068478, 20.0),
        ];
        let set = SampleSetBuilder::default()
            .exclude(14.649929, 121.068478)
            .build(&[source("s", &readings)])
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.as_slice()[0].value, 20.0);
    }

    #[test]
    fn test_disabled_cleaning_reports_missing_field() {
        let params = CleaningParams {
            enabled: false,
            ..Default::default()
        };
        let readings = [
            RawReading::new(14.6, 121.0, 10.0),
            RawReading {
                latitude: None,
                ..RawReading::new(0.0, 121.0, 3.0)
            },
        ];
        let err = build_sample_set(&[source("mobile", &readings)], &params).unwrap_err();
        assert_eq!(
            err,
            Error::MissingField {
                source_name: "mobile".into(),
                index: 1,
                field: "latitude".into(),
            }
        );
    }

    #[test]
    fn test_disabled_cleaning_reports_invalid_coordinate() {
        let params = CleaningParams {
            enabled: false,
            ..Default::default()
        };
        let err = build_sample_set(
            &[source("s", &[RawReading::new(-91.0, 0.0, 1.0)])],
            &params,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let readings = [
            RawReading::new(14.6, 121.0, 10.0),
            RawReading::new(14.6, 121.0, 30.0),
            RawReading::new(-0.0, 0.0, 1.0),
            RawReading::new(0.0, 0.0, 2.0),
        ];
        let set = build_sample_set(&[source("s", &readings)], &CleaningParams::default()).unwrap();
        let values: Vec<f64> = set.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![10.0, 1.0]);
    }

    #[test]
    fn test_duplicates_average() {
        let params = CleaningParams {
            duplicates: DuplicatePolicy::Average,
            ..Default::default()
        };
        let a = source("a", &[RawReading::new(14.6, 121.0, 10.0)]);
        let b = source(
            "b",
            &[
                RawReading::new(14.6, 121.0, 30.0),
                RawReading::new(14.7, 121.0, 5.0),
            ],
        );
        let set = build_sample_set(&[a, b], &params).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].value, 20.0);
        assert_eq!(set.as_slice()[1].value, 5.0);
    }

    #[test]
    fn test_duplicates_reject() {
        let params = CleaningParams {
            duplicates: DuplicatePolicy::Reject,
            ..Default::default()
        };
        let readings = [
            RawReading::new(14.6, 121.0, 10.0),
            RawReading::new(14.6, 121.0, 30.0),
        ];
        assert_eq!(
            build_sample_set(&[source("s", &readings)], &params),
            Err(Error::DuplicateCoordinate {
                latitude: 14.6,
                longitude: 121.0,
            })
        );
    }

    #[test]
    fn test_nothing_left_is_empty_sample_set() {
        let readings = [RawReading::default(), RawReading::new(100.0, 0.0, 1.0)];
        assert_eq!(
            build_sample_set(&[source("s", &readings)], &CleaningParams::default()),
            Err(Error::EmptySampleSet)
        );
        assert_eq!(
            build_sample_set(&[], &CleaningParams::default()),
            Err(Error::EmptySampleSet)
        );
    }

    #[test]
    fn test_params_from_json() {
        let params: CleaningParams = serde_json::from_str(
            r#"{"exclusions": [{"latitude": 14.649929, "longitude": 121.068478}], "duplicates": "average"}"#,
        )
        .unwrap();
        assert!(params.enabled);
        assert_eq!(params.duplicates, DuplicatePolicy::Average);
        assert_eq!(params.exclusions.len(), 1);
    }
}

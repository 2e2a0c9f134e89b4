//! Point samples and sample sets

use serde::{Deserialize, Serialize};

use crate::bounds::GeoBounds;
use crate::error::{Error, Result};
use crate::geodesy::great_circle_km;

/// A single geo-tagged measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
}

impl Sample {
    /// Create a sample, validating that the coordinate is on the globe and
    /// every field is finite.
    pub fn new(latitude: f64, longitude: f64, value: f64) -> Result<Self> {
        if !is_valid_coordinate(latitude, longitude) {
            return Err(Error::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        if !value.is_finite() {
            return Err(Error::invalid_parameter("value", value, "must be finite"));
        }
        Ok(Self {
            latitude,
            longitude,
            value,
        })
    }

    /// Great-circle distance in kilometres to a (lat, lon) location.
    #[inline]
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> f64 {
        great_circle_km(self.latitude, self.longitude, latitude, longitude)
    }

    /// Great-circle distance in kilometres to another sample.
    #[inline]
    pub fn distance_to(&self, other: &Sample) -> f64 {
        self.distance_km(other.latitude, other.longitude)
    }

    /// Whether two samples sit on exactly the same coordinate.
    #[inline]
    pub fn same_location(&self, other: &Sample) -> bool {
        self.latitude == other.latitude && self.longitude == other.longitude
    }
}

/// Whether (lat, lon) is finite and within [-90, 90] × [-180, 180].
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// A non-empty set of samples with pairwise-distinct coordinates.
///
/// Construct through [`SampleSet::new`] (which enforces both invariants) or
/// through the sample set builder in `airsurf-algorithms`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSet {
    samples: Vec<Sample>,
}

impl SampleSet {
    /// Wrap a vector of samples.
    ///
    /// # Errors
    /// - [`Error::EmptySampleSet`] if `samples` is empty
    /// - [`Error::DuplicateCoordinate`] if two samples share a coordinate
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySampleSet);
        }
        for (i, a) in samples.iter().enumerate() {
            if let Some(b) = samples[i + 1..].iter().find(|b| a.same_location(b)) {
                return Err(Error::DuplicateCoordinate {
                    latitude: b.latitude,
                    longitude: b.longitude,
                });
            }
        }
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn into_vec(self) -> Vec<Sample> {
        self.samples
    }

    /// Tight bounding box of the sample coordinates.
    pub fn bounds(&self) -> GeoBounds {
        let mut bounds = GeoBounds {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lon: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
        };
        for s in &self.samples {
            bounds.min_lat = bounds.min_lat.min(s.latitude);
            bounds.max_lat = bounds.max_lat.max(s.latitude);
            bounds.min_lon = bounds.min_lon.min(s.longitude);
            bounds.max_lon = bounds.max_lon.max(s.longitude);
        }
        bounds
    }

    /// (min, max) of the sample values.
    pub fn value_range(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.value), hi.max(s.value))
            })
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(lat: f64, lon: f64, v: f64) -> Sample {
        Sample::new(lat, lon, v).unwrap()
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Sample::new(91.0, 0.0, 1.0).is_err());
        assert!(Sample::new(0.0, -180.5, 1.0).is_err());
        assert!(Sample::new(f64::NAN, 0.0, 1.0).is_err());
        assert!(Sample::new(0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_set_rejects_empty_and_duplicates() {
        assert_eq!(SampleSet::new(vec![]), Err(Error::EmptySampleSet));
        let dup = SampleSet::new(vec![s(1.0, 2.0, 3.0), s(1.0, 2.0, 4.0)]);
        assert!(matches!(dup, Err(Error::DuplicateCoordinate { .. })));
    }

    #[test]
    fn test_bounds_and_range() {
        let set = SampleSet::new(vec![
            s(14.60, 121.00, 10.0),
            s(14.61, 121.01, 50.0),
            s(14.59, 121.02, 30.0),
        ])
        .unwrap();
        let b = set.bounds();
        assert_eq!((b.min_lat, b.max_lat), (14.59, 14.61));
        assert_eq!((b.min_lon, b.max_lon), (121.00, 121.02));
        assert_eq!(set.value_range(), (10.0, 50.0));
    }
}

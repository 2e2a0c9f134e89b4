//! Geographic bounding boxes

use serde::{Deserialize, Serialize};

/// Axis-aligned latitude/longitude box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Grow the box by `margin` degrees on every side.
    pub fn padded(&self, margin: f64) -> Self {
        Self {
            min_lat: self.min_lat - margin,
            max_lat: self.max_lat + margin,
            min_lon: self.min_lon - margin,
            max_lon: self.max_lon + margin,
        }
    }

    /// Center as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    /// Extent in degrees as (lat_span, lon_span).
    pub fn span(&self) -> (f64, f64) {
        (self.max_lat - self.min_lat, self.max_lon - self.min_lon)
    }

    /// South-west and north-east corners as `[[lat, lon], [lat, lon]]`,
    /// the layout web map image overlays expect.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [
            [self.min_lat, self.min_lon],
            [self.max_lat, self.max_lon],
        ]
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_center_and_corners() {
        let b = GeoBounds::new(14.0, 15.0, 121.0, 122.0).padded(0.5);
        assert_eq!(b, GeoBounds::new(13.5, 15.5, 120.5, 122.5));
        assert_eq!(b.center(), (14.5, 121.5));
        assert_eq!(b.corners(), [[13.5, 120.5], [15.5, 122.5]]);
        assert!(b.contains(14.0, 121.0));
        assert!(!b.contains(16.0, 121.0));
    }
}

//! Affine pixel ↔ geographic transform for rendered surfaces

use serde::{Deserialize, Serialize};

use crate::bounds::GeoBounds;

/// Axis-aligned affine transform between pixel edges and lon/lat degrees.
///
/// ```text
/// lon = origin_lon + col * pixel_width
/// lat = origin_lat + row * pixel_height
/// ```
///
/// Rendered surfaces are stored south-up (row 0 at the minimum latitude), so
/// their transform has a positive `pixel_height`. Image encoders write the
/// top row first and want the north-up form, where the origin is the
/// north-west corner and `pixel_height` is negative.
///
/// The extent is split into `width` equal pixels, so `pixel_width` is
/// `span / width`. Surface values sit on [`GridSpec`](crate::GridSpec)
/// nodes spaced `span / (width - 1)` with the outer nodes on the extent
/// edges, so a pixel center is not the node its value was kriged at.
/// Use [`GridSpec::x_at`](crate::GridSpec::x_at) and
/// [`GridSpec::y_at`](crate::GridSpec::y_at) for exact node coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// Longitude of the origin corner
    pub origin_lon: f64,
    /// Latitude of the origin corner
    pub origin_lat: f64,
    /// Pixel width in degrees of longitude
    pub pixel_width: f64,
    /// Pixel height in degrees of latitude (negative for north-up)
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_lon: f64, origin_lat: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_lon,
            origin_lat,
            pixel_width,
            pixel_height,
        }
    }

    /// Transform for a `width × height` buffer whose row 0 lies on the
    /// southern edge of `bounds`.
    pub fn south_up(bounds: &GeoBounds, width: usize, height: usize) -> Self {
        let (lat_span, lon_span) = bounds.span();
        Self::new(
            bounds.min_lon,
            bounds.min_lat,
            lon_span / width as f64,
            lat_span / height as f64,
        )
    }

    /// Transform for a `width × height` buffer whose row 0 lies on the
    /// northern edge of `bounds`.
    pub fn north_up(bounds: &GeoBounds, width: usize, height: usize) -> Self {
        let (lat_span, lon_span) = bounds.span();
        Self::new(
            bounds.min_lon,
            bounds.max_lat,
            lon_span / width as f64,
            -lat_span / height as f64,
        )
    }

    /// Geographic (lon, lat) of the pixel center. This is pixel-edge
    /// geometry, not the grid node behind the pixel's value.
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_lon + (col as f64 + 0.5) * self.pixel_width,
            self.origin_lat + (row as f64 + 0.5) * self.pixel_height,
        )
    }

    /// Geographic (lon, lat) of the pixel's origin-side corner.
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_lon + col as f64 * self.pixel_width,
            self.origin_lat + row as f64 * self.pixel_height,
        )
    }

    /// Fractional (col, row) for a geographic (lon, lat).
    ///
    /// Returns NaN for a degenerate transform.
    pub fn geo_to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        if self.pixel_width.abs() < 1e-15 || self.pixel_height.abs() < 1e-15 {
            return (f64::NAN, f64::NAN);
        }
        (
            (lon - self.origin_lon) / self.pixel_width,
            (lat - self.origin_lat) / self.pixel_height,
        )
    }

    pub fn is_north_up(&self) -> bool {
        self.pixel_height < 0.0
    }

    /// Extent covered by a `width × height` buffer.
    pub fn bounds(&self, width: usize, height: usize) -> GeoBounds {
        let (x0, y0) = self.pixel_to_geo_corner(0, 0);
        let (x1, y1) = self.pixel_to_geo_corner(width, height);
        GeoBounds::new(y0.min(y1), y0.max(y1), x0.min(x1), x0.max(x1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_to_geo_roundtrip() {
        let gt = GeoTransform::new(121.0, 14.6, 0.001, -0.001);
        let (lon, lat) = gt.pixel_to_geo(5, 10);
        let (col, row) = gt.geo_to_pixel(lon, lat);
        assert_relative_eq!(col, 5.5, epsilon = 1e-9);
        assert_relative_eq!(row, 10.5, epsilon = 1e-9);
    }

    #[test]
    fn test_south_up_places_row_zero_at_min_lat() {
        let b = GeoBounds::new(14.0, 15.0, 121.0, 123.0);
        let gt = GeoTransform::south_up(&b, 4, 2);
        assert!(!gt.is_north_up());
        let (_, lat0) = gt.pixel_to_geo_corner(0, 0);
        assert_eq!(lat0, 14.0);
        let (lon, lat) = gt.pixel_to_geo(0, 0);
        assert_relative_eq!(lon, 121.25, epsilon = 1e-12);
        assert_relative_eq!(lat, 14.25, epsilon = 1e-12);
    }

    #[test]
    fn test_both_orientations_report_same_bounds() {
        let b = GeoBounds::new(14.59, 14.61, 121.0, 121.02);
        let south = GeoTransform::south_up(&b, 100, 80).bounds(100, 80);
        let north = GeoTransform::north_up(&b, 100, 80).bounds(100, 80);
        for got in [south, north] {
            assert_relative_eq!(got.min_lat, b.min_lat, epsilon = 1e-12);
            assert_relative_eq!(got.max_lat, b.max_lat, epsilon = 1e-12);
            assert_relative_eq!(got.min_lon, b.min_lon, epsilon = 1e-12);
            assert_relative_eq!(got.max_lon, b.max_lon, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_transform_is_nan() {
        let gt = GeoTransform::new(0.0, 0.0, 0.0, 1.0);
        assert!(gt.geo_to_pixel(1.0, 1.0).0.is_nan());
    }
}

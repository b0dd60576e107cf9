//! Web Mercator (EPSG:3857) projection.
//!
//! The spherical projection used by slippy-map tile schemes. Web-published
//! vector datasets occasionally ship in it rather than a geodetic CRS.

use std::f64::consts::PI;

/// Web Mercator sphere radius (meters), equal to the WGS84 semi-major axis.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Half the projected world extent: the X of longitude 180.
pub const MAX_EXTENT: f64 = 20037508.342789244;

/// Web Mercator projection.
#[derive(Debug, Clone)]
pub struct WebMercator {
    /// Meters per projected unit (1.0 in practice)
    unit_to_meter: f64,
}

impl WebMercator {
    pub fn new(unit_to_meter: f64) -> Self {
        Self { unit_to_meter }
    }

    /// Convert (longitude, latitude) degrees to projected coordinates.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let x = EARTH_RADIUS * lon_deg * to_rad;
        let y = EARTH_RADIUS * (PI / 4.0 + lat_deg * to_rad / 2.0).tan().ln();
        (x / self.unit_to_meter, y / self.unit_to_meter)
    }

    /// Convert projected coordinates to (longitude, latitude) degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;
        let x = x * self.unit_to_meter;
        let y = y * self.unit_to_meter;
        let lon = x / EARTH_RADIUS * to_deg;
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0) * to_deg;
        (lon, lat)
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_edge() {
        let proj = WebMercator::default();
        let (x, y) = proj.project(180.0, 0.0);
        assert!((x - MAX_EXTENT).abs() < 1e-6);
        assert!(y.abs() < 1e-6);

        let (lon, lat) = proj.unproject(-MAX_EXTENT, 0.0);
        assert!((lon + 180.0).abs() < 1e-9);
        assert!(lat.abs() < 1e-9);
    }

    #[test]
    fn test_known_latitude() {
        // y = R * ln(tan(3*pi/8)) for latitude 45N
        let proj = WebMercator::default();
        let (lon, lat) = proj.unproject(-10018754.171394622, 5621521.486192335);
        assert!((lon + 90.0).abs() < 1e-6);
        assert!((lat - 45.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip() {
        let proj = WebMercator::default();
        let (x, y) = proj.project(-83.0, 40.0);
        let (lon, lat) = proj.unproject(x, y);
        assert!((lon + 83.0).abs() < 1e-9);
        assert!((lat - 40.0).abs() < 1e-9);
    }
}

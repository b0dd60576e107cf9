//! Lambert Conformal Conic projection.
//!
//! This projection is used by most US state-plane zones, including the Ohio
//! North and South zones the reference datasets ship in. It maps a cone
//! secant to the ellipsoid onto a flat plane.
//!
//! The projection parameters come straight from the `.prj` WKT:
//! - Standard parallel(s): latin1 and latin2 (equal for a tangent cone)
//! - Latitude/longitude of origin (lat0, lon0)
//! - False easting/northing in the projected unit
//! - Linear unit factor (meters per unit; US survey feet for state plane)
//!
//! Formulas follow Snyder, "Map Projections: A Working Manual", pp. 107-109
//! (ellipsoidal case).

use std::f64::consts::PI;

use crate::ellipsoid::Ellipsoid;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    /// Central meridian in radians
    lon0: f64,
    /// Semi-major axis (meters)
    a: f64,
    /// First eccentricity
    e: f64,
    /// False easting (meters)
    false_easting: f64,
    /// False northing (meters)
    false_northing: f64,
    /// Meters per projected unit
    unit_to_meter: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a new Lambert Conformal projection from WKT parameters.
    ///
    /// # Arguments
    /// * `ellipsoid` - reference ellipsoid from the `SPHEROID` element
    /// * `latin1_deg` / `latin2_deg` - standard parallels (degrees)
    /// * `lat0_deg` / `lon0_deg` - latitude/longitude of origin (degrees)
    /// * `false_easting` / `false_northing` - in projected units
    /// * `unit_to_meter` - meters per projected unit (1.0 for meters,
    ///   0.3048006... for US survey feet)
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ellipsoid: Ellipsoid,
        latin1_deg: f64,
        latin2_deg: f64,
        lat0_deg: f64,
        lon0_deg: f64,
        false_easting: f64,
        false_northing: f64,
        unit_to_meter: f64,
    ) -> Self {
        let to_rad = PI / 180.0;

        let latin1 = latin1_deg * to_rad;
        let latin2 = latin2_deg * to_rad;
        let lat0 = lat0_deg * to_rad;
        let lon0 = lon0_deg * to_rad;

        let a = ellipsoid.semi_major;
        let e = ellipsoid.eccentricity();

        let m1 = Self::m(e, latin1);
        let t1 = Self::t(e, latin1);

        // Cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let m2 = Self::m(e, latin2);
            let t2 = Self::t(e, latin2);
            (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
        };

        let f = m1 / (n * t1.powf(n));
        let rho0 = a * f * Self::t(e, lat0).powf(n);

        Self {
            lon0,
            a,
            e,
            false_easting: false_easting * unit_to_meter,
            false_northing: false_northing * unit_to_meter,
            unit_to_meter,
            n,
            f,
            rho0,
        }
    }

    /// m(phi) = cos(phi) / sqrt(1 - e^2 sin^2(phi))
    fn m(e: f64, phi: f64) -> f64 {
        let es = e * phi.sin();
        phi.cos() / (1.0 - es * es).sqrt()
    }

    /// t(phi) = tan(pi/4 - phi/2) / ((1 - e sin phi) / (1 + e sin phi))^(e/2)
    fn t(e: f64, phi: f64) -> f64 {
        let es = e * phi.sin();
        (PI / 4.0 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
    }

    /// Convert (longitude, latitude) degrees to projected coordinates in the
    /// native unit of the CRS.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        // Normalize longitude difference to [-pi, pi]
        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.a * self.f * Self::t(self.e, lat).powf(self.n);
        let theta = self.n * dlon;

        let x = self.false_easting + rho * theta.sin();
        let y = self.false_northing + self.rho0 - rho * theta.cos();

        (x / self.unit_to_meter, y / self.unit_to_meter)
    }

    /// Convert projected coordinates in the native unit of the CRS to
    /// (longitude, latitude) degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let x = x * self.unit_to_meter - self.false_easting;
        let y = y * self.unit_to_meter - self.false_northing;

        let dy = self.rho0 - y;
        let mut rho = (x * x + dy * dy).sqrt();
        let theta = if self.n < 0.0 {
            rho = -rho;
            (-x).atan2(-dy)
        } else {
            x.atan2(dy)
        };

        let t = (rho / (self.a * self.f)).powf(1.0 / self.n);

        // Iterate for latitude (Snyder eq. 7-9); converges in a few rounds.
        let mut lat = PI / 2.0 - 2.0 * t.atan();
        for _ in 0..10 {
            let es = self.e * lat.sin();
            let next =
                PI / 2.0 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(self.e / 2.0)).atan();
            if (next - lat).abs() < 1e-12 {
                lat = next;
                break;
            }
            lat = next;
        }

        let lon = self.lon0 + theta / self.n;

        (lon * to_deg, lat * to_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Ohio South state-plane zone (NAD83, US survey feet).
    fn ohio_south() -> LambertConformal {
        LambertConformal::new(
            Ellipsoid::GRS80,
            38.73333333333333, // latin1
            40.03333333333333, // latin2
            38.0,              // lat0
            -82.5,             // lon0
            1_968_500.0,       // false easting (ftUS)
            0.0,               // false northing
            0.3048006096012192,
        )
    }

    #[test]
    fn test_origin_maps_to_false_origin() {
        let proj = ohio_south();
        let (x, y) = proj.project(-82.5, 38.0);
        assert!((x - 1_968_500.0).abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_within_zone() {
        let proj = ohio_south();
        for (lon, lat) in [(-83.0, 39.96), (-84.5, 39.1), (-81.7, 38.8)] {
            let (x, y) = proj.project(lon, lat);
            let (lon2, lat2) = proj.unproject(x, y);
            assert!((lon - lon2).abs() < 1e-9, "lon {} != {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat {} != {}", lat, lat2);
        }
    }

    #[test]
    fn test_northeast_of_origin_increases_both_axes() {
        let proj = ohio_south();
        let (x, y) = proj.project(-82.0, 39.0);
        assert!(x > 1_968_500.0);
        assert!(y > 0.0);
    }

    #[test]
    fn test_tangent_cone_single_parallel() {
        let proj = LambertConformal::new(
            Ellipsoid::WGS84,
            40.0,
            40.0,
            40.0,
            -95.0,
            0.0,
            0.0,
            1.0,
        );
        let (x, y) = proj.project(-95.0, 40.0);
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
        let (lon, lat) = proj.unproject(250_000.0, 120_000.0);
        let (x2, y2) = proj.project(lon, lat);
        assert!((x2 - 250_000.0).abs() < 1e-5);
        assert!((y2 - 120_000.0).abs() < 1e-5);
    }
}

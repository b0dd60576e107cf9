//! Transverse Mercator projection.
//!
//! Covers UTM zones and the Transverse Mercator state-plane zones. Uses the
//! ellipsoidal series from Snyder, "Map Projections: A Working Manual",
//! pp. 60-64, accurate to well under a millimeter within a zone.

use std::f64::consts::PI;

use crate::ellipsoid::Ellipsoid;

/// Transverse Mercator projection parameters.
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    /// Central meridian in radians
    lon0: f64,
    /// Latitude of origin in radians
    lat0: f64,
    /// Scale factor at the central meridian (0.9996 for UTM)
    k0: f64,
    /// Semi-major axis (meters)
    a: f64,
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared: e'^2 = e^2 / (1 - e^2)
    ep2: f64,
    /// False easting (meters)
    false_easting: f64,
    /// False northing (meters)
    false_northing: f64,
    /// Meters per projected unit
    unit_to_meter: f64,
    /// Meridional arc at the latitude of origin
    m0: f64,
}

impl TransverseMercator {
    /// Create a new Transverse Mercator projection from WKT parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ellipsoid: Ellipsoid,
        lat0_deg: f64,
        lon0_deg: f64,
        scale_factor: f64,
        false_easting: f64,
        false_northing: f64,
        unit_to_meter: f64,
    ) -> Self {
        let to_rad = PI / 180.0;
        let a = ellipsoid.semi_major;
        let e2 = ellipsoid.eccentricity_sq();
        let lat0 = lat0_deg * to_rad;

        let mut proj = Self {
            lon0: lon0_deg * to_rad,
            lat0,
            k0: scale_factor,
            a,
            e2,
            ep2: e2 / (1.0 - e2),
            false_easting: false_easting * unit_to_meter,
            false_northing: false_northing * unit_to_meter,
            unit_to_meter,
            m0: 0.0,
        };
        proj.m0 = proj.meridional_arc(lat0);
        proj
    }

    /// Distance along the meridian from the equator to latitude phi
    /// (Snyder eq. 3-21).
    fn meridional_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.a
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Convert (longitude, latitude) degrees to projected coordinates in the
    /// native unit of the CRS.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let tan_lat = lat.tan();

        let n = self.a / (1.0 - self.e2 * sin_lat * sin_lat).sqrt();
        let t = tan_lat * tan_lat;
        let c = self.ep2 * cos_lat * cos_lat;
        let big_a = dlon * cos_lat;
        let m = self.meridional_arc(lat);

        let a2 = big_a * big_a;
        let a3 = a2 * big_a;
        let a4 = a3 * big_a;
        let a5 = a4 * big_a;
        let a6 = a5 * big_a;

        let x = self.false_easting
            + self.k0
                * n
                * (big_a
                    + (1.0 - t + c) * a3 / 6.0
                    + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * self.ep2) * a5 / 120.0);

        let y = self.false_northing
            + self.k0
                * (m - self.m0
                    + n * tan_lat
                        * (a2 / 2.0
                            + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                            + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * self.ep2) * a6
                                / 720.0));

        (x / self.unit_to_meter, y / self.unit_to_meter)
    }

    /// Convert projected coordinates in the native unit of the CRS to
    /// (longitude, latitude) degrees.
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let x = x * self.unit_to_meter - self.false_easting;
        let y = y * self.unit_to_meter - self.false_northing;

        let m = self.m0 + y / self.k0;
        let e2 = self.e2;
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let mu = m / (self.a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));

        let sqrt_1_e2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);
        let e1_2 = e1 * e1;
        let e1_3 = e1_2 * e1;
        let e1_4 = e1_3 * e1;

        // Footprint latitude (Snyder eq. 3-26)
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1_3 / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1_2 / 16.0 - 55.0 * e1_4 / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1_3 / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1_4 / 512.0) * (8.0 * mu).sin();

        let sin_phi1 = phi1.sin();
        let cos_phi1 = phi1.cos();
        let tan_phi1 = phi1.tan();

        let c1 = self.ep2 * cos_phi1 * cos_phi1;
        let t1 = tan_phi1 * tan_phi1;
        let denom = (1.0 - e2 * sin_phi1 * sin_phi1).sqrt();
        let n1 = self.a / denom;
        let r1 = self.a * (1.0 - e2) / (denom * denom * denom);
        let d = x / (n1 * self.k0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let lat = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * self.ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * self.ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let lon = self.lon0
            + (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * self.ep2 + 24.0 * t1 * t1)
                    * d5
                    / 120.0)
                / cos_phi1;

        (lon * to_deg, lat * to_deg)
    }
}

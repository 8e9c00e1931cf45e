//! Gauss–Krüger Transverse Mercator projection.
//!
//! Krüger n-series to fourth order, using the formulas published by
//! Lantmäteriet for SWEREF 99 TM and RT 90. Accuracy is at the millimetre
//! level within a few degrees of the central meridian.

use crate::ellipsoid::Ellipsoid;
use serde::{Deserialize, Serialize};

/// Parameters of one Transverse Mercator grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransverseMercatorParams {
    /// Central meridian in degrees.
    pub central_meridian: f64,
    /// Scale factor on the central meridian.
    pub scale: f64,
    /// False northing in metres.
    pub false_northing: f64,
    /// False easting in metres.
    pub false_easting: f64,
}

/// Precomputed projection for one ellipsoid and parameter set.
#[derive(Clone, Debug)]
pub struct TransverseMercator {
    params: TransverseMercatorParams,
    /// `k0 * â`, the scaled rectifying radius.
    k0_a_hat: f64,
    lat_conformal: [f64; 4],
    lat_geodetic: [f64; 4],
    beta: [f64; 4],
    delta: [f64; 4],
}

impl TransverseMercator {
    pub fn new(ellipsoid: &Ellipsoid, params: TransverseMercatorParams) -> Self {
        let e2 = ellipsoid.e2();
        let n = ellipsoid.n();
        let (e4, e6, e8) = (e2 * e2, e2 * e2 * e2, e2 * e2 * e2 * e2);
        let (n2, n3, n4) = (n * n, n * n * n, n * n * n * n);

        let a_hat = ellipsoid.a / (1.0 + n) * (1.0 + n2 / 4.0 + n4 / 64.0);

        Self {
            params,
            k0_a_hat: params.scale * a_hat,
            lat_conformal: [
                e2,
                (5.0 * e4 - e6) / 6.0,
                (104.0 * e6 - 45.0 * e8) / 120.0,
                1237.0 * e8 / 1260.0,
            ],
            lat_geodetic: [
                e2 + e4 + e6 + e8,
                -(7.0 * e4 + 17.0 * e6 + 30.0 * e8) / 6.0,
                (224.0 * e6 + 889.0 * e8) / 120.0,
                -4279.0 * e8 / 1260.0,
            ],
            beta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0,
                13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0,
                61.0 * n3 / 240.0 - 103.0 * n4 / 140.0,
                49561.0 * n4 / 161280.0,
            ],
            delta: [
                n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0,
                n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0,
                17.0 * n3 / 480.0 - 37.0 * n4 / 840.0,
                4397.0 * n4 / 161280.0,
            ],
        }
    }

    pub fn params(&self) -> &TransverseMercatorParams {
        &self.params
    }

    /// Geodetic `(lat, lon)` in degrees → `(northing, easting)` in metres.
    pub fn forward(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let lat = lat_deg.to_radians();
        let dlon = (lon_deg - self.params.central_meridian).to_radians();

        let s2 = lat.sin().powi(2);
        let [a, b, c, d] = self.lat_conformal;
        let lat_c = lat - lat.sin() * lat.cos() * (a + s2 * (b + s2 * (c + s2 * d)));

        let xi = lat_c.tan().atan2(dlon.cos());
        let eta = (lat_c.cos() * dlon.sin()).atanh();

        let mut x = xi;
        let mut y = eta;
        for (i, coeff) in self.beta.iter().enumerate() {
            let k = 2.0 * (i as f64 + 1.0);
            x += coeff * (k * xi).sin() * (k * eta).cosh();
            y += coeff * (k * xi).cos() * (k * eta).sinh();
        }

        (
            self.k0_a_hat * x + self.params.false_northing,
            self.k0_a_hat * y + self.params.false_easting,
        )
    }

    /// `(northing, easting)` in metres → geodetic `(lat, lon)` in degrees.
    pub fn inverse(&self, northing: f64, easting: f64) -> (f64, f64) {
        let xi = (northing - self.params.false_northing) / self.k0_a_hat;
        let eta = (easting - self.params.false_easting) / self.k0_a_hat;

        let mut xi_p = xi;
        let mut eta_p = eta;
        for (i, coeff) in self.delta.iter().enumerate() {
            let k = 2.0 * (i as f64 + 1.0);
            xi_p -= coeff * (k * xi).sin() * (k * eta).cosh();
            eta_p -= coeff * (k * xi).cos() * (k * eta).sinh();
        }

        let lat_c = (xi_p.sin() / eta_p.cosh()).asin();
        let dlon = eta_p.sinh().atan2(xi_p.cos());

        let s2 = lat_c.sin().powi(2);
        let [a, b, c, d] = self.lat_geodetic;
        let lat = lat_c + lat_c.sin() * lat_c.cos() * (a + s2 * (b + s2 * (c + s2 * d)));

        (
            lat.to_degrees(),
            self.params.central_meridian + dlon.to_degrees(),
        )
    }
}

//! Reference ellipsoids and geodetic ⇄ geocentric conversion.

use serde::Serialize;

/// A rotational ellipsoid given by its semi-major axis and flattening.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Ellipsoid {
    /// Human-readable name (for debugging/logging).
    pub name: &'static str,
    /// Semi-major axis in metres.
    pub a: f64,
    /// Flattening `f = (a - b) / a`.
    pub f: f64,
}

/// GRS 80, used by SWEREF 99 and RR92.
pub const GRS80: Ellipsoid = Ellipsoid {
    name: "GRS80",
    a: 6_378_137.0,
    f: 1.0 / 298.257_222_101,
};

/// WGS 84.
pub const WGS84: Ellipsoid = Ellipsoid {
    name: "WGS84",
    a: 6_378_137.0,
    f: 1.0 / 298.257_223_563,
};

/// Bessel 1841, used by RT 90.
pub const BESSEL_1841: Ellipsoid = Ellipsoid {
    name: "Bessel 1841",
    a: 6_377_397.155,
    f: 1.0 / 299.152_812_8,
};

const MAX_LATITUDE_ITERATIONS: usize = 12;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-15;

impl Ellipsoid {
    /// First eccentricity squared.
    #[inline]
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Third flattening `n = f / (2 - f)`.
    #[inline]
    pub fn n(&self) -> f64 {
        self.f / (2.0 - self.f)
    }

    /// Prime vertical radius of curvature at `lat_rad`.
    #[inline]
    fn prime_vertical_radius(&self, sin_lat: f64) -> f64 {
        self.a / (1.0 - self.e2() * sin_lat * sin_lat).sqrt()
    }

    /// Geodetic `(lat, lon)` in degrees plus ellipsoidal height → geocentric XYZ.
    pub fn geodetic_to_geocentric(&self, lat_deg: f64, lon_deg: f64, h: f64) -> [f64; 3] {
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();
        let nu = self.prime_vertical_radius(sin_lat);

        [
            (nu + h) * cos_lat * cos_lon,
            (nu + h) * cos_lat * sin_lon,
            (nu * (1.0 - self.e2()) + h) * sin_lat,
        ]
    }

    /// Geocentric XYZ → geodetic `[lat, lon, h]` (degrees, degrees, metres).
    ///
    /// Fixed-point iteration on latitude; the height uses the form
    /// `p cos φ + z sin φ - a sqrt(1 - e² sin² φ)` which stays well-conditioned
    /// at the poles.
    pub fn geocentric_to_geodetic(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        let e2 = self.e2();
        let p = x.hypot(y);
        let lon = y.atan2(x);

        let mut lat = z.atan2(p * (1.0 - e2));
        for _ in 0..MAX_LATITUDE_ITERATIONS {
            let sin_lat = lat.sin();
            let nu = self.prime_vertical_radius(sin_lat);
            let next = (z + e2 * nu * sin_lat).atan2(p);
            let converged = (next - lat).abs() < LATITUDE_TOLERANCE_RAD;
            lat = next;
            if converged {
                break;
            }
        }

        let (sin_lat, cos_lat) = lat.sin_cos();
        let h = p * cos_lat + z * sin_lat - self.a * (1.0 - e2 * sin_lat * sin_lat).sqrt();

        [lat.to_degrees(), lon.to_degrees(), h]
    }
}

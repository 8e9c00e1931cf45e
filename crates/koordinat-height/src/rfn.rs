//! Empirical RFN height surface.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RfnHeightUnavailable {
    #[error("RFN model valid for latitudes {min}–{max}°, received {value:.3}°")]
    Latitude { value: f64, min: f64, max: f64 },
    #[error("RFN model valid for longitudes {min}–{max}°, received {value:.3}°")]
    Longitude { value: f64, min: f64, max: f64 },
}

/// Low-order polynomial approximating the ellipsoid − RFN separation over
/// mainland Sweden.
///
/// The surface is evaluated in normalized coordinates
/// `φn = (lat − 62) / 8`, `λn = (lon − 15) / 6`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RfnModel {
    pub lat_range: (f64, f64),
    pub lon_range: (f64, f64),
    pub base_offset: f64,
    pub lat_linear: f64,
    pub lon_linear: f64,
    pub lat_quadratic: f64,
    pub lon_quadratic: f64,
    pub cross_term: f64,
}

impl Default for RfnModel {
    fn default() -> Self {
        Self {
            lat_range: (54.0, 70.5),
            lon_range: (10.0, 25.5),
            base_offset: 0.42,
            lat_linear: -0.25,
            lon_linear: 0.18,
            lat_quadratic: 0.04,
            lon_quadratic: -0.03,
            cross_term: 0.07,
        }
    }
}

impl RfnModel {
    fn validate(&self, lat: f64, lon: f64) -> Result<(), RfnHeightUnavailable> {
        let (min, max) = self.lat_range;
        if !(min..=max).contains(&lat) {
            return Err(RfnHeightUnavailable::Latitude {
                value: lat,
                min,
                max,
            });
        }
        let (min, max) = self.lon_range;
        if !(min..=max).contains(&lon) {
            return Err(RfnHeightUnavailable::Longitude {
                value: lon,
                min,
                max,
            });
        }
        Ok(())
    }

    /// Ellipsoidal minus RFN height at `(lat, lon)`, in metres.
    pub fn separation(&self, lat: f64, lon: f64) -> Result<f64, RfnHeightUnavailable> {
        self.validate(lat, lon)?;
        let p = (lat - 62.0) / 8.0;
        let l = (lon - 15.0) / 6.0;
        Ok(self.base_offset
            + self.lat_linear * p
            + self.lon_linear * l
            + self.lat_quadratic * p * p
            + self.lon_quadratic * l * l
            + self.cross_term * p * l)
    }

    pub fn orthometric_to_ellipsoidal(
        &self,
        lat: f64,
        lon: f64,
        h: f64,
    ) -> Result<f64, RfnHeightUnavailable> {
        Ok(h + self.separation(lat, lon)?)
    }

    pub fn ellipsoidal_to_orthometric(
        &self,
        lat: f64,
        lon: f64,
        h: f64,
    ) -> Result<f64, RfnHeightUnavailable> {
        Ok(h - self.separation(lat, lon)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn reference_point_is_base_offset() {
        let rfn = RfnModel::default();
        assert_abs_diff_eq!(rfn.separation(62.0, 15.0).unwrap(), 0.42, epsilon = 1e-12);
    }

    #[test]
    fn matches_polynomial_in_stockholm() {
        let rfn = RfnModel::default();
        let p: f64 = (59.3 - 62.0) / 8.0;
        let l: f64 = (18.0 - 15.0) / 6.0;
        let expected =
            0.42 - 0.25 * p + 0.18 * l + 0.04 * p * p - 0.03 * l * l + 0.07 * p * l;
        assert_abs_diff_eq!(rfn.separation(59.3, 18.0).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn bounds_are_inclusive() {
        let rfn = RfnModel::default();
        assert!(rfn.separation(54.0, 10.0).is_ok());
        assert!(rfn.separation(70.5, 25.5).is_ok());
    }

    #[test]
    fn outside_the_box_is_unavailable() {
        let rfn = RfnModel::default();
        let err = rfn.separation(40.0, 15.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "RFN model valid for latitudes 54–70.5°, received 40.000°"
        );
        assert!(matches!(
            rfn.separation(60.0, 30.0),
            Err(RfnHeightUnavailable::Longitude { .. })
        ));
    }

    proptest! {
        #[test]
        fn conversions_are_symmetric(
            lat in 54.0f64..=70.5,
            lon in 10.0f64..=25.5,
            h in -100.0f64..3000.0,
        ) {
            let rfn = RfnModel::default();
            let ell = rfn.orthometric_to_ellipsoidal(lat, lon, h).unwrap();
            let back = rfn.ellipsoidal_to_orthometric(lat, lon, ell).unwrap();
            prop_assert!((back - h).abs() < 1e-9);
        }
    }
}

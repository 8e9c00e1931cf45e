use std::collections::BTreeMap;

use koordinat_core::WGS84;
use serde::{Deserialize, Serialize};

/// Key of the output-height entry.
pub const HEIGHT_KEY: &str = "HEIGHT";

/// The pivot every conversion goes through.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCoordinate {
    /// WGS84 geocentric `(x, y, z)` in metres.
    pub xyz: [f64; 3],
    /// WGS84 `(lat, lon, ellipsoidal height)`.
    pub geographic: [f64; 3],
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl CanonicalCoordinate {
    pub fn from_xyz(xyz: [f64; 3]) -> Self {
        Self {
            xyz,
            geographic: WGS84.geocentric_to_geodetic(xyz[0], xyz[1], xyz[2]),
            warnings: Vec::new(),
        }
    }

    pub fn lat(&self) -> f64 {
        self.geographic[0]
    }

    pub fn lon(&self) -> f64 {
        self.geographic[1]
    }

    pub fn ellipsoidal_height(&self) -> f64 {
        self.geographic[2]
    }

    /// Replace the height in both forms, keeping lat/lon.
    pub(crate) fn set_ellipsoidal_height(&mut self, height: f64) {
        let [lat, lon, _] = self.geographic;
        self.geographic[2] = height;
        self.xyz = WGS84.geodetic_to_geocentric(lat, lon, height);
    }
}

/// Result for one target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetValue {
    /// Values in the target CRS's user axis order.
    Coordinates(Vec<f64>),
    /// MGRS grid reference.
    Grid(String),
    Height {
        value: f64,
        /// Model separation that was applied, if any.
        separation: Option<f64>,
    },
    /// The target could not be computed; the other entries are still valid.
    Error(String),
}

impl TargetValue {
    pub fn is_error(&self) -> bool {
        matches!(self, TargetValue::Error(_))
    }
}

/// Everything one conversion produced, keyed by target.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionResults {
    pub values: BTreeMap<String, TargetValue>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ConversionResults {
    pub(crate) fn insert(&mut self, key: &str, value: TargetValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&TargetValue> {
        self.values.get(key)
    }

    /// Coordinates for `key`, if that entry is a coordinate tuple.
    pub fn coordinates(&self, key: &str) -> Option<&[f64]> {
        match self.get(key)? {
            TargetValue::Coordinates(values) => Some(values),
            _ => None,
        }
    }

    /// Grid string for `key`, if that entry is a grid reference.
    pub fn grid(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            TargetValue::Grid(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn height(&self) -> Option<&TargetValue> {
        self.get(HEIGHT_KEY)
    }

    /// `(key, message)` for every failed entry.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().filter_map(|(key, value)| match value {
            TargetValue::Error(msg) => Some((key.as_str(), msg.as_str())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn replacing_height_moves_xyz_along_the_normal() {
        let mut c = CanonicalCoordinate::from_xyz(WGS84.geodetic_to_geocentric(59.0, 18.0, 0.0));
        c.set_ellipsoidal_height(100.0);
        let back = WGS84.geocentric_to_geodetic(c.xyz[0], c.xyz[1], c.xyz[2]);
        assert_abs_diff_eq!(back[0], 59.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back[1], 18.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back[2], 100.0, epsilon = 1e-6);
        assert_eq!(c.ellipsoidal_height(), 100.0);
    }

    #[test]
    fn accessors_match_entry_kinds() {
        let mut r = ConversionResults::default();
        r.insert("RT90_3021", TargetValue::Coordinates(vec![1.0, 2.0]));
        r.insert("MGRS", TargetValue::Grid("34VCL".into()));
        r.insert(HEIGHT_KEY, TargetValue::Error("no grid".into()));

        assert_eq!(r.coordinates("RT90_3021"), Some(&[1.0, 2.0][..]));
        assert_eq!(r.coordinates("MGRS"), None);
        assert_eq!(r.grid("MGRS"), Some("34VCL"));
        assert!(r.height().is_some_and(TargetValue::is_error));
        assert_eq!(r.errors().collect::<Vec<_>>(), vec![("HEIGHT", "no grid")]);
    }

    #[test]
    fn target_values_are_tagged_in_json() {
        let json = serde_json::to_value(TargetValue::Height {
            value: 12.5,
            separation: Some(-24.0),
        })
        .unwrap();
        assert_eq!(json["height"]["value"], 12.5);
        assert_eq!(json["height"]["separation"], -24.0);
    }
}

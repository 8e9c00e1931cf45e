use std::fmt;

use koordinat_core::{CrsCode, HeightSystem};
use serde::{Deserialize, Serialize};

/// How the input text was interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    #[serde(rename = "MGRS")]
    Mgrs,
    #[serde(rename = "XYZ")]
    Xyz,
    #[serde(rename = "RR92_XYZ")]
    Rr92Xyz,
    #[serde(rename = "RT90")]
    Rt90,
    /// Decimal degrees.
    #[serde(rename = "DD")]
    Dd,
    /// Degrees and decimal minutes.
    #[serde(rename = "DDM")]
    Ddm,
    /// Degrees, minutes and seconds.
    #[serde(rename = "DMS")]
    Dms,
}

impl SourceFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Mgrs => "MGRS",
            SourceFormat::Xyz => "XYZ",
            SourceFormat::Rr92Xyz => "RR92_XYZ",
            SourceFormat::Rt90 => "RT90",
            SourceFormat::Dd => "DD",
            SourceFormat::Ddm => "DDM",
            SourceFormat::Dms => "DMS",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing one free-text coordinate.
///
/// `values` is in user order for `crs`: `(lat, lon[, h])` for geographic
/// formats, `(northing, easting)` for RT 90 and `(x, y, z)` for geocentric.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParsedCoordinate {
    pub crs: CrsCode,
    pub values: Vec<f64>,
    pub source_format: SourceFormat,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub height_system: HeightSystem,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ParsedCoordinate {
    pub fn new(crs: CrsCode, values: Vec<f64>, source_format: SourceFormat) -> Self {
        Self {
            crs,
            values,
            source_format,
            height: None,
            height_system: HeightSystem::Ellipsoidal,
            warnings: Vec::new(),
        }
    }

    /// Geographic position with an optional height appended to `values`.
    pub fn lat_lon(
        crs: CrsCode,
        lat: f64,
        lon: f64,
        height: Option<f64>,
        source_format: SourceFormat,
    ) -> Self {
        let mut values = vec![lat, lon];
        values.extend(height);
        Self {
            height,
            ..Self::new(crs, values, source_format)
        }
    }

    pub fn with_height_system(mut self, system: HeightSystem) -> Self {
        self.height_system = system;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }
}
